use crate::auth::auth::AuthUser;
use crate::model::office_location::{
    OfficeLocation, validate_coordinates, validate_latitude, validate_longitude,
};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateOfficeLocation {
    #[schema(example = "Main Office")]
    pub name: String,
    #[schema(example = 23.8103)]
    pub latitude: f64,
    #[schema(example = 90.4125)]
    pub longitude: f64,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateOfficeLocation {
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Create office location
#[utoipa::path(
    post,
    path = "/api/v1/office",
    request_body = CreateOfficeLocation,
    responses(
        (status = 200, description = "Office created", body = OfficeLocation),
        (status = 400, description = "Coordinates out of range"),
        (status = 409, description = "Office name already exists"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Office"
)]
pub async fn create_office(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateOfficeLocation>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;
    validate_coordinates(payload.latitude, payload.longitude)?;

    let result = sqlx::query(
        r#"INSERT INTO office_locations (name, latitude, longitude) VALUES (?, ?, ?)"#,
    )
    .bind(&payload.name)
    .bind(payload.latitude)
    .bind(payload.longitude)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(res) => Ok(HttpResponse::Ok().json(OfficeLocation {
            id: res.last_insert_id(),
            name: payload.name.clone(),
            latitude: payload.latitude,
            longitude: payload.longitude,
        })),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "message": "Office name already exists"
                    })));
                }
            }

            error!(error = %e, "Failed to create office location");
            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            })))
        }
    }
}

/// List office locations, in configured order
#[utoipa::path(
    get,
    path = "/api/v1/office",
    responses(
        (status = 200, description = "All configured offices", body = [OfficeLocation]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Office"
)]
pub async fn list_offices(pool: web::Data<MySqlPool>) -> actix_web::Result<impl Responder> {
    let offices = sqlx::query_as::<_, OfficeLocation>(
        r#"SELECT id, name, latitude, longitude FROM office_locations ORDER BY id"#,
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch office locations");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(offices))
}

/// Get office location by ID
#[utoipa::path(
    get,
    path = "/api/v1/office/{id}",
    params(("id" = u64, Path, description = "Office location ID")),
    responses(
        (status = 200, description = "Office found", body = OfficeLocation),
        (status = 404, description = "Office not found"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Office"
)]
pub async fn get_office(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let office_id = path.into_inner();

    let office = sqlx::query_as::<_, OfficeLocation>(
        r#"SELECT id, name, latitude, longitude FROM office_locations WHERE id = ?"#,
    )
    .bind(office_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, office_id, "Failed to fetch office location");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match office {
        Some(o) => Ok(HttpResponse::Ok().json(o)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Office not found"
        }))),
    }
}

/// Get office location by name
#[utoipa::path(
    get,
    path = "/api/v1/office/by-name/{name}",
    params(("name" = String, Path, description = "Office location name")),
    responses(
        (status = 200, description = "Office found", body = OfficeLocation),
        (status = 404, description = "Office not found"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Office"
)]
pub async fn get_office_by_name(
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let name = path.into_inner();

    let office = sqlx::query_as::<_, OfficeLocation>(
        r#"SELECT id, name, latitude, longitude FROM office_locations WHERE name = ?"#,
    )
    .bind(&name)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, name, "Failed to fetch office location");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match office {
        Some(o) => Ok(HttpResponse::Ok().json(o)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Office not found"
        }))),
    }
}

/// Update office location
#[utoipa::path(
    put,
    path = "/api/v1/office/{id}",
    params(("id" = u64, Path, description = "Office location ID")),
    request_body = UpdateOfficeLocation,
    responses(
        (status = 200, description = "Office updated"),
        (status = 400, description = "Coordinates out of range"),
        (status = 404, description = "Office not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Office"
)]
pub async fn update_office(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateOfficeLocation>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    if let Some(lat) = payload.latitude {
        validate_latitude(lat)?;
    }
    if let Some(lon) = payload.longitude {
        validate_longitude(lon)?;
    }

    let office_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE office_locations
        SET name = COALESCE(?, name),
            latitude = COALESCE(?, latitude),
            longitude = COALESCE(?, longitude)
        WHERE id = ?
        "#,
    )
    .bind(&payload.name)
    .bind(payload.latitude)
    .bind(payload.longitude)
    .bind(office_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, office_id, "Failed to update office location");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Office not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Office updated successfully"
    })))
}

/// Delete office location
#[utoipa::path(
    delete,
    path = "/api/v1/office/{id}",
    params(("id" = u64, Path, description = "Office location ID")),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Office not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Office"
)]
pub async fn delete_office(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    let office_id = path.into_inner();

    let result = sqlx::query(r#"DELETE FROM office_locations WHERE id = ?"#)
        .bind(office_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, office_id, "Failed to delete office location");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Office not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}
