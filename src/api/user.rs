use crate::auth::auth::AuthUser;
use crate::engine::duration::parse_hours;
use crate::model::role::Role;
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, warn};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UserQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub role_id: Option<u8>,
    pub search: Option<String>,
}

#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct UserResponse {
    pub id: u64,
    #[schema(example = "jane@company.com")]
    pub email: String,
    #[schema(example = 3)]
    pub role_id: u8,
    #[schema(example = "8h 0m 0s")]
    pub total_working_hours: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_active: bool,
}

#[derive(Serialize, ToSchema)]
pub struct UserListResponse {
    pub data: Vec<UserResponse>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

// Widened before the multiply; a u32 page * per_page can overflow.
fn page_offset(page: u32, per_page: u32) -> i64 {
    (page as i64 - 1) * per_page as i64
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateUser {
    /// Expected daily duration, e.g. "7h 30m 0s".
    pub total_working_hours: Option<String>,
    pub role_id: Option<u8>,
    pub is_active: Option<bool>,
}

/// Paginated user list
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(
        ("page", Query, description = "Page number"),
        ("per_page", Query, description = "Items per page"),
        ("role_id", Query, description = "Filter by role"),
        ("search", Query, description = "Search by email")
    ),
    responses(
        (status = 200, description = "Paginated user list", body = UserListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn list_users(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<UserQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = page_offset(page, per_page);

    // ---------- build WHERE clause dynamically ----------
    let mut conditions = Vec::new();
    let mut bindings: Vec<sqlx::types::JsonValue> = Vec::new();

    if let Some(role_id) = query.role_id {
        conditions.push("role_id = ?");
        bindings.push(role_id.into());
    }

    if let Some(search) = &query.search {
        conditions.push("email LIKE ?");
        bindings.push(format!("%{}%", search).into());
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    // ---------- total count ----------
    let count_sql = format!("SELECT COUNT(*) as total FROM users {}", where_clause);
    debug!(sql = %count_sql, bindings = ?bindings, "Counting users");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = count_query.bind(b);
    }

    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %count_sql, "Failed to count users");
        ErrorInternalServerError("Database error")
    })?;

    // ---------- data query ----------
    let data_sql = format!(
        r#"
        SELECT id, email, role_id, total_working_hours, latitude, longitude, is_active
        FROM users {} ORDER BY id DESC LIMIT ? OFFSET ?
        "#,
        where_clause
    );
    debug!(sql = %data_sql, page, per_page, offset, "Fetching users");

    let mut data_query = sqlx::query_as::<_, UserResponse>(&data_sql);
    for b in &bindings {
        data_query = data_query.bind(b);
    }
    data_query = data_query.bind(per_page as i64).bind(offset);

    let users = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %data_sql, "Failed to fetch users");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(UserListResponse {
        data: users,
        page,
        per_page,
        total,
    }))
}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = u64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn get_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let user_id = path.into_inner();

    // Users see themselves; everything else is a manager view.
    if auth.user_id != user_id {
        auth.require_manager_or_admin()?;
    }

    let user = sqlx::query_as::<_, UserResponse>(
        r#"
        SELECT id, email, role_id, total_working_hours, latitude, longitude, is_active
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, user_id, "Failed to fetch user");
        ErrorInternalServerError("Internal Server Error")
    })?;

    match user {
        Some(u) => Ok(HttpResponse::Ok().json(u)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "User not found"
        }))),
    }
}

/// Update user (expected hours, role, active flag)
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = u64, Path, description = "User ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated"),
        (status = 400, description = "Unknown role id"),
        (status = 404, description = "User not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn update_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateUser>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    let user_id = path.into_inner();

    if let Some(role_id) = payload.role_id {
        if Role::from_id(role_id).is_none() {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "Unknown role id"
            })));
        }
    }

    // Stored leniently, but an unparseable value would silently zero the
    // overtime baseline, so make it visible here.
    if let Some(hours) = &payload.total_working_hours {
        if parse_hours(hours) <= 0.0 {
            warn!(user_id, value = %hours, "storing unparseable expected daily hours");
        }
    }

    let result = sqlx::query(
        r#"
        UPDATE users
        SET total_working_hours = COALESCE(?, total_working_hours),
            role_id = COALESCE(?, role_id),
            is_active = COALESCE(?, is_active)
        WHERE id = ?
        "#,
    )
    .bind(&payload.total_working_hours)
    .bind(payload.role_id)
    .bind(payload.is_active)
    .bind(user_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, user_id, "Failed to update user");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "User not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "User updated successfully"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_offset_does_not_overflow_for_huge_pages() {
        assert_eq!(page_offset(1, 20), 0);
        assert_eq!(page_offset(3, 20), 40);
        assert_eq!(page_offset(u32::MAX, 100), (u32::MAX as i64 - 1) * 100);
    }
}
