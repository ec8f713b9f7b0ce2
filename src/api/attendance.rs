use crate::auth::auth::AuthUser;
use crate::engine::{AppLedger, AttendancePatch, CheckInRequest};
use crate::errors::LedgerError;
use crate::model::attendance::AttendanceRecord;
use actix_web::{HttpResponse, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CheckInDto {
    #[schema(example = "2026-06-05T03:00:00Z", format = "date-time", value_type = Option<String>)]
    pub check_in_time: Option<DateTime<Utc>>,
    /// Explicit day bucket; wins over the check-in timestamp.
    #[schema(example = "2026-06-05", format = "date", value_type = Option<String>)]
    pub date: Option<NaiveDate>,
    #[schema(example = "on site early")]
    pub note: Option<String>,
    #[schema(example = 23.8103)]
    pub latitude: Option<f64>,
    #[schema(example = 90.4125)]
    pub longitude: Option<f64>,
    /// Reason reported by the client when its geolocation source failed
    /// (permission denied / unavailable / timeout).
    pub location_error: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CheckOutDto {
    #[schema(example = "leaving for the day")]
    pub note: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateAttendanceDto {
    #[schema(format = "date-time", value_type = Option<String>)]
    pub check_in_time: Option<DateTime<Utc>>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub check_out_time: Option<DateTime<Utc>>,
    pub check_in_note: Option<String>,
    pub check_out_note: Option<String>,
    pub is_holiday: Option<bool>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance",
    request_body = CheckInDto,
    responses(
        (status = 200, description = "Checked in successfully", body = AttendanceRecord),
        (status = 400, description = "Location unavailable or invalid coordinates"),
        (status = 403, description = "Outside the permitted radius of every office"),
        (status = 409, description = "Already checked in for this day, or no office configured"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    ledger: web::Data<AppLedger>,
    payload: web::Json<CheckInDto>,
) -> Result<HttpResponse, LedgerError> {
    let payload = payload.into_inner();

    // The client owns the geolocation source; a failed fix arrives as a
    // reason string and is surfaced verbatim.
    if let Some(reason) = payload.location_error {
        return Err(LedgerError::LocationUnavailable(reason));
    }

    let record = ledger
        .check_in(
            auth.user_id,
            CheckInRequest {
                check_in_time: payload.check_in_time,
                day: payload.date,
                note: payload.note,
                latitude: payload.latitude,
                longitude: payload.longitude,
            },
            Utc::now(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(record))
}

/// Check-out endpoint
#[utoipa::path(
    put,
    path = "/api/v1/attendance",
    request_body = CheckOutDto,
    responses(
        (status = 200, description = "Checked out successfully", body = AttendanceRecord),
        (status = 404, description = "No open attendance record for today"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    ledger: web::Data<AppLedger>,
    payload: Option<web::Json<CheckOutDto>>,
) -> Result<HttpResponse, LedgerError> {
    let note = payload.and_then(|p| p.into_inner().note);
    let record = ledger.check_out(auth.user_id, note, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(record))
}

/// Elapsed-time refresh for an open record. The client re-issues this every
/// ten minutes while checked in; it is display-only and the final duration
/// is recomputed at the actual check-out.
#[utoipa::path(
    put,
    path = "/api/v1/attendance/refresh",
    responses(
        (status = 200, description = "Elapsed time refreshed", body = AttendanceRecord),
        (status = 404, description = "No open attendance record for today"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn refresh(
    auth: AuthUser,
    ledger: web::Data<AppLedger>,
) -> Result<HttpResponse, LedgerError> {
    let record = ledger.refresh_elapsed(auth.user_id, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(record))
}

/// Caller's attendance history, newest day first
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    responses(
        (status = 200, description = "Attendance history", body = [AttendanceRecord]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn my_history(
    auth: AuthUser,
    ledger: web::Data<AppLedger>,
) -> Result<HttpResponse, LedgerError> {
    let records = ledger.history(auth.user_id).await?;
    Ok(HttpResponse::Ok().json(records))
}

/// Caller's record for one day
#[utoipa::path(
    get,
    path = "/api/v1/attendance/{date}",
    params(("date" = String, Path, description = "Calendar day, e.g. 2026-06-05")),
    responses(
        (status = 200, description = "Attendance record", body = AttendanceRecord),
        (status = 404, description = "No record for this day"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn my_record(
    auth: AuthUser,
    ledger: web::Data<AppLedger>,
    path: web::Path<NaiveDate>,
) -> Result<HttpResponse, LedgerError> {
    let day = path.into_inner();
    let record = ledger
        .record_for(auth.user_id, day)
        .await?
        .ok_or_else(|| LedgerError::NotFound(format!("no attendance record for {}", day)))?;
    Ok(HttpResponse::Ok().json(record))
}

/// Cross-user roster for one day (manager view)
#[utoipa::path(
    get,
    path = "/api/v1/attendance/day/{date}",
    params(("date" = String, Path, description = "Calendar day, e.g. 2026-06-05")),
    responses(
        (status = 200, description = "All records for the day", body = [AttendanceRecord]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn day_roster(
    auth: AuthUser,
    ledger: web::Data<AppLedger>,
    path: web::Path<NaiveDate>,
) -> actix_web::Result<HttpResponse> {
    auth.require_manager_or_admin()?;
    let records = ledger.day_roster(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(records))
}

/// One user's record for one day (self or manager view)
#[utoipa::path(
    get,
    path = "/api/v1/attendance/{user_id}/{date}",
    params(
        ("user_id" = u64, Path, description = "User ID"),
        ("date" = String, Path, description = "Calendar day, e.g. 2026-06-05")
    ),
    responses(
        (status = 200, description = "Attendance record", body = AttendanceRecord),
        (status = 404, description = "No record for this user and day"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn user_record(
    auth: AuthUser,
    ledger: web::Data<AppLedger>,
    path: web::Path<(u64, NaiveDate)>,
) -> actix_web::Result<HttpResponse> {
    let (user_id, day) = path.into_inner();
    if auth.user_id != user_id {
        auth.require_manager_or_admin()?;
    }

    let record = ledger
        .record_for(user_id, day)
        .await?
        .ok_or_else(|| LedgerError::NotFound(format!("no attendance record for {}", day)))?;
    Ok(HttpResponse::Ok().json(record))
}

/// Manual edit of a record; durations recompute when a check-out is present
#[utoipa::path(
    put,
    path = "/api/v1/attendance/{user_id}/{date}",
    params(
        ("user_id" = u64, Path, description = "User ID"),
        ("date" = String, Path, description = "Calendar day, e.g. 2026-06-05")
    ),
    request_body = UpdateAttendanceDto,
    responses(
        (status = 200, description = "Record updated", body = AttendanceRecord),
        (status = 404, description = "No record for this user and day"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn update_record(
    auth: AuthUser,
    ledger: web::Data<AppLedger>,
    path: web::Path<(u64, NaiveDate)>,
    payload: web::Json<UpdateAttendanceDto>,
) -> actix_web::Result<HttpResponse> {
    let (user_id, day) = path.into_inner();
    // Users may edit their own records; anything else is a manager action.
    if auth.user_id != user_id {
        auth.require_manager_or_admin()?;
    }

    let payload = payload.into_inner();
    let record = ledger
        .apply_update(
            user_id,
            day,
            AttendancePatch {
                check_in_time: payload.check_in_time,
                check_out_time: payload.check_out_time,
                check_in_note: payload.check_in_note,
                check_out_note: payload.check_out_note,
                is_holiday: payload.is_holiday,
                latitude: payload.latitude,
                longitude: payload.longitude,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(record))
}

/// Delete a record (manager only)
#[utoipa::path(
    delete,
    path = "/api/v1/attendance/{user_id}/{date}",
    params(
        ("user_id" = u64, Path, description = "User ID"),
        ("date" = String, Path, description = "Calendar day, e.g. 2026-06-05")
    ),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "No record for this user and day"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn delete_record(
    auth: AuthUser,
    ledger: web::Data<AppLedger>,
    path: web::Path<(u64, NaiveDate)>,
) -> actix_web::Result<HttpResponse> {
    auth.require_manager_or_admin()?;

    let (user_id, day) = path.into_inner();
    let deleted = ledger.delete(user_id, day).await?;
    if !deleted {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": format!("no attendance record for {}", day)
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}
