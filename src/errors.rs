use actix_web::{HttpResponse, http::StatusCode};
use derive_more::Display;
use serde_json::json;
use tracing::error;

/// Every failure the attendance ledger can produce. Engine code returns
/// these as typed results; the `ResponseError` impl is the single place
/// they become HTTP responses.
#[derive(Debug, Display)]
pub enum LedgerError {
    /// A record already exists for this user and day bucket.
    #[display(fmt = "already checked in for {}", _0)]
    Duplicate(String),

    /// Caller is outside the permitted radius of every configured office.
    #[display(
        fmt = "outside office radius: nearest office '{}' is {:.2} km away ({:.2} km over the limit)",
        nearest,
        distance_km,
        overshoot_km
    )]
    GeofenceViolation {
        nearest: String,
        distance_km: f64,
        overshoot_km: f64,
    },

    /// Zero office locations exist; check-in is blocked until one is configured.
    #[display(fmt = "no office locations configured")]
    NoOfficeConfigured,

    /// The caller's geolocation source failed; reason surfaced verbatim.
    #[display(fmt = "location unavailable: {}", _0)]
    LocationUnavailable(String),

    #[display(fmt = "{}", _0)]
    NotFound(String),

    #[display(fmt = "{}", _0)]
    Validation(String),

    #[display(fmt = "storage error: {}", _0)]
    Storage(sqlx::Error),
}

impl std::error::Error for LedgerError {}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::Storage(e)
    }
}

impl actix_web::ResponseError for LedgerError {
    fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::Duplicate(_) => StatusCode::CONFLICT,
            LedgerError::GeofenceViolation { .. } => StatusCode::FORBIDDEN,
            LedgerError::NoOfficeConfigured => StatusCode::CONFLICT,
            LedgerError::LocationUnavailable(_) => StatusCode::BAD_REQUEST,
            LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
            LedgerError::Validation(_) => StatusCode::BAD_REQUEST,
            LedgerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Storage details stay in the logs, not the response body.
        if let LedgerError::Storage(e) = self {
            error!(error = %e, "Storage failure");
            return HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            }));
        }

        HttpResponse::build(self.status_code()).json(json!({
            "message": self.to_string()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geofence_violation_reports_nearest_office() {
        let e = LedgerError::GeofenceViolation {
            nearest: "Main Office".into(),
            distance_km: 3.5,
            overshoot_km: 1.5,
        };
        let msg = e.to_string();
        assert!(msg.contains("Main Office"));
        assert!(msg.contains("3.50 km"));
        assert!(msg.contains("1.50 km over"));
    }

    #[test]
    fn duplicate_names_the_day_bucket() {
        let e = LedgerError::Duplicate("Jun 5".into());
        assert_eq!(e.to_string(), "already checked in for Jun 5");
    }
}
