use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const ZERO_DURATION: &str = "0h 0m 0s";

/// One day's attendance for one user. At most one record exists per
/// `(user_id, day_key)`; the database unique key is the backstop.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    pub id: u64,
    pub user_id: u64,
    /// Display bucket label, e.g. "Jun 5". Carries no year; `day_key` does.
    #[schema(example = "Jun 5")]
    pub date: String,
    /// Year-aware calendar day in the organizational timezone. Uniqueness
    /// and ordering key.
    #[schema(example = "2026-06-05", format = "date", value_type = String)]
    pub day_key: NaiveDate,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub check_in_time: Option<DateTime<Utc>>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub check_out_time: Option<DateTime<Utc>>,
    pub check_in_note: Option<String>,
    pub check_out_note: Option<String>,
    #[schema(example = "9h 0m 0s")]
    pub total_hours_worked: String,
    #[schema(example = "1h 0m 0s")]
    pub overtime: String,
    #[schema(example = "0h 0m 0s")]
    pub negative_working_hours: String,
    pub is_holiday: bool,
}

impl AttendanceRecord {
    /// Checked in, not yet checked out.
    pub fn is_open(&self) -> bool {
        self.check_in_time.is_some() && self.check_out_time.is_none()
    }

    pub fn is_closed(&self) -> bool {
        self.check_out_time.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn open_and_closed_track_check_out() {
        let mut rec = AttendanceRecord {
            id: 1,
            user_id: 7,
            date: "Jun 5".into(),
            day_key: NaiveDate::from_ymd_opt(2026, 6, 5).unwrap(),
            check_in_time: Some(Utc.with_ymd_and_hms(2026, 6, 5, 3, 0, 0).unwrap()),
            check_out_time: None,
            check_in_note: None,
            check_out_note: None,
            total_hours_worked: ZERO_DURATION.into(),
            overtime: ZERO_DURATION.into(),
            negative_working_hours: ZERO_DURATION.into(),
            is_holiday: false,
        };

        assert!(rec.is_open());
        assert!(!rec.is_closed());

        rec.check_out_time = Some(Utc.with_ymd_and_hms(2026, 6, 5, 12, 0, 0).unwrap());
        assert!(!rec.is_open());
        assert!(rec.is_closed());
    }
}
