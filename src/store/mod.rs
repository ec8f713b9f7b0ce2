use crate::errors::LedgerError;
use crate::model::attendance::AttendanceRecord;
use crate::model::office_location::OfficeLocation;
use chrono::{DateTime, NaiveDate, Utc};

#[cfg(test)]
pub mod memory;
pub mod mysql;

/// Fields the engine supplies when a check-in creates a record. Duration
/// strings start zeroed; the store assigns the id.
pub struct NewAttendance {
    pub user_id: u64,
    pub date: String,
    pub day_key: NaiveDate,
    pub check_in_time: DateTime<Utc>,
    pub check_in_note: Option<String>,
}

/// Attendance persistence seam. `insert` must fail atomically with
/// `LedgerError::Duplicate` when a record already exists for the
/// `(user_id, day_key)` pair; that is the only guard against two check-ins
/// racing past the existence check.
pub trait AttendanceStore {
    async fn insert(&self, new: NewAttendance) -> Result<AttendanceRecord, LedgerError>;
    async fn find(
        &self,
        user_id: u64,
        day_key: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, LedgerError>;
    async fn update(&self, record: &AttendanceRecord) -> Result<(), LedgerError>;
    async fn delete(&self, user_id: u64, day_key: NaiveDate) -> Result<bool, LedgerError>;
    /// Newest day first.
    async fn list_by_user(&self, user_id: u64) -> Result<Vec<AttendanceRecord>, LedgerError>;
    async fn list_by_day(&self, day_key: NaiveDate) -> Result<Vec<AttendanceRecord>, LedgerError>;
}

/// The slice of the user directory the engine needs.
pub trait UserDirectory {
    /// The user's configured expected daily duration string, if any.
    async fn expected_daily_hours(&self, user_id: u64) -> Result<Option<String>, LedgerError>;
    /// Stores the position only when the user has none yet.
    async fn backfill_position(
        &self,
        user_id: u64,
        latitude: f64,
        longitude: f64,
    ) -> Result<(), LedgerError>;
}

pub trait OfficeLocationStore {
    /// Configured order, which is also geofence evaluation order.
    async fn list(&self) -> Result<Vec<OfficeLocation>, LedgerError>;
}
