//! In-memory store fakes backing the engine tests.

use super::{AttendanceStore, NewAttendance, OfficeLocationStore, UserDirectory};
use crate::errors::LedgerError;
use crate::model::attendance::{AttendanceRecord, ZERO_DURATION};
use crate::model::office_location::OfficeLocation;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct MemoryAttendanceStore {
    records: Mutex<HashMap<(u64, NaiveDate), AttendanceRecord>>,
    next_id: AtomicU64,
}

impl MemoryAttendanceStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl AttendanceStore for MemoryAttendanceStore {
    async fn insert(&self, new: NewAttendance) -> Result<AttendanceRecord, LedgerError> {
        let mut records = self.records.lock().unwrap();
        let key = (new.user_id, new.day_key);
        if records.contains_key(&key) {
            return Err(LedgerError::Duplicate(new.date));
        }

        let record = AttendanceRecord {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            user_id: new.user_id,
            date: new.date,
            day_key: new.day_key,
            check_in_time: Some(new.check_in_time),
            check_out_time: None,
            check_in_note: new.check_in_note,
            check_out_note: None,
            total_hours_worked: ZERO_DURATION.into(),
            overtime: ZERO_DURATION.into(),
            negative_working_hours: ZERO_DURATION.into(),
            is_holiday: false,
        };
        records.insert(key, record.clone());
        Ok(record)
    }

    async fn find(
        &self,
        user_id: u64,
        day_key: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, LedgerError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(&(user_id, day_key))
            .cloned())
    }

    async fn update(&self, record: &AttendanceRecord) -> Result<(), LedgerError> {
        let mut records = self.records.lock().unwrap();
        let key = (record.user_id, record.day_key);
        if !records.contains_key(&key) {
            return Err(LedgerError::NotFound(format!(
                "no attendance record for {}",
                record.date
            )));
        }
        records.insert(key, record.clone());
        Ok(())
    }

    async fn delete(&self, user_id: u64, day_key: NaiveDate) -> Result<bool, LedgerError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .remove(&(user_id, day_key))
            .is_some())
    }

    async fn list_by_user(&self, user_id: u64) -> Result<Vec<AttendanceRecord>, LedgerError> {
        let mut out: Vec<_> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.day_key.cmp(&a.day_key));
        Ok(out)
    }

    async fn list_by_day(&self, day_key: NaiveDate) -> Result<Vec<AttendanceRecord>, LedgerError> {
        let mut out: Vec<_> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.day_key == day_key)
            .cloned()
            .collect();
        out.sort_by_key(|r| r.user_id);
        Ok(out)
    }
}

#[derive(Default)]
pub struct MemoryUserDirectory {
    expected: Mutex<HashMap<u64, String>>,
    positions: Mutex<HashMap<u64, (f64, f64)>>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_expected(&self, user_id: u64, hours: &str) {
        self.expected
            .lock()
            .unwrap()
            .insert(user_id, hours.to_string());
    }

    pub async fn position(&self, user_id: u64) -> Option<(f64, f64)> {
        self.positions.lock().unwrap().get(&user_id).copied()
    }
}

impl UserDirectory for MemoryUserDirectory {
    async fn expected_daily_hours(&self, user_id: u64) -> Result<Option<String>, LedgerError> {
        Ok(self.expected.lock().unwrap().get(&user_id).cloned())
    }

    async fn backfill_position(
        &self,
        user_id: u64,
        latitude: f64,
        longitude: f64,
    ) -> Result<(), LedgerError> {
        self.positions
            .lock()
            .unwrap()
            .entry(user_id)
            .or_insert((latitude, longitude));
        Ok(())
    }
}

pub struct MemoryOfficeStore {
    offices: Vec<OfficeLocation>,
}

impl MemoryOfficeStore {
    pub fn new(offices: Vec<OfficeLocation>) -> Self {
        Self { offices }
    }
}

impl OfficeLocationStore for MemoryOfficeStore {
    async fn list(&self) -> Result<Vec<OfficeLocation>, LedgerError> {
        Ok(self.offices.clone())
    }
}
