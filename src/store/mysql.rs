//! sqlx/MySQL implementations of the store seams.
//!
//! The `attendance` table carries a unique key over `(user_id, day_key)`;
//! a violated insert comes back as MySQL error code 23000 and is surfaced
//! as `LedgerError::Duplicate`, never a generic fault.

use super::{AttendanceStore, NewAttendance, OfficeLocationStore, UserDirectory};
use crate::errors::LedgerError;
use crate::model::attendance::{AttendanceRecord, ZERO_DURATION};
use crate::model::office_location::OfficeLocation;
use chrono::NaiveDate;
use sqlx::MySqlPool;

const DUPLICATE_SQLSTATE: &str = "23000";

fn is_duplicate(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some(DUPLICATE_SQLSTATE))
}

#[derive(Clone)]
pub struct MySqlAttendanceStore {
    pool: MySqlPool,
}

impl MySqlAttendanceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl AttendanceStore for MySqlAttendanceStore {
    async fn insert(&self, new: NewAttendance) -> Result<AttendanceRecord, LedgerError> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance
                (user_id, date, day_key, check_in_time, check_in_note,
                 total_hours_worked, overtime, negative_working_hours, is_holiday)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, FALSE)
            "#,
        )
        .bind(new.user_id)
        .bind(&new.date)
        .bind(new.day_key)
        .bind(new.check_in_time)
        .bind(&new.check_in_note)
        .bind(ZERO_DURATION)
        .bind(ZERO_DURATION)
        .bind(ZERO_DURATION)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_duplicate(&e) {
                LedgerError::Duplicate(new.date.clone())
            } else {
                LedgerError::Storage(e)
            }
        })?;

        Ok(AttendanceRecord {
            id: result.last_insert_id(),
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
        })
    }

    async fn find(
        &self,
        user_id: u64,
        day_key: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, LedgerError> {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, user_id, date, day_key, check_in_time, check_out_time,
                   check_in_note, check_out_note, total_hours_worked, overtime,
                   negative_working_hours, is_holiday
            FROM attendance
            WHERE user_id = ? AND day_key = ?
            "#,
        )
        .bind(user_id)
        .bind(day_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn update(&self, record: &AttendanceRecord) -> Result<(), LedgerError> {
        sqlx::query(
            r#"
            UPDATE attendance
            SET check_in_time = ?, check_out_time = ?, check_in_note = ?,
                check_out_note = ?, total_hours_worked = ?, overtime = ?,
                negative_working_hours = ?, is_holiday = ?
            WHERE user_id = ? AND day_key = ?
            "#,
        )
        .bind(record.check_in_time)
        .bind(record.check_out_time)
        .bind(&record.check_in_note)
        .bind(&record.check_out_note)
        .bind(&record.total_hours_worked)
        .bind(&record.overtime)
        .bind(&record.negative_working_hours)
        .bind(record.is_holiday)
        .bind(record.user_id)
        .bind(record.day_key)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, user_id: u64, day_key: NaiveDate) -> Result<bool, LedgerError> {
        let result = sqlx::query(r#"DELETE FROM attendance WHERE user_id = ? AND day_key = ?"#)
            .bind(user_id)
            .bind(day_key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_by_user(&self, user_id: u64) -> Result<Vec<AttendanceRecord>, LedgerError> {
        let records = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, user_id, date, day_key, check_in_time, check_out_time,
                   check_in_note, check_out_note, total_hours_worked, overtime,
                   negative_working_hours, is_holiday
            FROM attendance
            WHERE user_id = ?
            ORDER BY day_key DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn list_by_day(&self, day_key: NaiveDate) -> Result<Vec<AttendanceRecord>, LedgerError> {
        let records = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, user_id, date, day_key, check_in_time, check_out_time,
                   check_in_note, check_out_note, total_hours_worked, overtime,
                   negative_working_hours, is_holiday
            FROM attendance
            WHERE day_key = ?
            ORDER BY user_id
            "#,
        )
        .bind(day_key)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

#[derive(Clone)]
pub struct MySqlUserDirectory {
    pool: MySqlPool,
}

impl MySqlUserDirectory {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl UserDirectory for MySqlUserDirectory {
    async fn expected_daily_hours(&self, user_id: u64) -> Result<Option<String>, LedgerError> {
        let hours = sqlx::query_scalar::<_, String>(
            r#"SELECT total_working_hours FROM users WHERE id = ?"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(hours)
    }

    async fn backfill_position(
        &self,
        user_id: u64,
        latitude: f64,
        longitude: f64,
    ) -> Result<(), LedgerError> {
        // Writes only when no position is stored yet.
        sqlx::query(
            r#"
            UPDATE users
            SET latitude = ?, longitude = ?
            WHERE id = ? AND latitude IS NULL AND longitude IS NULL
            "#,
        )
        .bind(latitude)
        .bind(longitude)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[derive(Clone)]
pub struct MySqlOfficeLocationStore {
    pool: MySqlPool,
}

impl MySqlOfficeLocationStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl OfficeLocationStore for MySqlOfficeLocationStore {
    async fn list(&self) -> Result<Vec<OfficeLocation>, LedgerError> {
        let offices = sqlx::query_as::<_, OfficeLocation>(
            r#"SELECT id, name, latitude, longitude FROM office_locations ORDER BY id"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(offices)
    }
}
