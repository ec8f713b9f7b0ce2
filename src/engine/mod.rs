pub mod day_bucket;
pub mod duration;
pub mod geofence;
pub mod worktime;

use crate::errors::LedgerError;
use crate::model::attendance::AttendanceRecord;
use crate::model::office_location::validate_coordinates;
use crate::store::{AttendanceStore, NewAttendance, OfficeLocationStore, UserDirectory};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use geofence::GeofenceOutcome;
use tracing::{info, warn};

/// Typed check-in input. The caller owns the geolocation source, so the fix
/// arrives here as plain optional coordinates.
#[derive(Debug, Default)]
pub struct CheckInRequest {
    pub check_in_time: Option<DateTime<Utc>>,
    pub day: Option<NaiveDate>,
    pub note: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Typed manual-edit input; every field optional, absent fields untouched.
#[derive(Debug, Default)]
pub struct AttendancePatch {
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub check_in_note: Option<String>,
    pub check_out_note: Option<String>,
    pub is_holiday: Option<bool>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// The attendance ledger engine. Stateless per call; all persistence goes
/// through the injected store seams, which keeps the rules testable against
/// in-memory fakes.
///
/// Per (user, day) the record moves NONE -> OPEN -> CLOSED and never leaves
/// CLOSED: a second check-in on a closed day is a duplicate, not a reopen.
pub struct Ledger<A, U, O> {
    attendance: A,
    users: U,
    offices: O,
    tz: Tz,
    radius_km: f64,
}

impl<A, U, O> Ledger<A, U, O>
where
    A: AttendanceStore,
    U: UserDirectory,
    O: OfficeLocationStore,
{
    pub fn new(attendance: A, users: U, offices: O, tz: Tz, radius_km: f64) -> Self {
        Self {
            attendance,
            users,
            offices,
            tz,
            radius_km,
        }
    }

    pub fn org_timezone(&self) -> Tz {
        self.tz
    }

    /// NONE -> OPEN. Requires a position fix within the permitted radius of
    /// a configured office; creates the day's record with zeroed durations.
    pub async fn check_in(
        &self,
        user_id: u64,
        req: CheckInRequest,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord, LedgerError> {
        let (latitude, longitude) = match (req.latitude, req.longitude) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => {
                return Err(LedgerError::LocationUnavailable(
                    "no position fix supplied".into(),
                ));
            }
        };
        validate_coordinates(latitude, longitude)?;

        let offices = self.offices.list().await?;
        let office_name = match geofence::evaluate(&offices, latitude, longitude, self.radius_km) {
            GeofenceOutcome::Inside(office) => office.name.clone(),
            GeofenceOutcome::Outside(miss) => {
                return Err(LedgerError::GeofenceViolation {
                    nearest: miss.nearest,
                    distance_km: miss.distance_km,
                    overshoot_km: miss.overshoot_km,
                });
            }
            GeofenceOutcome::NoOffices => return Err(LedgerError::NoOfficeConfigured),
        };

        let check_in_time = req.check_in_time.unwrap_or(now);
        // Explicit day wins, else the day the check-in instant falls on.
        let day = req
            .day
            .unwrap_or_else(|| day_bucket::day_key(check_in_time, self.tz));

        let record = self
            .attendance
            .insert(NewAttendance {
                user_id,
                date: day_bucket::label_for_day(day),
                day_key: day,
                check_in_time,
                check_in_note: req.note,
            })
            .await?;

        info!(user_id, office = %office_name, day = %day, "check-in accepted");

        // One-shot backfill of the user's stored position; never fatal.
        if let Err(e) = self
            .users
            .backfill_position(user_id, latitude, longitude)
            .await
        {
            warn!(user_id, error = %e, "position backfill failed");
        }

        Ok(record)
    }

    /// OPEN -> CLOSED. Stamps the check-out instant and writes the final
    /// total/overtime/deficit durations.
    pub async fn check_out(
        &self,
        user_id: u64,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord, LedgerError> {
        let day = day_bucket::day_key(now, self.tz);
        let mut record = self
            .attendance
            .find(user_id, day)
            .await?
            .filter(|r| r.is_open())
            .ok_or_else(|| {
                LedgerError::NotFound("no open attendance record for today".into())
            })?;

        record.check_out_time = Some(now);
        if note.is_some() {
            record.check_out_note = note;
        }

        let expected = self.expected_hours(user_id).await?;
        finalize_durations(&mut record, expected);

        self.attendance.update(&record).await?;
        info!(user_id, day = %day, total = %record.total_hours_worked, "check-out recorded");
        Ok(record)
    }

    /// OPEN -> OPEN. Display-accuracy refresh the client re-issues every ten
    /// minutes while a session is open: recomputes elapsed time only, the
    /// overtime/deficit split waits for the actual check-out.
    pub async fn refresh_elapsed(
        &self,
        user_id: u64,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord, LedgerError> {
        let day = day_bucket::day_key(now, self.tz);
        let mut record = self
            .attendance
            .find(user_id, day)
            .await?
            .filter(|r| r.is_open())
            .ok_or_else(|| {
                LedgerError::NotFound("no open attendance record for today".into())
            })?;

        let check_in = record.check_in_time.ok_or_else(|| {
            LedgerError::Validation("open record has no check-in time".into())
        })?;
        let elapsed = ((now - check_in).num_seconds() as f64 / 3600.0).max(0.0);
        record.total_hours_worked = duration::format_hours(elapsed);

        self.attendance.update(&record).await?;
        Ok(record)
    }

    /// Manual edit by a manager or the user. Whenever the edited record ends
    /// up with a check-out time, the full duration computation re-runs with
    /// whichever check-in time is available.
    pub async fn apply_update(
        &self,
        user_id: u64,
        day: NaiveDate,
        patch: AttendancePatch,
    ) -> Result<AttendanceRecord, LedgerError> {
        let mut record = self.attendance.find(user_id, day).await?.ok_or_else(|| {
            LedgerError::NotFound(format!(
                "no attendance record for {}",
                day_bucket::label_for_day(day)
            ))
        })?;

        if let Some(ts) = patch.check_in_time {
            record.check_in_time = Some(ts);
        }
        if let Some(ts) = patch.check_out_time {
            record.check_out_time = Some(ts);
        }
        if patch.check_in_note.is_some() {
            record.check_in_note = patch.check_in_note;
        }
        if patch.check_out_note.is_some() {
            record.check_out_note = patch.check_out_note;
        }
        if let Some(flag) = patch.is_holiday {
            record.is_holiday = flag;
        }

        if let (Some(lat), Some(lon)) = (patch.latitude, patch.longitude) {
            validate_coordinates(lat, lon)?;
            if let Err(e) = self.users.backfill_position(user_id, lat, lon).await {
                warn!(user_id, error = %e, "position backfill failed");
            }
        }

        if record.check_out_time.is_some() {
            let expected = self.expected_hours(user_id).await?;
            finalize_durations(&mut record, expected);
        }

        self.attendance.update(&record).await?;
        Ok(record)
    }

    pub async fn record_for(
        &self,
        user_id: u64,
        day: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, LedgerError> {
        self.attendance.find(user_id, day).await
    }

    pub async fn history(&self, user_id: u64) -> Result<Vec<AttendanceRecord>, LedgerError> {
        self.attendance.list_by_user(user_id).await
    }

    pub async fn day_roster(&self, day: NaiveDate) -> Result<Vec<AttendanceRecord>, LedgerError> {
        self.attendance.list_by_day(day).await
    }

    pub async fn delete(&self, user_id: u64, day: NaiveDate) -> Result<bool, LedgerError> {
        self.attendance.delete(user_id, day).await
    }

    async fn expected_hours(&self, user_id: u64) -> Result<f64, LedgerError> {
        Ok(match self.users.expected_daily_hours(user_id).await? {
            Some(text) => {
                let hours = duration::parse_hours(&text);
                if hours <= 0.0 {
                    // Lenient parse is load-bearing for legacy data, but the
                    // fallback has to be visible somewhere.
                    warn!(user_id, value = %text, "unusable expected daily hours, defaulting");
                    worktime::DEFAULT_EXPECTED_HOURS
                } else {
                    hours
                }
            }
            None => worktime::DEFAULT_EXPECTED_HOURS,
        })
    }
}

/// The production ledger wiring used by the HTTP handlers.
pub type AppLedger = Ledger<
    crate::store::mysql::MySqlAttendanceStore,
    crate::store::mysql::MySqlUserDirectory,
    crate::store::mysql::MySqlOfficeLocationStore,
>;

fn finalize_durations(record: &mut AttendanceRecord, expected_hours: f64) {
    if let (Some(check_in), Some(check_out)) = (record.check_in_time, record.check_out_time) {
        let total = ((check_out - check_in).num_seconds() as f64 / 3600.0).max(0.0);
        let split = worktime::split_overtime(total, expected_hours);
        record.total_hours_worked = duration::format_hours(total);
        record.overtime = duration::format_hours(split.overtime);
        record.negative_working_hours = duration::format_hours(split.deficit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::office_location::OfficeLocation;
    use crate::store::memory::{MemoryAttendanceStore, MemoryOfficeStore, MemoryUserDirectory};
    use chrono::{Duration, TimeZone};
    use chrono_tz::Asia::Dhaka;

    const USER: u64 = 7;
    // Main Office in Dhaka; NEAR is ~0.08 km north, FAR is ~77 km away.
    const OFFICE: (f64, f64) = (23.8103, 90.4125);
    const NEAR: (f64, f64) = (23.8110, 90.4125);
    const FAR: (f64, f64) = (24.5, 90.4125);

    fn main_office() -> OfficeLocation {
        OfficeLocation {
            id: 1,
            name: "Main Office".into(),
            latitude: OFFICE.0,
            longitude: OFFICE.1,
        }
    }

    fn ledger_with(
        offices: Vec<OfficeLocation>,
    ) -> Ledger<MemoryAttendanceStore, MemoryUserDirectory, MemoryOfficeStore> {
        Ledger::new(
            MemoryAttendanceStore::new(),
            MemoryUserDirectory::new(),
            MemoryOfficeStore::new(offices),
            Dhaka,
            2.0,
        )
    }

    fn t0() -> DateTime<Utc> {
        // 09:00 Jun 5 in Dhaka.
        Utc.with_ymd_and_hms(2026, 6, 5, 3, 0, 0).unwrap()
    }

    fn fix_at(pos: (f64, f64)) -> CheckInRequest {
        CheckInRequest {
            latitude: Some(pos.0),
            longitude: Some(pos.1),
            ..Default::default()
        }
    }

    #[actix_web::test]
    async fn check_in_creates_open_record() {
        let ledger = ledger_with(vec![main_office()]);

        let rec = ledger.check_in(USER, fix_at(NEAR), t0()).await.unwrap();

        assert!(rec.is_open());
        assert_eq!(rec.date, "Jun 5");
        assert_eq!(rec.check_in_time, Some(t0()));
        assert_eq!(rec.total_hours_worked, "0h 0m 0s");
        assert_eq!(rec.overtime, "0h 0m 0s");
        assert_eq!(rec.negative_working_hours, "0h 0m 0s");
    }

    #[actix_web::test]
    async fn check_in_outside_radius_rejected_without_record() {
        let ledger = ledger_with(vec![main_office()]);

        let err = ledger.check_in(USER, fix_at(FAR), t0()).await.unwrap_err();
        match err {
            LedgerError::GeofenceViolation {
                nearest,
                distance_km,
                overshoot_km,
            } => {
                assert_eq!(nearest, "Main Office");
                assert!(distance_km > 2.0);
                assert!(overshoot_km > 0.0);
            }
            other => panic!("expected GeofenceViolation, got {:?}", other),
        }

        let day = day_bucket::day_key(t0(), Dhaka);
        assert!(ledger.record_for(USER, day).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn check_in_without_offices_is_refused() {
        let ledger = ledger_with(vec![]);
        let err = ledger.check_in(USER, fix_at(NEAR), t0()).await.unwrap_err();
        assert!(matches!(err, LedgerError::NoOfficeConfigured));
    }

    #[actix_web::test]
    async fn check_in_without_fix_is_location_unavailable() {
        let ledger = ledger_with(vec![main_office()]);
        let err = ledger
            .check_in(USER, CheckInRequest::default(), t0())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::LocationUnavailable(_)));
    }

    #[actix_web::test]
    async fn second_check_in_same_day_is_duplicate() {
        let ledger = ledger_with(vec![main_office()]);

        ledger.check_in(USER, fix_at(NEAR), t0()).await.unwrap();
        let err = ledger
            .check_in(USER, fix_at(NEAR), t0() + Duration::hours(1))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Duplicate(_)));

        // First record unaffected.
        let day = day_bucket::day_key(t0(), Dhaka);
        let rec = ledger.record_for(USER, day).await.unwrap().unwrap();
        assert_eq!(rec.check_in_time, Some(t0()));
    }

    #[actix_web::test]
    async fn check_out_without_open_record_is_not_found() {
        let ledger = ledger_with(vec![main_office()]);
        let err = ledger.check_out(USER, None, t0()).await.unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[actix_web::test]
    async fn full_day_overtime_split() {
        let ledger = ledger_with(vec![main_office()]);
        ledger
            .users
            .set_expected(USER, "8h 0m 0s")
            .await;

        ledger.check_in(USER, fix_at(NEAR), t0()).await.unwrap();
        let rec = ledger
            .check_out(USER, None, t0() + Duration::hours(9))
            .await
            .unwrap();

        assert!(rec.is_closed());
        assert_eq!(rec.total_hours_worked, "9h 0m 0s");
        assert_eq!(rec.overtime, "1h 0m 0s");
        assert_eq!(rec.negative_working_hours, "0h 0m 0s");
    }

    #[actix_web::test]
    async fn closed_day_cannot_reopen() {
        let ledger = ledger_with(vec![main_office()]);

        ledger.check_in(USER, fix_at(NEAR), t0()).await.unwrap();
        ledger
            .check_out(USER, None, t0() + Duration::hours(8))
            .await
            .unwrap();

        let err = ledger
            .check_in(USER, fix_at(NEAR), t0() + Duration::hours(10))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Duplicate(_)));

        let err = ledger
            .check_out(USER, None, t0() + Duration::hours(11))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[actix_web::test]
    async fn refresh_updates_elapsed_but_not_the_split() {
        let ledger = ledger_with(vec![main_office()]);

        ledger.check_in(USER, fix_at(NEAR), t0()).await.unwrap();
        let rec = ledger
            .refresh_elapsed(USER, t0() + Duration::minutes(150))
            .await
            .unwrap();

        assert!(rec.is_open());
        assert_eq!(rec.total_hours_worked, "2h 30m 0s");
        assert_eq!(rec.overtime, "0h 0m 0s");
        assert_eq!(rec.negative_working_hours, "0h 0m 0s");
    }

    #[actix_web::test]
    async fn position_backfilled_only_once() {
        let ledger = ledger_with(vec![main_office()]);

        ledger.check_in(USER, fix_at(NEAR), t0()).await.unwrap();
        assert_eq!(ledger.users.position(USER).await, Some(NEAR));

        // Next day, different fix: stored position must not move.
        let other = (23.8105, 90.4130);
        ledger
            .check_in(USER, fix_at(other), t0() + Duration::hours(24))
            .await
            .unwrap();
        assert_eq!(ledger.users.position(USER).await, Some(NEAR));
    }

    #[actix_web::test]
    async fn manual_edit_recomputes_durations() {
        let ledger = ledger_with(vec![main_office()]);

        ledger.check_in(USER, fix_at(NEAR), t0()).await.unwrap();
        let day = day_bucket::day_key(t0(), Dhaka);
        let rec = ledger
            .apply_update(
                USER,
                day,
                AttendancePatch {
                    check_out_time: Some(t0() + Duration::hours(6)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(rec.total_hours_worked, "6h 0m 0s");
        assert_eq!(rec.overtime, "0h 0m 0s");
        assert_eq!(rec.negative_working_hours, "2h 0m 0s");
    }

    #[actix_web::test]
    async fn manual_edit_of_missing_record_is_not_found() {
        let ledger = ledger_with(vec![main_office()]);
        let day = day_bucket::day_key(t0(), Dhaka);
        let err = ledger
            .apply_update(USER, day, AttendancePatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[actix_web::test]
    async fn explicit_day_argument_wins_over_timestamp() {
        let ledger = ledger_with(vec![main_office()]);

        let day = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let rec = ledger
            .check_in(
                USER,
                CheckInRequest {
                    day: Some(day),
                    latitude: Some(NEAR.0),
                    longitude: Some(NEAR.1),
                    ..Default::default()
                },
                t0(),
            )
            .await
            .unwrap();

        assert_eq!(rec.day_key, day);
        assert_eq!(rec.date, "Jun 1");
    }

    #[actix_web::test]
    async fn record_for_is_scoped_to_one_user_and_day() {
        let ledger = ledger_with(vec![main_office()]);

        ledger.check_in(USER, fix_at(NEAR), t0()).await.unwrap();
        let day = day_bucket::day_key(t0(), Dhaka);

        let rec = ledger.record_for(USER, day).await.unwrap().unwrap();
        assert_eq!(rec.user_id, USER);
        assert_eq!(rec.day_key, day);

        // Neither another user nor another day sees it.
        assert!(ledger.record_for(USER + 1, day).await.unwrap().is_none());
        let next_day = day.succ_opt().unwrap();
        assert!(ledger.record_for(USER, next_day).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn history_is_day_descending_across_years() {
        let ledger = ledger_with(vec![main_office()]);

        // "Jan 5" twice, a year apart: the labels collide, day keys do not.
        let d1 = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        for day in [d1, d2] {
            ledger
                .check_in(
                    USER,
                    CheckInRequest {
                        day: Some(day),
                        latitude: Some(NEAR.0),
                        longitude: Some(NEAR.1),
                        ..Default::default()
                    },
                    t0(),
                )
                .await
                .unwrap();
        }

        let history = ledger.history(USER).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].day_key, d2);
        assert_eq!(history[1].day_key, d1);
        assert_eq!(history[0].date, history[1].date);
    }
}
