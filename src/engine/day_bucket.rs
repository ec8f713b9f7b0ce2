use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Calendar day of an instant in the organizational timezone. Uniqueness
/// and ordering key for attendance records.
pub fn day_key(ts: DateTime<Utc>, tz: Tz) -> NaiveDate {
    ts.with_timezone(&tz).date_naive()
}

/// Display label for a day, e.g. "Jun 5". Year-less on purpose: this is the
/// bucket string older records were filed under, so it stays stable while
/// `day_key` disambiguates across years.
pub fn label_for_day(day: NaiveDate) -> String {
    day.format("%b %-d").to_string()
}

/// Label for an instant, resolved in the organizational timezone.
pub fn bucket_label(ts: DateTime<Utc>, tz: Tz) -> String {
    label_for_day(day_key(ts, tz))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Dhaka;

    #[test]
    fn label_has_no_year_and_no_zero_padding() {
        let day = NaiveDate::from_ymd_opt(2026, 6, 5).unwrap();
        assert_eq!(label_for_day(day), "Jun 5");
        let day = NaiveDate::from_ymd_opt(2026, 12, 25).unwrap();
        assert_eq!(label_for_day(day), "Dec 25");
    }

    #[test]
    fn same_wall_clock_day_maps_to_same_bucket() {
        // 20:00Z on Jun 4 is already Jun 5 in Dhaka (UTC+6); 10:00Z on
        // Jun 5 still is.
        let late = Utc.with_ymd_and_hms(2026, 6, 4, 20, 0, 0).unwrap();
        let midday = Utc.with_ymd_and_hms(2026, 6, 5, 10, 0, 0).unwrap();

        assert_eq!(day_key(late, Dhaka), day_key(midday, Dhaka));
        assert_eq!(bucket_label(late, Dhaka), "Jun 5");
        assert_eq!(bucket_label(midday, Dhaka), "Jun 5");
    }

    #[test]
    fn utc_day_differs_from_org_day_near_midnight() {
        let ts = Utc.with_ymd_and_hms(2026, 6, 4, 19, 30, 0).unwrap();
        assert_eq!(ts.date_naive(), NaiveDate::from_ymd_opt(2026, 6, 4).unwrap());
        assert_eq!(day_key(ts, Dhaka), NaiveDate::from_ymd_opt(2026, 6, 5).unwrap());
    }
}
