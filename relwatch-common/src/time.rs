//! Calendar-day helpers
//!
//! The due gate compares UTC calendar days, never local ones, so a pass
//! belongs to the same day wherever the process runs.

use chrono::{DateTime, NaiveDate, Utc};

/// Calendar day of a timestamp (UTC)
pub fn calendar_day(ts: DateTime<Utc>) -> NaiveDate {
    ts.date_naive()
}

/// True when both timestamps fall on the same UTC calendar day
pub fn same_calendar_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    calendar_day(a) == calendar_day(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_same_calendar_day_within_day() {
        let morning = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 1).unwrap();
        let night = Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 59).unwrap();
        assert!(same_calendar_day(morning, night));
    }

    #[test]
    fn test_same_calendar_day_across_midnight() {
        let before = Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 59).unwrap();
        let after = Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap();
        assert!(!same_calendar_day(before, after));
    }

    #[test]
    fn test_calendar_day_is_utc() {
        let ts = chrono::FixedOffset::east_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 11, 1, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(calendar_day(ts), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    }
}
