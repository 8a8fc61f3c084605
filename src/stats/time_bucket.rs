//! Local-day bucketing for day-scoped records
//!
//! Every day-scoped record is keyed by a local date stamp ("YYYY-MM-DD")
//! computed from the device time zone. Day gaps are the difference of two
//! calendar stamps, with no stronger guarantee across DST transitions.

use std::sync::Mutex;

use chrono::{Local, NaiveDate};

const STAMP_FORMAT: &str = "%Y-%m-%d";

/// Source of "today" for the stats subsystem
pub trait Clock: Send + Sync {
    /// Today's date in the user's local time zone
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Manually driven clock for tests and replays
#[derive(Debug)]
pub struct FixedClock {
    today: Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    /// Move the clock to a specific day
    pub fn set(&self, day: NaiveDate) {
        if let Ok(mut today) = self.today.lock() {
            *today = day;
        }
    }

    /// Move the clock forward (or backward, for negative values) by whole days
    pub fn advance_days(&self, days: i64) {
        if let Ok(mut today) = self.today.lock() {
            *today += chrono::Duration::days(days);
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        match self.today.lock() {
            Ok(today) => *today,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Format a date as a "YYYY-MM-DD" stamp
pub fn date_stamp(date: NaiveDate) -> String {
    date.format(STAMP_FORMAT).to_string()
}

/// Parse a "YYYY-MM-DD" stamp
pub fn parse_date_stamp(stamp: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(stamp, STAMP_FORMAT).ok()
}

/// Whole calendar days from `earlier` to `later` (negative if `later` is before)
///
/// Returns None when `earlier` is not a valid stamp.
pub fn day_gap(earlier: &str, later: NaiveDate) -> Option<i64> {
    parse_date_stamp(earlier).map(|d| (later - d).num_days())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_stamp_roundtrip() {
        let d = day(2024, 3, 9);
        assert_eq!(date_stamp(d), "2024-03-09");
        assert_eq!(parse_date_stamp("2024-03-09"), Some(d));
        assert_eq!(parse_date_stamp("03/09/2024"), None);
    }

    #[test]
    fn test_day_gap_across_month_and_year() {
        assert_eq!(day_gap("2023-12-31", day(2024, 1, 1)), Some(1));
        assert_eq!(day_gap("2024-02-28", day(2024, 3, 1)), Some(2));
        assert_eq!(day_gap("2024-03-10", day(2024, 3, 10)), Some(0));
        assert_eq!(day_gap("2024-03-11", day(2024, 3, 10)), Some(-1));
        assert_eq!(day_gap("garbage", day(2024, 3, 10)), None);
    }

    #[test]
    fn test_fixed_clock_advances() {
        let clock = FixedClock::new(day(2024, 1, 30));
        clock.advance_days(2);
        assert_eq!(clock.today(), day(2024, 2, 1));
        clock.advance_days(-1);
        assert_eq!(clock.today(), day(2024, 1, 31));
        clock.set(day(2025, 6, 1));
        assert_eq!(clock.today(), day(2025, 6, 1));
    }
}
