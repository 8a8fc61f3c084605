//! Persisted stats records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::time_bucket::{date_stamp, day_gap};

/// Milliseconds of typing per minute credited in `SessionStats::minutes`
pub const MS_PER_MINUTE: u64 = 60_000;

/// Today's writing totals, keyed by local day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    /// Local date stamp this record covers
    pub date: String,
    /// Words gained today
    #[serde(default)]
    pub words: u64,
    /// Whole minutes of active typing today
    #[serde(default)]
    pub minutes: u64,
    /// Sprints completed today
    #[serde(default)]
    pub sprints: u64,
    /// Most words gained in a single sprint today
    #[serde(default)]
    pub best_sprint: u64,
}

impl SessionStats {
    /// A zeroed record for `day`
    pub fn fresh(day: NaiveDate) -> Self {
        Self {
            date: date_stamp(day),
            ..Self::default()
        }
    }

    pub fn is_for(&self, day: NaiveDate) -> bool {
        self.date == date_stamp(day)
    }

    /// This record if it covers `day`, otherwise a fresh zeroed one.
    ///
    /// Stale records are replaced, never mutated.
    pub fn rolled_to(self, day: NaiveDate) -> Self {
        if self.is_for(day) {
            self
        } else {
            Self::fresh(day)
        }
    }
}

/// Consecutive-day writing streak
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakData {
    /// Consecutive days with at least one word gained
    #[serde(default)]
    pub count: u64,
    /// Longest streak ever reached
    #[serde(default)]
    pub record: u64,
    /// Last day the streak was credited
    #[serde(default)]
    pub last_date: Option<String>,
}

impl StreakData {
    /// Whether the streak is still alive (credited today or yesterday)
    pub fn is_active(&self, today: NaiveDate) -> bool {
        self.last_date
            .as_deref()
            .and_then(|last| day_gap(last, today))
            .is_some_and(|gap| (0..=1).contains(&gap))
    }
}

/// Active typing time accumulated today
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingTime {
    /// Local date stamp this accumulation belongs to
    pub date: String,
    /// Milliseconds of active typing
    #[serde(default)]
    pub time: u64,
}

impl TypingTime {
    pub fn fresh(day: NaiveDate) -> Self {
        Self {
            date: date_stamp(day),
            time: 0,
        }
    }

    /// Typing time credited to `day` (zero if the record is from another day)
    pub fn millis_on(&self, day: NaiveDate) -> u64 {
        if self.date == date_stamp(day) {
            self.time
        } else {
            0
        }
    }

    /// Whole minutes credited to `day`
    pub fn minutes_on(&self, day: NaiveDate) -> u64 {
        self.millis_on(day) / MS_PER_MINUTE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn test_session_stats_json_layout() {
        let stats = SessionStats {
            date: "2024-05-02".into(),
            words: 10,
            minutes: 1,
            sprints: 2,
            best_sprint: 7,
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["bestSprint"], 7);
        assert_eq!(json["date"], "2024-05-02");

        let partial: SessionStats = serde_json::from_str(r#"{"date":"2024-05-02"}"#).unwrap();
        assert_eq!(partial, SessionStats::fresh(day(2)));
    }

    #[test]
    fn test_stale_session_is_replaced() {
        let stale = SessionStats {
            date: "2024-05-01".into(),
            words: 400,
            minutes: 30,
            sprints: 3,
            best_sprint: 250,
        };
        assert_eq!(stale.clone().rolled_to(day(2)), SessionStats::fresh(day(2)));
        assert_eq!(stale.clone().rolled_to(day(1)), stale);
    }

    #[test]
    fn test_streak_activity_window() {
        let streak = StreakData {
            count: 3,
            record: 5,
            last_date: Some("2024-05-10".into()),
        };
        assert!(streak.is_active(day(10)));
        assert!(streak.is_active(day(11)));
        assert!(!streak.is_active(day(12)));
        assert!(!StreakData::default().is_active(day(10)));
    }

    #[test]
    fn test_typing_minutes_floor_and_day_scope() {
        let typing = TypingTime {
            date: "2024-05-03".into(),
            time: 179_999,
        };
        assert_eq!(typing.minutes_on(day(3)), 2);
        assert_eq!(typing.minutes_on(day(4)), 0);
    }
}
