//! Daily writing streak rule
//!
//! A day counts toward the streak once, the first time words are gained on
//! it. Crediting the day after the last credited day extends the streak;
//! any other gap (none recorded, two or more days, or a negative gap from
//! clock skew) restarts it at 1, since the credited day counts itself.

use chrono::NaiveDate;

use super::models::StreakData;
use super::time_bucket::{date_stamp, day_gap};

/// Credit `today` to the streak.
///
/// Returns None when today is already credited (idempotent).
pub fn advance(streak: &StreakData, today: NaiveDate) -> Option<StreakData> {
    let today_stamp = date_stamp(today);
    if streak.last_date.as_deref() == Some(today_stamp.as_str()) {
        return None;
    }

    let gap = streak.last_date.as_deref().and_then(|last| day_gap(last, today));
    let count = match gap {
        Some(1) => streak.count + 1,
        _ => 1,
    };

    Some(StreakData {
        count,
        record: streak.record.max(count),
        last_date: Some(today_stamp),
    })
}
