//! Session statistics
//!
//! Tracks today's words, typing minutes, sprint counts and the daily writing
//! streak in the key-value store (`~/.wordsprint/stats.db` by default).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐
//! │  Typing bursts  │   │   Word deltas   │   │  Sprint timer   │
//! │  (typingTime)   │   │   (debounced)   │   │    (results)    │
//! └────────┬────────┘   └────────┬────────┘   └────────┬────────┘
//!          │ set                 │ transaction         │ read/modify/write
//!          └─────────────────────┼─────────────────────┘
//!                                ▼
//!                         key-value store
//! ```
//!
//! Only [`StatsLedger`] writes `sessionStats` and `streakData`.
//!
//! # Usage
//!
//! ```ignore
//! let ledger = StatsLedger::new(store, Arc::new(SystemClock));
//!
//! ledger.apply_word_delta(42).await?;
//! ledger.register_sprint_result(150).await?;
//!
//! let stats = ledger.display_stats().await;
//! ```

mod ledger;
mod models;
pub mod streaks;
pub mod time_bucket;

pub use ledger::{DisplayStats, LedgerError, LedgerUpdate, StatsLedger};
pub use models::{MS_PER_MINUTE, SessionStats, StreakData, TypingTime};
pub use time_bucket::{Clock, FixedClock, SystemClock, date_stamp, day_gap, parse_date_stamp};
