//! wordsprint - writing goals, timed sprints and daily streaks
//!
//! Counts words toward a goal, runs timed writing sprints and keeps
//! per-day statistics (words, typing minutes, sprints, best sprint) plus a
//! consecutive-day streak. Everything is stored locally.
//!
//! ## Core
//!
//! - [`stats::StatsLedger`]: atomic word-delta transaction, sprint results,
//!   display reads
//! - [`sprint::SprintTimer`]: idle/running/paused/finished countdown
//! - [`typing::TypingTracker`]: active typing time per burst
//! - [`words::count_words`]: word counting
//!
//! [`session::WritingSession`] wires them to a text buffer and a
//! [`session::DisplaySink`].

pub mod config;
pub mod debounce;
pub mod document;
pub mod report;
pub mod session;
pub mod sprint;
pub mod stats;
pub mod store;
pub mod typing;
pub mod words;

pub use config::Config;
pub use report::Severity;
pub use session::{DisplaySink, DisplayUpdate, WritingSession};
pub use sprint::{SprintSnapshot, SprintStatus, SprintTimer};
pub use stats::{DisplayStats, SessionStats, StatsLedger, StreakData, TypingTime};
pub use store::{KeyValueStore, MemoryStore, SqliteStore, StoreError};
pub use words::count_words;
