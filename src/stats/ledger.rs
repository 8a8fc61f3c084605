//! Stats ledger - the only writer of session stats and streak data

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::models::{SessionStats, StreakData, TypingTime};
use super::streaks;
use super::time_bucket::Clock;
use crate::report::Severity;
use crate::store::{self, KeyValueStore, StoreError, keys};

/// Keys read and written by the word-delta transaction
const WORD_DELTA_KEYS: [&str; 3] = [keys::TYPING_TIME, keys::SESSION_STATS, keys::STREAK_DATA];

/// Error type for ledger operations
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Stats transaction failed, nothing was written: {0}")]
    Transaction(#[source] StoreError),

    #[error("Failed to record sprint result: {0}")]
    SprintResult(#[source] StoreError),
}

impl LedgerError {
    pub fn severity(&self) -> Severity {
        match self {
            Self::Transaction(_) => Severity::Critical,
            Self::SprintResult(_) => Severity::Error,
        }
    }
}

/// Records committed by a word-delta transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerUpdate {
    pub session: SessionStats,
    pub streak: StreakData,
    /// Whether this update credited today to the streak
    pub streak_extended: bool,
}

/// Read-only view for rendering
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayStats {
    pub session: SessionStats,
    pub streak: StreakData,
    /// Streak credited today or yesterday
    pub streak_active: bool,
}

/// Owns `sessionStats` and `streakData`.
///
/// Every day-rollover and streak update goes through here.
pub struct StatsLedger {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl StatsLedger {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Credit `words_gained` to today, atomically across typing time,
    /// session stats and the streak.
    ///
    /// Zero is accepted and writes nothing (returns `Ok(None)`). On failure
    /// no record is touched.
    pub async fn apply_word_delta(&self, words_gained: u64) -> Result<Option<LedgerUpdate>, LedgerError> {
        if words_gained == 0 {
            return Ok(None);
        }

        // One date for all three records, even if midnight passes meanwhile
        let today = self.clock.today();
        let mut committed = None;

        self.store
            .transaction(
                &WORD_DELTA_KEYS,
                Box::new(|txn| {
                    let typing: TypingTime = txn.get(keys::TYPING_TIME)?.unwrap_or_default();
                    let session: SessionStats = txn.get(keys::SESSION_STATS)?.unwrap_or_default();
                    let streak: StreakData = txn.get(keys::STREAK_DATA)?.unwrap_or_default();

                    let (streak, streak_extended) = match streaks::advance(&streak, today) {
                        Some(next) => {
                            txn.put(keys::STREAK_DATA, &next)?;
                            (next, true)
                        }
                        None => (streak, false),
                    };

                    let mut session = session.rolled_to(today);
                    session.words += words_gained;
                    session.minutes = typing.minutes_on(today);
                    txn.put(keys::SESSION_STATS, &session)?;

                    committed = Some(LedgerUpdate {
                        session,
                        streak,
                        streak_extended,
                    });
                    Ok(())
                }),
            )
            .await
            .map_err(LedgerError::Transaction)?;

        if let Some(update) = &committed {
            debug!(
                words_gained,
                words_today = update.session.words,
                streak = update.streak.count,
                "Applied word delta"
            );
            if update.streak_extended {
                info!(count = update.streak.count, record = update.streak.record, "Streak credited for today");
            }
        }
        Ok(committed)
    }

    /// Count a finished sprint and update today's best.
    ///
    /// Plain read-modify-write outside the word-delta transaction; a missing
    /// session record means nothing has been written today and is left alone.
    pub async fn register_sprint_result(&self, words_gained: u64) -> Result<(), LedgerError> {
        let today = self.clock.today();
        let current: Option<SessionStats> = store::load(self.store.as_ref(), keys::SESSION_STATS)
            .await
            .map_err(LedgerError::SprintResult)?;

        let Some(session) = current else {
            debug!(words_gained, "No session record yet, sprint result not recorded");
            return Ok(());
        };

        let mut session = session.rolled_to(today);
        session.sprints += 1;
        session.best_sprint = session.best_sprint.max(words_gained);

        store::save(self.store.as_ref(), keys::SESSION_STATS, &session)
            .await
            .map_err(LedgerError::SprintResult)?;

        info!(
            words_gained,
            sprints = session.sprints,
            best_sprint = session.best_sprint,
            "Recorded sprint result"
        );
        Ok(())
    }

    /// Delete today's session, the streak and typing time as one unit.
    ///
    /// Document and goal are kept. On failure no record is touched.
    pub async fn reset(&self) -> Result<(), LedgerError> {
        self.store
            .transaction(
                &WORD_DELTA_KEYS,
                Box::new(|txn| {
                    for key in WORD_DELTA_KEYS {
                        txn.delete(key)?;
                    }
                    Ok(())
                }),
            )
            .await
            .map_err(LedgerError::Transaction)?;

        info!("Stats reset");
        Ok(())
    }

    /// Latest committed stats for rendering.
    ///
    /// Never fails: unreadable records fall back to zeroed defaults. A
    /// session record from an earlier day is shown as today's empty record
    /// without being rewritten.
    pub async fn display_stats(&self) -> DisplayStats {
        let today = self.clock.today();

        let session = self
            .load_or_default::<SessionStats>(keys::SESSION_STATS)
            .await
            .rolled_to(today);
        let streak = self.load_or_default::<StreakData>(keys::STREAK_DATA).await;
        let streak_active = streak.is_active(today);

        DisplayStats {
            session,
            streak,
            streak_active,
        }
    }

    async fn load_or_default<T>(&self, key: &str) -> T
    where
        T: serde::de::DeserializeOwned + Default,
    {
        match store::load(self.store.as_ref(), key).await {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                warn!(key, error = %e, "Failed to read stats record, using defaults");
                T::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::time_bucket::FixedClock;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn setup(day: u32) -> (Arc<MemoryStore>, Arc<FixedClock>, StatsLedger) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2024, 9, day).unwrap()));
        let ledger = StatsLedger::new(store.clone(), clock.clone());
        (store, clock, ledger)
    }

    #[tokio::test]
    async fn test_word_deltas_add_up() {
        let (_store, _clock, ledger) = setup(2);
        ledger.apply_word_delta(120).await.unwrap();
        let update = ledger.apply_word_delta(35).await.unwrap().unwrap();

        assert_eq!(update.session.words, 155);
        assert_eq!(update.session.date, "2024-09-02");
        assert_eq!(ledger.display_stats().await.session.words, 155);
    }

    #[tokio::test]
    async fn test_zero_delta_writes_nothing() {
        let (store, _clock, ledger) = setup(2);
        assert!(ledger.apply_word_delta(0).await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_streak_credited_once_per_day() {
        let (_store, _clock, ledger) = setup(2);
        let first = ledger.apply_word_delta(10).await.unwrap().unwrap();
        let second = ledger.apply_word_delta(10).await.unwrap().unwrap();

        assert!(first.streak_extended);
        assert!(!second.streak_extended);
        assert_eq!(second.streak.count, 1);
    }

    #[tokio::test]
    async fn test_minutes_follow_typing_time() {
        let (store, _clock, ledger) = setup(2);
        store::save(
            &*store,
            keys::TYPING_TIME,
            &TypingTime {
                date: "2024-09-02".into(),
                time: 185_000,
            },
        )
        .await
        .unwrap();

        let update = ledger.apply_word_delta(5).await.unwrap().unwrap();
        assert_eq!(update.session.minutes, 3);
    }

    #[tokio::test]
    async fn test_sprint_result_needs_session_record() {
        let (store, _clock, ledger) = setup(2);
        ledger.register_sprint_result(40).await.unwrap();
        assert!(store.is_empty());

        ledger.apply_word_delta(40).await.unwrap();
        ledger.register_sprint_result(40).await.unwrap();
        ledger.register_sprint_result(12).await.unwrap();

        let stats = ledger.display_stats().await;
        assert_eq!(stats.session.sprints, 2);
        assert_eq!(stats.session.best_sprint, 40);
    }

    #[tokio::test]
    async fn test_reset_clears_stats_but_keeps_document() {
        let (store, _clock, ledger) = setup(2);
        ledger.apply_word_delta(25).await.unwrap();
        store::save(&*store, keys::DOCUMENT, &"draft").await.unwrap();

        ledger.reset().await.unwrap();

        assert_eq!(store.len(), 1);
        let stats = ledger.display_stats().await;
        assert_eq!(stats.session, SessionStats::fresh(NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()));
        assert_eq!(stats.streak, StreakData::default());
    }

    #[tokio::test]
    async fn test_display_hides_stale_session_without_writing() {
        let (store, clock, ledger) = setup(2);
        ledger.apply_word_delta(90).await.unwrap();
        clock.advance_days(1);

        let stats = ledger.display_stats().await;
        assert_eq!(stats.session, SessionStats::fresh(clock.today()));
        assert!(stats.streak_active);

        let persisted: SessionStats = store::load(&*store, keys::SESSION_STATS)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(persisted.words, 90);
        assert_eq!(persisted.date, "2024-09-02");
    }
}
