//! Active typing time
//!
//! Measures time spent actually typing rather than time the app was open.
//! A burst starts on the first keystroke after a quiet period and ends once
//! no key has been pressed for the idle interval (3 s by default); only the
//! span from first key to last-activity timeout is credited.
//!
//! The accumulator persists `typingTime` on its own. Session minutes are
//! derived from it by the stats ledger; nothing here writes session stats.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::NaiveDate;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::report::{self, Severity};
use crate::stats::{Clock, TypingTime, date_stamp};
use crate::store::{self, KeyValueStore, keys};

/// Default quiet interval that ends a burst
pub const DEFAULT_IDLE: Duration = Duration::from_millis(3_000);

#[derive(Debug)]
struct BurstState {
    date: NaiveDate,
    total_ms: u64,
    burst_start: Option<Instant>,
}

impl BurstState {
    fn record(&self) -> TypingTime {
        TypingTime {
            date: date_stamp(self.date),
            time: self.total_ms,
        }
    }
}

/// Typing-burst accumulator, shared as `Arc<TypingTracker>`
pub struct TypingTracker {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    idle: Duration,
    state: Mutex<BurstState>,
    idle_timer: Mutex<Option<JoinHandle<()>>>,
}

impl TypingTracker {
    /// Restore today's total from the store (zero if absent, stale or unreadable)
    pub async fn load(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, idle: Duration) -> Arc<Self> {
        let today = clock.today();
        let stored: Option<TypingTime> = match store::load(store.as_ref(), keys::TYPING_TIME).await {
            Ok(stored) => stored,
            Err(e) => {
                report::report(Severity::Warn, "Failed to read typing time", &e, None);
                None
            }
        };
        let total_ms = stored.map(|t| t.millis_on(today)).unwrap_or(0);

        Arc::new(Self {
            store,
            clock,
            idle,
            state: Mutex::new(BurstState {
                date: today,
                total_ms,
                burst_start: None,
            }),
            idle_timer: Mutex::new(None),
        })
    }

    /// Register a keystroke: roll the day if needed, open a burst if none is
    /// in progress, and restart the idle countdown.
    pub async fn keystroke(self: &Arc<Self>) {
        let today = self.clock.today();

        let rolled = {
            let mut state = self.state();
            if state.date != today {
                debug!(from = %state.date, to = %today, "Typing time rolled to a new day");
                state.date = today;
                state.total_ms = 0;
                state.burst_start = None;
                Some(state.record())
            } else {
                None
            }
        };
        if let Some(record) = rolled {
            self.persist(&record).await;
        }

        {
            let mut state = self.state();
            if state.burst_start.is_none() {
                state.burst_start = Some(Instant::now());
            }
        }

        self.arm_idle_timer();
    }

    /// Close the current burst now (e.g. before shutdown)
    pub async fn flush(&self) {
        if let Some(timer) = self.timer_slot().take() {
            timer.abort();
        }
        self.end_burst().await;
    }

    /// Today's accumulated total, excluding any burst still in progress
    pub fn total(&self) -> TypingTime {
        self.state().record()
    }

    /// Whether a burst is in progress
    pub fn is_typing(&self) -> bool {
        self.state().burst_start.is_some()
    }

    fn arm_idle_timer(self: &Arc<Self>) {
        let this = Arc::clone(self);
        let idle = self.idle;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(idle).await;
            this.end_burst().await;
        });

        if let Some(previous) = self.timer_slot().replace(timer) {
            previous.abort();
        }
    }

    async fn end_burst(&self) {
        let record = {
            let mut state = self.state();
            let Some(start) = state.burst_start.take() else {
                return;
            };
            let elapsed = start.elapsed().as_millis() as u64;
            state.total_ms += elapsed;
            debug!(elapsed_ms = elapsed, total_ms = state.total_ms, "Typing burst ended");
            state.record()
        };
        self.persist(&record).await;
    }

    async fn persist(&self, record: &TypingTime) {
        if let Err(e) = store::save(self.store.as_ref(), keys::TYPING_TIME, record).await {
            report::report(Severity::Warn, "Failed to persist typing time", &e, None);
        }
    }

    fn state(&self) -> MutexGuard<'_, BurstState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn timer_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        match self.idle_timer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Drop for TypingTracker {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.idle_timer.lock() {
            if let Some(timer) = slot.take() {
                timer.abort();
            }
        }
    }
}
