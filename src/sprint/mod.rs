//! Timed writing sprints
//!
//! [`SprintTimer`] drives a [`SprintState`] with a repeating tick. Only one
//! sprint runs at a time: every `start`, `end` or `reset` bumps a generation
//! counter and aborts the running tick task before touching the state, so a
//! stale tick can never act on a newer sprint.
//!
//! Accounting:
//! - natural completion registers the result and fires the completion hook,
//!   even if a new sprint starts while the result is being saved
//! - `end(false)` registers a positive result without the completion hook
//! - `end(true)` / `reset()` / a new `start` discard the result

mod state;

pub use state::{MAX_SPRINT_MINUTES, SprintState, SprintStatus};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::SprintSettings;
use crate::report::{self, Notifier};
use crate::stats::StatsLedger;
use crate::words::WordSource;

/// What the display needs to draw the sprint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SprintSnapshot {
    pub status: SprintStatus,
    pub duration: Duration,
    pub remaining: Duration,
    /// Live gain while active, final gain once finished
    pub words_gained: u64,
}

impl SprintSnapshot {
    fn capture(state: &SprintState, now: Instant, current_words: u64) -> Self {
        let words_gained = match state.status() {
            SprintStatus::Running | SprintStatus::Paused => state.gained_against(current_words),
            SprintStatus::Finished => state.words_gained(),
            SprintStatus::Idle => 0,
        };
        Self {
            status: state.status(),
            duration: state.duration(),
            remaining: state.remaining(now),
            words_gained,
        }
    }
}

/// Receives sprint display refreshes and completion feedback
pub trait SprintObserver: Send + Sync {
    /// Called on every tick and after every transition
    fn tick(&self, _snapshot: &SprintSnapshot) {}

    /// Called exactly once per natural completion, never on cancellation
    fn completed(&self, words_gained: u64);
}

struct Inner {
    state: Mutex<SprintState>,
    generation: AtomicU64,
    ticker: Mutex<Option<JoinHandle<()>>>,
    ledger: Arc<StatsLedger>,
    words: Arc<dyn WordSource>,
    observer: Arc<dyn SprintObserver>,
    notifier: Option<Arc<dyn Notifier>>,
    tick: Duration,
    finish_delay: Duration,
}

/// Sprint countdown service, cheap to clone
#[derive(Clone)]
pub struct SprintTimer {
    inner: Arc<Inner>,
}

impl SprintTimer {
    pub fn new(
        ledger: Arc<StatsLedger>,
        words: Arc<dyn WordSource>,
        observer: Arc<dyn SprintObserver>,
        notifier: Option<Arc<dyn Notifier>>,
        settings: &SprintSettings,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(SprintState::default()),
                generation: AtomicU64::new(0),
                ticker: Mutex::new(None),
                ledger,
                words,
                observer,
                notifier,
                tick: settings.tick(),
                finish_delay: settings.finish_delay(),
            }),
        }
    }

    /// Start a sprint of `duration_minutes` from `current_words`.
    ///
    /// Any sprint in progress is cancelled without recording its result.
    /// Must be called inside a tokio runtime.
    pub fn start(&self, duration_minutes: u64, current_words: u64) {
        let generation = {
            let mut state = self.inner.state();
            let generation = self.inner.invalidate(&state);
            state.start(duration_minutes, current_words, Instant::now());
            generation
        };
        info!(duration_minutes, start_words = current_words, "Sprint started");

        let ticker = tokio::spawn(Inner::run_ticker(Arc::clone(&self.inner), generation));
        *self.inner.ticker_slot() = Some(ticker);
        self.inner.refresh();
    }

    /// Freeze the countdown (running only)
    pub fn pause(&self) -> bool {
        let paused = self.inner.state().pause(Instant::now());
        if paused {
            debug!("Sprint paused");
            self.inner.refresh();
        }
        paused
    }

    /// Continue from the frozen remaining time (paused only)
    pub fn resume(&self) -> bool {
        let resumed = self.inner.state().resume(Instant::now());
        if resumed {
            debug!("Sprint resumed");
            self.inner.refresh();
        }
        resumed
    }

    /// Stop the sprint and return to idle.
    ///
    /// Unless `user_cancelled`, a positive gain from a running or paused
    /// sprint is recorded as a sprint result, which is also returned.
    pub async fn end(&self, user_cancelled: bool) -> Option<u64> {
        let pending = {
            let mut state = self.inner.state();
            self.inner.invalidate(&state);
            let pending = if !user_cancelled && state.status().is_active() {
                Some(state.gained_against(self.inner.words.word_count())).filter(|g| *g > 0)
            } else {
                None
            };
            state.reset();
            pending
        };
        info!(user_cancelled, words_gained = pending.unwrap_or(0), "Sprint ended");

        if let Some(gained) = pending {
            self.inner.register(gained).await;
        }
        self.inner.refresh();
        pending
    }

    /// Cancel the sprint, discarding its result
    pub fn reset(&self) {
        {
            let mut state = self.inner.state();
            self.inner.invalidate(&state);
            state.reset();
        }
        debug!("Sprint reset");
        self.inner.refresh();
    }

    /// Current sprint view
    pub fn snapshot(&self) -> SprintSnapshot {
        self.inner.snapshot()
    }

    pub fn status(&self) -> SprintStatus {
        self.inner.state().status()
    }
}

impl Inner {
    /// Repeating tick for one sprint generation
    async fn run_ticker(inner: Arc<Self>, generation: u64) {
        let mut interval = tokio::time::interval(inner.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            if inner.generation.load(Ordering::SeqCst) != generation {
                return;
            }

            let due = inner.state().is_due(Instant::now());
            inner.refresh();
            if due {
                inner.complete(generation).await;
                return;
            }
        }
    }

    /// Natural completion: record, notify, linger, then go idle
    async fn complete(&self, generation: u64) {
        let gained = {
            let mut state = self.state();
            if self.generation.load(Ordering::SeqCst) != generation {
                return;
            }
            match state.finish(self.words.word_count()) {
                Some(gained) => gained,
                None => return,
            }
        };
        info!(words_gained = gained, "Sprint completed");

        self.register(gained).await;
        self.observer.completed(gained);
        self.refresh();

        tokio::time::sleep(self.finish_delay).await;

        let idled = {
            let mut state = self.state();
            let current = self.generation.load(Ordering::SeqCst) == generation;
            if current {
                state.reset();
            }
            current
        };
        if idled {
            self.refresh();
        }
    }

    /// Record a sprint result; failures are reported and swallowed
    async fn register(&self, gained: u64) {
        if let Err(e) = self.ledger.register_sprint_result(gained).await {
            report::report(e.severity(), "Sprint result not saved", &e, self.notifier.as_deref());
        }
    }

    /// Stop the current tick task and start a new generation.
    ///
    /// Callers hold the state lock so the bump and the state change are seen
    /// together. A finished sprint's task is detached instead of aborted: it
    /// still owes the result and the completion hook, and the generation bump
    /// keeps it from touching the new state afterwards.
    fn invalidate(&self, state: &SprintState) -> u64 {
        if let Some(ticker) = self.ticker_slot().take() {
            if state.status() != SprintStatus::Finished {
                ticker.abort();
            }
        }
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn snapshot(&self) -> SprintSnapshot {
        let current_words = self.words.word_count();
        SprintSnapshot::capture(&self.state(), Instant::now(), current_words)
    }

    fn refresh(&self) {
        let snapshot = self.snapshot();
        self.observer.tick(&snapshot);
    }

    fn state(&self) -> MutexGuard<'_, SprintState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn ticker_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        match self.ticker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
