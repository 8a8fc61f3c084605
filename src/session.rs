//! Writing session - wires the editor surface to the stats core
//!
//! The session owns the live text buffer and forwards every edit to:
//! - the typing-burst accumulator (immediately)
//! - the word-delta stats update (debounced)
//! - the display refresh (debounced)
//!
//! The sprint timer reads words from the same buffer and reports back
//! through the session's display sink.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tracing::{debug, warn};

use crate::config::Settings;
use crate::debounce::Debouncer;
use crate::document;
use crate::report::{self, Notifier, Severity};
use crate::sprint::{SprintObserver, SprintSnapshot, SprintTimer};
use crate::stats::{Clock, DisplayStats, StatsLedger};
use crate::store::KeyValueStore;
use crate::typing::TypingTracker;
use crate::words::{TextBuffer, WordSource};

/// Everything the display shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayUpdate {
    /// Words in the document
    pub words: u64,
    pub goal: u64,
    /// Progress toward the goal, 0-100
    pub percent: u8,
    /// Words left to reach the goal
    pub remaining_words: u64,
    pub stats: DisplayStats,
    pub sprint: SprintSnapshot,
}

/// The UI side of a session (rendering, notifications, sprint feedback)
pub trait DisplaySink: Send + Sync {
    fn render(&self, update: &DisplayUpdate);

    /// Transient notification for user-visible failures
    fn notify(&self, _severity: Severity, _message: &str) {}

    /// Visual/audio cue for a naturally completed sprint
    fn sprint_completed(&self, _words_gained: u64) {}
}

struct SinkNotifier(Arc<dyn DisplaySink>);

impl Notifier for SinkNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        self.0.notify(severity, message);
    }
}

struct SessionSprintObserver(Weak<SessionInner>);

impl SprintObserver for SessionSprintObserver {
    fn tick(&self, snapshot: &SprintSnapshot) {
        if let Some(inner) = self.0.upgrade() {
            inner.render_cached(*snapshot);
        }
    }

    fn completed(&self, words_gained: u64) {
        if let Some(inner) = self.0.upgrade() {
            inner.sink.sprint_completed(words_gained);
            // Sprint counters changed in the store
            inner.display.call(());
        }
    }
}

struct SessionInner {
    store: Arc<dyn KeyValueStore>,
    ledger: Arc<StatsLedger>,
    typing: Arc<TypingTracker>,
    sprint: SprintTimer,
    buffer: Arc<TextBuffer>,
    sink: Arc<dyn DisplaySink>,
    notifier: SinkNotifier,
    goal: AtomicU64,
    /// Word count already credited to the ledger
    baseline: AtomicU64,
    cached_stats: Mutex<DisplayStats>,
    default_sprint_minutes: u64,
    display: Debouncer<()>,
    stats_update: Debouncer<()>,
}

/// A headless writing session, cheap to clone
#[derive(Clone)]
pub struct WritingSession {
    inner: Arc<SessionInner>,
}

impl WritingSession {
    /// Restore the saved document, goal and stats and start the session.
    ///
    /// Unreadable records fall back to defaults. Must be called inside a
    /// tokio runtime.
    pub async fn open(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        settings: &Settings,
        sink: Arc<dyn DisplaySink>,
    ) -> Self {
        let text = document::load_text(store.as_ref()).await.unwrap_or_else(|e| {
            report::report(Severity::Warn, "Failed to load document", &e, None);
            String::new()
        });
        let goal = document::load_goal(store.as_ref(), settings.goal.default_words)
            .await
            .unwrap_or_else(|e| {
                report::report(Severity::Warn, "Failed to load goal", &e, None);
                settings.goal.default_words
            });

        let ledger = Arc::new(StatsLedger::new(store.clone(), clock.clone()));
        let typing = TypingTracker::load(store.clone(), clock, settings.typing.idle()).await;
        let stats = ledger.display_stats().await;
        let buffer = Arc::new(TextBuffer::new(text));
        let baseline = buffer.word_count();

        let display_window = settings.debounce.display();
        let stats_window = settings.debounce.stats();
        let sprint_settings = settings.sprint.clone();

        let inner = Arc::new_cyclic(|weak: &Weak<SessionInner>| {
            let sprint = SprintTimer::new(
                ledger.clone(),
                buffer.clone(),
                Arc::new(SessionSprintObserver(weak.clone())),
                Some(Arc::new(SinkNotifier(sink.clone()))),
                &sprint_settings,
            );

            let display_weak = weak.clone();
            let display = Debouncer::new(display_window, move |()| {
                let weak = display_weak.clone();
                async move {
                    if let Some(inner) = weak.upgrade() {
                        inner.refresh_display().await;
                    }
                }
            });

            let stats_weak = weak.clone();
            let stats_update = Debouncer::new(stats_window, move |()| {
                let weak = stats_weak.clone();
                async move {
                    if let Some(inner) = weak.upgrade() {
                        inner.commit_word_delta().await;
                    }
                }
            });

            SessionInner {
                store,
                ledger,
                typing,
                sprint,
                buffer,
                notifier: SinkNotifier(sink.clone()),
                sink,
                goal: AtomicU64::new(goal),
                baseline: AtomicU64::new(baseline),
                cached_stats: Mutex::new(stats),
                default_sprint_minutes: sprint_settings.default_minutes,
                display,
                stats_update,
            }
        });

        let session = Self { inner };
        session.inner.render_cached(session.inner.sprint.snapshot());
        session
    }

    /// Replace the buffer with the editor's current text (one keystroke)
    pub async fn input(&self, text: impl Into<String>) {
        self.inner.buffer.replace(text);
        self.inner.typing.keystroke().await;
        self.inner.stats_update.call(());
        self.inner.display.call(());
    }

    /// Load a document without crediting its words as written today
    pub async fn load_document(&self, text: impl Into<String>) {
        let text = text.into();
        self.inner.buffer.replace(text.as_str());
        self.inner
            .baseline
            .store(self.inner.buffer.word_count(), Ordering::SeqCst);
        self.inner.save_text(&text).await;
        self.inner.refresh_display().await;
    }

    pub async fn set_goal(&self, goal: u64) {
        self.inner.goal.store(goal, Ordering::SeqCst);
        if let Err(e) = document::save_goal(self.inner.store.as_ref(), goal).await {
            report::report(Severity::Error, "Failed to save goal", &e, Some(&self.inner.notifier));
        }
        self.inner.refresh_display().await;
    }

    /// Start a sprint (`None` uses the configured default length)
    pub fn start_sprint(&self, minutes: Option<u64>) {
        let minutes = minutes.unwrap_or(self.inner.default_sprint_minutes);
        self.inner.sprint.start(minutes, self.inner.buffer.word_count());
    }

    pub fn sprint(&self) -> &SprintTimer {
        &self.inner.sprint
    }

    pub fn ledger(&self) -> &Arc<StatsLedger> {
        &self.inner.ledger
    }

    pub fn text(&self) -> String {
        self.inner.buffer.snapshot()
    }

    pub fn word_count(&self) -> u64 {
        self.inner.buffer.word_count()
    }

    pub fn goal(&self) -> u64 {
        self.inner.goal.load(Ordering::SeqCst)
    }

    /// Close the open typing burst and commit pending words now
    pub async fn flush(&self) {
        self.inner.typing.flush().await;
        self.inner.commit_word_delta().await;
        self.inner.refresh_display().await;
    }
}

impl SessionInner {
    /// Credit words gained since the last commit
    async fn commit_word_delta(&self) {
        let count = self.buffer.word_count();
        let previous = self.baseline.swap(count, Ordering::SeqCst);
        self.save_text(&self.buffer.snapshot()).await;

        let gained = count.saturating_sub(previous);
        if gained == 0 {
            return;
        }

        match self.ledger.apply_word_delta(gained).await {
            Ok(Some(update)) => {
                let today = self.ledger.clock().today();
                let mut cached = self.cached_stats();
                cached.streak_active = update.streak.is_active(today);
                cached.session = update.session;
                cached.streak = update.streak;
            }
            Ok(None) => {}
            Err(e) => {
                // Keep the words pending so the next commit retries them
                let _ = self.baseline.compare_exchange(count, previous, Ordering::SeqCst, Ordering::SeqCst);
                report::report(e.severity(), "Stats not saved", &e, Some(&self.notifier));
            }
        }
        debug!(words = count, gained, "Word delta committed");
    }

    async fn save_text(&self, text: &str) {
        if let Err(e) = document::save_text(self.store.as_ref(), text).await {
            warn!(error = %e, "Failed to save document text");
        }
    }

    /// Re-read committed stats and render
    async fn refresh_display(&self) {
        let stats = self.ledger.display_stats().await;
        *self.cached_stats() = stats;
        self.render_cached(self.sprint.snapshot());
    }

    /// Render with the last committed stats (no I/O)
    fn render_cached(&self, sprint: SprintSnapshot) {
        let words = self.buffer.word_count();
        let goal = self.goal.load(Ordering::SeqCst);
        let update = DisplayUpdate {
            words,
            goal,
            percent: document::goal_percent(words, goal),
            remaining_words: goal.saturating_sub(words),
            stats: self.cached_stats().clone(),
            sprint,
        };
        self.sink.render(&update);
    }

    fn cached_stats(&self) -> MutexGuard<'_, DisplayStats> {
        match self.cached_stats.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
