//! Sprint countdown state machine
//!
//! Pure transitions over an explicit `now`; the async driver in the parent
//! module supplies the clock and the tick.

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

use crate::stats::MS_PER_MINUTE;

/// Longest accepted sprint (one week)
pub const MAX_SPRINT_MINUTES: u64 = 7 * 24 * 60;

/// Lifecycle of a sprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SprintStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Finished,
}

impl SprintStatus {
    /// Running or paused
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }
}

impl fmt::Display for SprintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Paused => write!(f, "paused"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

/// Where the countdown stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Countdown {
    /// Not counting
    Stopped,
    /// Counting toward `deadline`
    Until(Instant),
    /// Frozen with this much left
    Frozen(Duration),
}

/// State of the current (or last) sprint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SprintState {
    status: SprintStatus,
    duration: Duration,
    start_words: u64,
    words_gained: u64,
    countdown: Countdown,
}

impl Default for SprintState {
    fn default() -> Self {
        Self {
            status: SprintStatus::Idle,
            duration: Duration::ZERO,
            start_words: 0,
            words_gained: 0,
            countdown: Countdown::Stopped,
        }
    }
}

impl SprintState {
    pub fn status(&self) -> SprintStatus {
        self.status
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn start_words(&self) -> u64 {
        self.start_words
    }

    /// Words gained, set when the sprint finishes
    pub fn words_gained(&self) -> u64 {
        self.words_gained
    }

    /// Words gained so far against `current_words`, never negative
    pub fn gained_against(&self, current_words: u64) -> u64 {
        current_words.saturating_sub(self.start_words)
    }

    /// Begin a new sprint, discarding whatever was in progress.
    ///
    /// Durations are clamped to 1..=[`MAX_SPRINT_MINUTES`] minutes.
    pub fn start(&mut self, duration_minutes: u64, current_words: u64, now: Instant) {
        let minutes = duration_minutes.clamp(1, MAX_SPRINT_MINUTES);
        let duration = Duration::from_millis(minutes * MS_PER_MINUTE);
        let deadline = now.checked_add(duration).unwrap_or(now);
        *self = Self {
            status: SprintStatus::Running,
            duration,
            start_words: current_words,
            words_gained: 0,
            countdown: Countdown::Until(deadline),
        };
    }

    /// Freeze the countdown. Only valid while running.
    pub fn pause(&mut self, now: Instant) -> bool {
        if self.status != SprintStatus::Running {
            return false;
        }
        self.countdown = Countdown::Frozen(self.remaining(now));
        self.status = SprintStatus::Paused;
        true
    }

    /// Continue from the frozen remaining time. Only valid while paused.
    pub fn resume(&mut self, now: Instant) -> bool {
        let (SprintStatus::Paused, Countdown::Frozen(left)) = (self.status, self.countdown) else {
            return false;
        };
        self.countdown = Countdown::Until(now + left);
        self.status = SprintStatus::Running;
        true
    }

    /// Time left on the countdown
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.countdown {
            Countdown::Stopped => Duration::ZERO,
            Countdown::Until(deadline) => deadline.saturating_duration_since(now),
            Countdown::Frozen(left) => left,
        }
    }

    /// Running with no time left
    pub fn is_due(&self, now: Instant) -> bool {
        self.status == SprintStatus::Running && self.remaining(now).is_zero()
    }

    /// Transition running → finished, fixing the result.
    ///
    /// Returns None if the sprint was not running.
    pub fn finish(&mut self, current_words: u64) -> Option<u64> {
        if self.status != SprintStatus::Running {
            return None;
        }
        self.words_gained = self.gained_against(current_words);
        self.status = SprintStatus::Finished;
        self.countdown = Countdown::Stopped;
        Some(self.words_gained)
    }

    /// Back to idle from any state
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
