//! Settings configuration types

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// General settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Typing-burst detection
    #[serde(default)]
    pub typing: TypingSettings,

    /// Sprint timer behaviour
    #[serde(default)]
    pub sprint: SprintSettings,

    /// Coalescing windows for keystroke-driven work
    #[serde(default)]
    pub debounce: DebounceSettings,

    /// Word goal
    #[serde(default)]
    pub goal: GoalSettings,

    /// Where stats are stored
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Typing-burst settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypingSettings {
    /// Quiet time (ms) after the last keystroke that ends a burst
    #[serde(default = "default_idle_ms")]
    pub idle_ms: u64,
}

impl TypingSettings {
    pub fn idle(&self) -> Duration {
        Duration::from_millis(self.idle_ms.max(1))
    }
}

impl Default for TypingSettings {
    fn default() -> Self {
        Self {
            idle_ms: default_idle_ms(),
        }
    }
}

/// Sprint timer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintSettings {
    /// Countdown refresh interval (ms)
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// How long a finished sprint stays on screen before going idle (ms)
    #[serde(default = "default_finish_delay_ms")]
    pub finish_delay_ms: u64,

    /// Sprint length used when none is given
    #[serde(default = "default_sprint_minutes")]
    pub default_minutes: u64,
}

impl SprintSettings {
    pub fn tick(&self) -> Duration {
        // tokio intervals panic on a zero period
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn finish_delay(&self) -> Duration {
        Duration::from_millis(self.finish_delay_ms)
    }
}

impl Default for SprintSettings {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            finish_delay_ms: default_finish_delay_ms(),
            default_minutes: default_sprint_minutes(),
        }
    }
}

/// Debounce windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebounceSettings {
    /// Display refresh window (ms)
    #[serde(default = "default_debounce_ms")]
    pub display_ms: u64,

    /// Word-delta stats update window (ms)
    #[serde(default = "default_debounce_ms")]
    pub stats_ms: u64,
}

impl DebounceSettings {
    pub fn display(&self) -> Duration {
        Duration::from_millis(self.display_ms)
    }

    pub fn stats(&self) -> Duration {
        Duration::from_millis(self.stats_ms)
    }
}

impl Default for DebounceSettings {
    fn default() -> Self {
        Self {
            display_ms: default_debounce_ms(),
            stats_ms: default_debounce_ms(),
        }
    }
}

/// Goal settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalSettings {
    /// Goal used until the user sets one
    #[serde(default = "default_goal_words")]
    pub default_words: u64,
}

impl Default for GoalSettings {
    fn default() -> Self {
        Self {
            default_words: default_goal_words(),
        }
    }
}

/// Storage settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Database path (defaults to ~/.wordsprint/stats.db)
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_idle_ms() -> u64 {
    3_000
}

fn default_tick_ms() -> u64 {
    250
}

fn default_finish_delay_ms() -> u64 {
    3_000
}

fn default_sprint_minutes() -> u64 {
    25
}

fn default_debounce_ms() -> u64 {
    16
}

fn default_goal_words() -> u64 {
    500
}
