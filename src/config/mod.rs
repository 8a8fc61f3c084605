//! Configuration loading and management

mod io;
mod settings;

pub use settings::{
    DebounceSettings, GoalSettings, Settings, SprintSettings, StorageSettings, TypingSettings,
};

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub settings: Settings,
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load from `path` if given, otherwise from the global config file.
    /// A missing global file yields defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let global = Self::global_config_path();
                if global.exists() {
                    Self::from_file(&global)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Database path: configured, or `~/.wordsprint/stats.db`
    pub fn database_path(&self) -> PathBuf {
        self.settings
            .storage
            .path
            .clone()
            .unwrap_or_else(|| Self::global_config_dir().join("stats.db"))
    }
}
