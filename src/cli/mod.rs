//! CLI command implementations

pub mod document;
pub mod init;
pub mod sprint;
pub mod stats;

use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use wordsprint::stats::{StatsLedger, SystemClock};
use wordsprint::{Config, SqliteStore};

/// Open the configured database
pub fn open_store(config: &Config) -> Result<Arc<SqliteStore>> {
    let path = config.database_path();
    debug!(path = %path.display(), "Opening stats database");
    Ok(Arc::new(SqliteStore::open(&path)?))
}

/// Ledger over the configured database, on the wall clock
pub fn open_ledger(config: &Config) -> Result<(Arc<SqliteStore>, Arc<StatsLedger>)> {
    let store = open_store(config)?;
    let ledger = Arc::new(StatsLedger::new(store.clone(), Arc::new(SystemClock)));
    Ok((store, ledger))
}

/// "mm:ss" for a countdown
pub fn format_clock(remaining: std::time::Duration) -> String {
    let secs = remaining.as_secs_f64().ceil() as u64;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
