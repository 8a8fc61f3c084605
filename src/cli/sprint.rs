//! Sprint command implementation
//!
//! Runs a sprint against a file being edited in another program. The file
//! is re-read for every word count, and new words are credited to today's
//! stats once a second, the way the editor session credits keystrokes.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::Result;
use tracing::warn;

use wordsprint::report::{self, Notifier, Severity};
use wordsprint::sprint::{SprintObserver, SprintSnapshot, SprintStatus, SprintTimer};
use wordsprint::stats::StatsLedger;
use wordsprint::words::WordSource;
use wordsprint::{Config, count_words};

use super::{format_clock, open_ledger};

/// Word count of a file on disk; keeps the last good count on read errors
struct FileWords {
    path: PathBuf,
    last: AtomicU64,
}

impl FileWords {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            last: AtomicU64::new(0),
        }
    }
}

impl WordSource for FileWords {
    fn word_count(&self) -> u64 {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => {
                let count = count_words(&text);
                self.last.store(count, Ordering::SeqCst);
                count
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read sprint file");
                self.last.load(Ordering::SeqCst)
            }
        }
    }
}

struct Terminal;

impl SprintObserver for Terminal {
    fn tick(&self, snapshot: &SprintSnapshot) {
        let line = match snapshot.status {
            SprintStatus::Running => format!("{} left, +{} words", format_clock(snapshot.remaining), snapshot.words_gained),
            SprintStatus::Paused => format!("paused at {}", format_clock(snapshot.remaining)),
            SprintStatus::Finished | SprintStatus::Idle => return,
        };
        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "\r{line:<40}");
        let _ = stderr.flush();
    }

    fn completed(&self, words_gained: u64) {
        eprintln!("\x07\rSprint complete: {words_gained} words{:<20}", "");
    }
}

impl Notifier for Terminal {
    fn notify(&self, severity: Severity, message: &str) {
        eprintln!("\n[{severity}] {message}");
    }
}

/// Run one sprint to completion (or until Ctrl-C)
pub async fn sprint_command(
    config: &Config,
    minutes: Option<u64>,
    file: &Path,
    keep_on_interrupt: bool,
) -> Result<()> {
    let (_store, ledger) = open_ledger(config)?;
    let words = Arc::new(FileWords::new(file));
    let terminal = Arc::new(Terminal);

    let timer = SprintTimer::new(
        ledger.clone(),
        words.clone(),
        terminal.clone(),
        Some(terminal.clone()),
        &config.settings.sprint,
    );

    let mut credited = words.word_count();
    let minutes = minutes.unwrap_or(config.settings.sprint.default_minutes);
    timer.start(minutes, credited);
    println!(
        "Sprint: {} minutes on {} (starting at {} words)",
        timer.snapshot().duration.as_secs() / 60,
        file.display(),
        credited
    );

    let mut poll = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = poll.tick() => {
                credited = credit_new_words(&ledger, &*words, credited, &*terminal).await;
                if timer.status() == SprintStatus::Idle {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                credited = credit_new_words(&ledger, &*words, credited, &*terminal).await;
                match timer.end(!keep_on_interrupt).await {
                    Some(gained) => eprintln!("\rSprint ended early: {gained} words recorded"),
                    None => eprintln!("\rSprint cancelled"),
                }
                break;
            }
        }
    }

    let stats = ledger.display_stats().await;
    println!(
        "Today: {} words, {} sprints, best sprint {} words (document at {} words)",
        stats.session.words, stats.session.sprints, stats.session.best_sprint, credited
    );
    Ok(())
}

/// Credit words added since `credited`; returns the new baseline
async fn credit_new_words(
    ledger: &StatsLedger,
    words: &dyn WordSource,
    credited: u64,
    notifier: &dyn Notifier,
) -> u64 {
    let count = words.word_count();
    if count <= credited {
        return count;
    }
    match ledger.apply_word_delta(count - credited).await {
        Ok(_) => count,
        Err(e) => {
            report::report(e.severity(), "Stats not saved", &e, Some(notifier));
            credited
        }
    }
}
