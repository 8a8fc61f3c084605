//! Shared test utilities for stats and sprint tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use wordsprint::report::Severity;
use wordsprint::sprint::{SprintObserver, SprintSnapshot};
use wordsprint::stats::{FixedClock, StatsLedger};
use wordsprint::store::{KeyValueStore, MemoryStore, StoreError, TransactionFn};
use wordsprint::words::WordSource;
use wordsprint::{DisplaySink, DisplayUpdate};

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// In-memory store that can be told to fail
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_transactions: AtomicBool,
    fail_writes: AtomicBool,
    write_delay_ms: AtomicU64,
    transactions: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_transactions(&self, fail: bool) {
        self.fail_transactions.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every `set` suspend for `delay` before writing
    pub fn delay_writes(&self, delay: Duration) {
        self.write_delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Transactions attempted so far (failed ones included)
    pub fn transaction_count(&self) -> usize {
        self.transactions.load(Ordering::SeqCst)
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.inner
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let delay = self.write_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("disk full".into()));
        }
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.inner.delete(key).await
    }

    async fn transaction(&self, keys: &[&str], apply: TransactionFn<'_>) -> Result<(), StoreError> {
        self.transactions.fetch_add(1, Ordering::SeqCst);
        if self.fail_transactions.load(Ordering::SeqCst) {
            return Err(StoreError::Aborted("commit failed".into()));
        }
        self.inner.transaction(keys, apply).await
    }
}

/// Ledger on a flaky store and a fixed clock
pub fn flaky_ledger(today: NaiveDate) -> (Arc<FlakyStore>, Arc<FixedClock>, Arc<StatsLedger>) {
    let store = Arc::new(FlakyStore::new());
    let clock = Arc::new(FixedClock::new(today));
    let ledger = Arc::new(StatsLedger::new(store.clone(), clock.clone()));
    (store, clock, ledger)
}

/// Word count the test sets by hand
#[derive(Default)]
pub struct ManualWords(AtomicU64);

impl ManualWords {
    pub fn new(words: u64) -> Self {
        Self(AtomicU64::new(words))
    }

    pub fn set(&self, words: u64) {
        self.0.store(words, Ordering::SeqCst);
    }
}

impl WordSource for ManualWords {
    fn word_count(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Records sprint feedback
#[derive(Default)]
pub struct RecordingObserver {
    pub ticks: Mutex<Vec<SprintSnapshot>>,
    pub completions: Mutex<Vec<u64>>,
}

impl RecordingObserver {
    pub fn completions(&self) -> Vec<u64> {
        self.completions.lock().unwrap().clone()
    }

    pub fn last_tick(&self) -> Option<SprintSnapshot> {
        self.ticks.lock().unwrap().last().copied()
    }
}

impl SprintObserver for RecordingObserver {
    fn tick(&self, snapshot: &SprintSnapshot) {
        self.ticks.lock().unwrap().push(*snapshot);
    }

    fn completed(&self, words_gained: u64) {
        self.completions.lock().unwrap().push(words_gained);
    }
}

/// Records everything a session shows
#[derive(Default)]
pub struct RecordingSink {
    pub renders: Mutex<Vec<DisplayUpdate>>,
    pub notifications: Mutex<Vec<(Severity, String)>>,
    pub completions: Mutex<Vec<u64>>,
}

impl RecordingSink {
    pub fn last_render(&self) -> Option<DisplayUpdate> {
        self.renders.lock().unwrap().last().cloned()
    }

    pub fn notifications(&self) -> Vec<(Severity, String)> {
        self.notifications.lock().unwrap().clone()
    }
}

impl DisplaySink for RecordingSink {
    fn render(&self, update: &DisplayUpdate) {
        self.renders.lock().unwrap().push(update.clone());
    }

    fn notify(&self, severity: Severity, message: &str) {
        self.notifications.lock().unwrap().push((severity, message.to_string()));
    }

    fn sprint_completed(&self, words_gained: u64) {
        self.completions.lock().unwrap().push(words_gained);
    }
}
