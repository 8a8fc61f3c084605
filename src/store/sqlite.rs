//! SQLite store backend
//!
//! Manages the `~/.wordsprint/stats.db` database. Values are stored as JSON
//! text in a single `kv` table; multi-key transactions map onto SQLite
//! `IMMEDIATE` transactions so the snapshot and the commit happen under
//! the same write lock.
//!
//! Calls are synchronous under the hood: each one locks the connection and
//! runs to completion on the calling task, with no `spawn_blocking`. The
//! database is small and local, so a call holds the executor only for a
//! single short statement batch.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use serde_json::Value;

use super::{KeyValueStore, StoreError, Transaction, TransactionFn};

/// SQLite-backed store, cheap to clone
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the store at a specific path
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create stats dir: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open stats db: {}", path.display()))?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        Self::from_connection(conn)
    }

    /// Open a throwaway in-memory database
    pub fn open_in_memory() -> anyhow::Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> anyhow::Result<Self> {
        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize stats schema")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("stats db lock poisoned".into()))
    }

    fn read(conn: &Connection, key: &str) -> Result<Option<Value>, StoreError> {
        let raw: Option<String> = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |r| r.get(0))
            .optional()?;

        raw.map(|text| {
            serde_json::from_str(&text).map_err(|source| StoreError::Serde {
                key: key.to_string(),
                source,
            })
        })
        .transpose()
    }

    fn write(conn: &Connection, key: &str, value: &Value, now: i64) -> Result<(), StoreError> {
        conn.execute(
            r#"INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
               ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3"#,
            params![key, value.to_string(), now],
        )?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let conn = self.conn()?;
        Self::read(&conn, key)
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let conn = self.conn()?;
        Self::write(&conn, key, &value, Utc::now().timestamp_millis())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(())
    }

    async fn transaction(&self, keys: &[&str], apply: TransactionFn<'_>) -> Result<(), StoreError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut snapshot = HashMap::with_capacity(keys.len());
        for key in keys {
            snapshot.insert(key.to_string(), Self::read(&tx, key)?);
        }
        let mut txn = Transaction::new(snapshot);

        // Dropping `tx` on the error path rolls back
        apply(&mut txn)?;

        let now = Utc::now().timestamp_millis();
        for (key, write) in txn.into_writes() {
            match write {
                Some(value) => Self::write(&tx, &key, &value, now)?,
                None => {
                    tx.execute("DELETE FROM kv WHERE key = ?1", [&key])?;
                }
            }
        }

        tx.commit()?;
        Ok(())
    }
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);
INSERT OR IGNORE INTO schema_version VALUES (1);
"#;
