//! Durable key-value storage
//!
//! Every persisted record (session stats, streak, typing time, document,
//! goal) lives under a string key as a JSON value. Two backends ship:
//!
//! - [`SqliteStore`]: `~/.wordsprint/stats.db`, survives crashes (WAL mode)
//! - [`MemoryStore`]: process-local, used by tests and dry runs
//!
//! Multi-key updates go through [`KeyValueStore::transaction`], which hands
//! the caller a [`Transaction`] holding a snapshot of the declared keys.
//! Writes are staged on the transaction and only reach the backend when the
//! closure returns `Ok`.

mod memory;
mod sqlite;
mod transaction;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use transaction::Transaction;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Logical keys of the persisted records
pub mod keys {
    pub const SESSION_STATS: &str = "sessionStats";
    pub const STREAK_DATA: &str = "streakData";
    pub const TYPING_TIME: &str = "typingTime";
    pub const DOCUMENT: &str = "document";
    pub const GOAL: &str = "goal";
}

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to (de)serialize value for key '{key}': {source}")]
    Serde {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Key '{0}' was not declared for this transaction")]
    UndeclaredKey(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Transaction aborted: {0}")]
    Aborted(String),
}

/// Body of a multi-key transaction.
///
/// Runs synchronously against the snapshot; returning an error rolls back
/// every staged write.
pub type TransactionFn<'a> = Box<dyn FnOnce(&mut Transaction) -> Result<(), StoreError> + Send + 'a>;

/// Async key-value store with atomic multi-key transactions
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the raw JSON value for a key (None if absent)
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Write a raw JSON value
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Remove a key (no-op if absent)
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Run `apply` against a consistent snapshot of `keys` and commit its
    /// staged writes as a unit.
    ///
    /// No other writer can interleave with the read-compute-write sequence.
    /// If `apply` fails or the commit fails, nothing is written.
    async fn transaction(&self, keys: &[&str], apply: TransactionFn<'_>) -> Result<(), StoreError>;
}

/// Read and deserialize a typed value
pub async fn load<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key).await? {
        Some(value) => decode(key, value).map(Some),
        None => Ok(None),
    }
}

/// Serialize and write a typed value
pub async fn save<T: Serialize + Sync>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let value = encode(key, value)?;
    store.set(key, value).await
}

pub(crate) fn decode<T: DeserializeOwned>(key: &str, value: Value) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|source| StoreError::Serde {
        key: key.to_string(),
        source,
    })
}

pub(crate) fn encode<T: Serialize>(key: &str, value: &T) -> Result<Value, StoreError> {
    serde_json::to_value(value).map_err(|source| StoreError::Serde {
        key: key.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        words: u64,
    }

    #[tokio::test]
    async fn test_typed_roundtrip_through_helpers() {
        let store = MemoryStore::new();
        save(&store, "sample", &Sample { words: 12 }).await.unwrap();

        let loaded: Option<Sample> = load(&store, "sample").await.unwrap();
        assert_eq!(loaded, Some(Sample { words: 12 }));

        let missing: Option<Sample> = load(&store, "other").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_load_reports_shape_mismatch() {
        let store = MemoryStore::new();
        store.set("sample", Value::String("oops".into())).await.unwrap();

        let err = load::<Sample>(&store, "sample").await.unwrap_err();
        assert!(matches!(err, StoreError::Serde { ref key, .. } if key == "sample"));
    }
}
