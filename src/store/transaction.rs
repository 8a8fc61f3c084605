//! Staged multi-key transaction

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{StoreError, decode, encode};

/// A pending write: `Some` stores a value, `None` deletes the key
pub(crate) type StagedWrite = Option<Value>;

/// Snapshot of the declared keys plus the writes staged against them.
///
/// Reads see staged writes first, so a transaction body can read back what
/// it just wrote.
#[derive(Debug, Default)]
pub struct Transaction {
    snapshot: HashMap<String, Option<Value>>,
    writes: HashMap<String, StagedWrite>,
}

impl Transaction {
    /// Build a transaction over a snapshot read by the backend
    pub(crate) fn new(snapshot: HashMap<String, Option<Value>>) -> Self {
        Self {
            snapshot,
            writes: HashMap::new(),
        }
    }

    /// Read a typed value (None if absent or deleted in this transaction)
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let value = match self.writes.get(key) {
            Some(staged) => staged.clone(),
            None => self
                .snapshot
                .get(key)
                .ok_or_else(|| StoreError::UndeclaredKey(key.to_string()))?
                .clone(),
        };

        value.map(|v| decode(key, v)).transpose()
    }

    /// Stage a typed write
    pub fn put<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        self.ensure_declared(key)?;
        let value = encode(key, value)?;
        self.writes.insert(key.to_string(), Some(value));
        Ok(())
    }

    /// Stage a delete
    pub fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        self.ensure_declared(key)?;
        self.writes.insert(key.to_string(), None);
        Ok(())
    }

    /// Whether anything was staged
    pub fn is_dirty(&self) -> bool {
        !self.writes.is_empty()
    }

    /// Consume the transaction, yielding the staged writes for commit
    pub(crate) fn into_writes(self) -> HashMap<String, StagedWrite> {
        self.writes
    }

    fn ensure_declared(&self, key: &str) -> Result<(), StoreError> {
        if self.snapshot.contains_key(key) {
            Ok(())
        } else {
            Err(StoreError::UndeclaredKey(key.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn_over(keys: &[(&str, Option<Value>)]) -> Transaction {
        Transaction::new(
            keys.iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_reads_see_staged_writes() {
        let mut txn = txn_over(&[("a", Some(Value::from(1)))]);
        assert_eq!(txn.get::<u64>("a").unwrap(), Some(1));

        txn.put("a", &5u64).unwrap();
        assert_eq!(txn.get::<u64>("a").unwrap(), Some(5));

        txn.delete("a").unwrap();
        assert_eq!(txn.get::<u64>("a").unwrap(), None);
        assert!(txn.is_dirty());
    }

    #[test]
    fn test_undeclared_keys_are_rejected() {
        let mut txn = txn_over(&[("a", None)]);
        assert!(matches!(
            txn.get::<u64>("b"),
            Err(StoreError::UndeclaredKey(k)) if k == "b"
        ));
        assert!(txn.put("b", &1u64).is_err());
        assert!(!txn.is_dirty());
    }
}
