//! Durable key-value persistence behind the registries.
//!
//! The registry mirrors every mutation into a [`PersistenceAdapter`], a
//! string-keyed JSON store injected by the embedder. Keys are namespaced per
//! category (`account:<address>` / `address:<address>`) so both registries can
//! share one adapter without collisions.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;

use crate::error::PersistenceError;

/// Key prefix for the accounts category.
pub const ACCOUNT_PREFIX: &str = "account:";

/// Key prefix for the addresses category.
pub const ADDRESS_PREFIX: &str = "address:";

/// One of the two parallel registries held by the keyring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Accounts: entries with key pairs, subject to the dev/test filter.
    Accounts,
    /// Addresses: externally-owned entries, never filtered.
    Addresses,
}

impl Category {
    /// The persistence key prefix for this category.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Accounts => ACCOUNT_PREFIX,
            Self::Addresses => ADDRESS_PREFIX,
        }
    }

    /// Whether entries in this category are subject to the dev/test filter.
    #[must_use]
    pub const fn with_test(self) -> bool {
        matches!(self, Self::Accounts)
    }

    /// The namespaced persistence key for an address in this category.
    #[must_use]
    pub fn key(self, address: &str) -> String {
        format!("{}{address}", self.prefix())
    }
}

/// Durable string-keyed JSON store.
///
/// Writes are best-effort: the registry applies its in-memory mutation first
/// and surfaces adapter failures to the caller without rolling back.
pub trait PersistenceAdapter: Send + Sync {
    /// Stores `value` under `key`, overwriting any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the underlying store rejects the write.
    fn set(&self, key: &str, value: &Value) -> Result<(), PersistenceError>;

    /// Reads the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the underlying store fails to read.
    fn get(&self, key: &str) -> Result<Option<Value>, PersistenceError>;

    /// Deletes the value stored under `key`. Absent keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the underlying store rejects the delete.
    fn remove(&self, key: &str) -> Result<(), PersistenceError>;

    /// Visits every stored entry, in no particular order.
    ///
    /// Used at startup to rehydrate the in-memory registries.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the underlying store fails to iterate.
    fn for_each(&self, visit: &mut dyn FnMut(&str, &Value)) -> Result<(), PersistenceError>;
}

/// In-memory adapter backed by a `HashMap`.
///
/// Ships with the crate for tests and for embedders that handle durability
/// elsewhere; it provides no durability of its own.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryAdapter {
    /// Creates a new empty adapter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().expect("adapter lock poisoned").len()
    }

    /// Whether the adapter holds no entries.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PersistenceAdapter for MemoryAdapter {
    fn set(&self, key: &str, value: &Value) -> Result<(), PersistenceError> {
        self.entries
            .write()
            .expect("adapter lock poisoned")
            .insert(key.to_owned(), value.clone());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Value>, PersistenceError> {
        Ok(self
            .entries
            .read()
            .expect("adapter lock poisoned")
            .get(key)
            .cloned())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        self.entries
            .write()
            .expect("adapter lock poisoned")
            .remove(key);
        Ok(())
    }

    fn for_each(&self, visit: &mut dyn FnMut(&str, &Value)) -> Result<(), PersistenceError> {
        for (key, value) in self.entries.read().expect("adapter lock poisoned").iter() {
            visit(key, value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn category_keys_are_prefixed() {
        assert_eq!(Category::Accounts.key("0xab"), "account:0xab");
        assert_eq!(Category::Addresses.key("0xab"), "address:0xab");
        assert!(Category::Accounts.with_test());
        assert!(!Category::Addresses.with_test());
    }

    #[test]
    fn memory_adapter_set_get_remove() {
        let adapter = MemoryAdapter::new();
        adapter.set("account:0x01", &json!({"address": "0x01"})).unwrap();
        assert_eq!(
            adapter.get("account:0x01").unwrap(),
            Some(json!({"address": "0x01"}))
        );

        adapter.remove("account:0x01").unwrap();
        assert_eq!(adapter.get("account:0x01").unwrap(), None);

        // Removing an absent key is a no-op.
        adapter.remove("account:0x01").unwrap();
        assert!(adapter.is_empty());
    }

    #[test]
    fn for_each_visits_all_entries() {
        let adapter = MemoryAdapter::new();
        adapter.set("account:0x01", &json!(1)).unwrap();
        adapter.set("address:0x02", &json!(2)).unwrap();

        let mut seen = Vec::new();
        adapter
            .for_each(&mut |key, _| seen.push(key.to_owned()))
            .unwrap();
        seen.sort();
        assert_eq!(seen, ["account:0x01", "address:0x02"]);
    }
}
