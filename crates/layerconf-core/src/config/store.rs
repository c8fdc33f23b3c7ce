//! Concurrent ordered key/value store backing the merged configuration

use std::collections::BTreeMap;

use parking_lot::RwLock;

/// Merged configuration values
///
/// Every single-key operation is atomic. A rebuild goes through
/// [`replace`](Self::replace), which swaps in a complete map so readers never
/// observe a partially repopulated store.
#[derive(Debug, Default)]
pub struct ConfigStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl ConfigStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for `key`
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    /// Insert or overwrite a value, returning the previous one
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.write().insert(key.into(), value.into())
    }

    /// Whether `key` is present
    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// All keys in order
    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every entry
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.read().clone()
    }

    /// Swap in a fully built map
    pub fn replace(&self, entries: BTreeMap<String, String>) {
        *self.entries.write() = entries;
    }
}
