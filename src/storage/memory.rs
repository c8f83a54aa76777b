//! In-memory storage, for tests and ephemeral sessions.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::storage::{KeyValueStore, StorageError};

/// Volatile key-value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RwLock<FxHashMap<String, String>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots.write().insert(key.to_string(), value.to_string());

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.slots.write().remove(key);

        Ok(())
    }
}
