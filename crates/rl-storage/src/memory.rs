//! In-memory storage implementation

use parking_lot::RwLock;
use rl_types::AuthResult;
use std::collections::HashMap;

use crate::storage_trait::KeyValueStorage;

/// In-memory key-value storage for tests and single-process embedding.
///
/// Values do not survive a process restart, so hosts that actually cross a
/// navigation boundary need a persistent implementation.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> AuthResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AuthResult<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> AuthResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}
