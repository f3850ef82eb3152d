//! Redirect record store
//!
//! Persists the single pending-authorization record across the navigation
//! boundary, under one fixed storage key.

use rl_storage::KeyValueStorage;
use rl_types::AuthResult;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::types::PendingLogin;

/// Fixed storage key for the pending record.
pub const STORAGE_KEY: &str = "oauth-provider";

/// Save/load/clear for the pending-authorization record.
///
/// At most one record exists at a time; `save` overwrites unconditionally
/// (single-tab assumption, last write wins). `clear` must run exactly once
/// per resolved attempt so a stored record can never be replayed.
pub struct RedirectStore {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
}

impl RedirectStore {
    /// Create a store over `storage` using the fixed [`STORAGE_KEY`].
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self::with_key(storage, STORAGE_KEY)
    }

    /// Create a store with a custom key, for hosts embedding several apps in
    /// one storage namespace.
    pub fn with_key(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Serialize and persist `record`, overwriting any existing one.
    pub fn save(&self, record: &PendingLogin) -> AuthResult<()> {
        let raw = serde_json::to_string(record)?;
        self.storage.set(&self.key, &raw)?;
        debug!("Stored pending login for provider {}", record.provider.name);
        Ok(())
    }

    /// Load the pending record. Absent, unreadable, or malformed data all
    /// yield `None`; use [`RedirectStore::try_load`] when the defect matters.
    pub fn load(&self) -> Option<PendingLogin> {
        match self.try_load() {
            Ok(record) => record,
            Err(err) => {
                warn!("Discarding unreadable pending login record: {}", err);
                None
            }
        }
    }

    /// Load the pending record, surfacing malformed data as a
    /// distinguishable error instead of swallowing it.
    pub fn try_load(&self) -> AuthResult<Option<PendingLogin>> {
        let Some(raw) = self.storage.get(&self.key)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Remove the record unconditionally.
    pub fn clear(&self) -> AuthResult<()> {
        self.storage.remove(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rl_storage::MemoryStorage;
    use rl_types::{AuthError, Provider};
    use serde_json::Map;

    fn store() -> (Arc<MemoryStorage>, RedirectStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = RedirectStore::new(Arc::clone(&storage) as Arc<dyn KeyValueStorage>);
        (storage, store)
    }

    fn record(state: &str) -> PendingLogin {
        PendingLogin::new(
            Provider {
                name: "google".to_string(),
                authorization_url: "https://accounts.google.com/auth".to_string(),
                code_verifier: "v1".to_string(),
                state: state.to_string(),
            },
            Map::new(),
        )
    }

    #[test]
    fn test_save_load_roundtrip() {
        let (_, store) = store();
        let record = record("s1");
        store.save(&record).unwrap();
        assert_eq!(store.load(), Some(record));
    }

    #[test]
    fn test_load_absent() {
        let (_, store) = store();
        assert_eq!(store.load(), None);
        assert_eq!(store.try_load().unwrap(), None);
    }

    #[test]
    fn test_malformed_is_treated_as_absent() {
        let (storage, store) = store();
        storage.set(STORAGE_KEY, "{not json").unwrap();

        assert_eq!(store.load(), None);
        assert!(matches!(
            store.try_load(),
            Err(AuthError::Serialization(_))
        ));
    }

    #[test]
    fn test_save_overwrites_previous_record() {
        let (_, store) = store();
        store.save(&record("s1")).unwrap();
        store.save(&record("s2")).unwrap();
        assert_eq!(store.load().unwrap().provider.state, "s2");
    }

    #[test]
    fn test_clear_removes_record() {
        let (storage, store) = store();
        store.save(&record("s1")).unwrap();
        store.clear().unwrap();
        assert_eq!(store.load(), None);
        assert!(storage.is_empty());

        // Clearing an empty store is fine
        store.clear().unwrap();
    }
}
