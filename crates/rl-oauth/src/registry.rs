//! Provider registry
//!
//! Fetches and caches the login providers the backend offers.

use parking_lot::RwLock;
use rl_types::{AuthResult, Provider};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::backend::AuthBackend;

/// Cached view of the backend's provider listing.
///
/// The cache is keyed by provider name and never expires; it lives as long
/// as the registry. A failed load leaves the cache untouched and is retried
/// only when the caller asks again.
pub struct ProviderRegistry {
    backend: Arc<dyn AuthBackend>,
    providers: RwLock<HashMap<String, Provider>>,
}

impl ProviderRegistry {
    /// Create an empty registry over `backend`.
    pub fn new(backend: Arc<dyn AuthBackend>) -> Self {
        Self {
            backend,
            providers: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch the provider listing and replace the cache.
    pub async fn load(&self) -> AuthResult<Vec<Provider>> {
        let providers = self.backend.list_auth_methods().await?;
        info!("Loaded {} login providers", providers.len());

        let mut cache = self.providers.write();
        cache.clear();
        for provider in &providers {
            debug!("Registered provider: {}", provider.name);
            cache.insert(provider.name.clone(), provider.clone());
        }

        Ok(providers)
    }

    /// Look up a cached provider by name.
    pub fn get(&self, name: &str) -> Option<Provider> {
        self.providers.read().get(name).cloned()
    }

    /// Number of cached providers.
    pub fn len(&self) -> usize {
        self.providers.read().len()
    }

    /// Whether the cache is empty (nothing loaded yet, or an empty listing).
    pub fn is_empty(&self) -> bool {
        self.providers.read().is_empty()
    }
}
