//! OAuth flow controller
//!
//! Orchestrates the authorization-code login flow across the navigation
//! boundary: `begin_login` persists the pending record and navigates away;
//! after the program reloads on the redirect path, `resolve` verifies the
//! returned `state`, clears the record, and exchanges the code for a session.
//!
//! The record is cleared *before* the exchange call, so at most one exchange
//! can ever run per attempt. If the program is torn down inside that window
//! the attempt is abandoned; the design accepts that loss rather than risking
//! a replayed exchange. No call is retried automatically and no timeout is
//! applied; callers needing bounded latency wrap `resolve` externally.

use parking_lot::RwLock;
use rl_storage::KeyValueStorage;
use rl_types::{AuthError, AuthResult, Provider, SessionData, SessionState};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use crate::backend::AuthBackend;
use crate::events::{AuthEvent, AuthEventKind, EventBus, ListenerId};
use crate::navigation::Navigation;
use crate::registry::ProviderRegistry;
use crate::state::{SessionCell, SubscriberId};
use crate::store::RedirectStore;
use crate::types::{AuthResponse, FlowPhase, PendingLogin};

/// Flow controller configuration.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Absolute redirect URL registered with the backend. The return page
    /// must be served at this URL's path; it is also appended to the
    /// provider's authorization URL template and presented during the
    /// exchange.
    pub redirect_url: String,
}

/// Orchestrates the redirect-based login flow.
///
/// All state lives on the instance; the controller is the single writer of
/// the session cell and the only component touching the stored record.
pub struct OAuthFlow {
    backend: Arc<dyn AuthBackend>,
    registry: ProviderRegistry,
    store: RedirectStore,
    navigation: Arc<dyn Navigation>,
    events: Arc<EventBus>,
    session: Arc<SessionCell>,
    redirect_url: String,
    phase: RwLock<FlowPhase>,
}

impl OAuthFlow {
    /// Create the controller and detect whether this program load is a
    /// return from the authorization server.
    ///
    /// Detection checks the current URL path against the configured redirect
    /// URL's path. On a normal load any stale pending record is discarded
    /// (abandoned-attempt cleanup) and the controller parks in `Idle`. On a
    /// return load it parks in `AwaitingRedirect`; call [`OAuthFlow::resolve`]
    /// after registering listeners to run the code exchange.
    pub fn new(
        backend: Arc<dyn AuthBackend>,
        storage: Arc<dyn KeyValueStorage>,
        navigation: Arc<dyn Navigation>,
        config: FlowConfig,
    ) -> AuthResult<Self> {
        let redirect_path = Url::parse(&config.redirect_url)
            .map_err(|e| {
                AuthError::Config(format!(
                    "Invalid redirect URL {}: {}",
                    config.redirect_url, e
                ))
            })?
            .path()
            .to_string();

        let events = Arc::new(EventBus::new());
        let session = Arc::new(SessionCell::new(backend.session()));

        // Mirror every backend session mutation into the cell and onto the
        // change channel (login, logout, external refresh all flow through
        // this one hook).
        {
            let hook_backend = Arc::clone(&backend);
            let events = Arc::clone(&events);
            let cell = Arc::clone(&session);
            backend.on_session_change(Box::new(move || {
                let state = hook_backend.session();
                cell.set(state.clone());
                events.emit(&AuthEvent::Change { state });
            }));
        }

        let store = RedirectStore::new(storage);
        let registry = ProviderRegistry::new(Arc::clone(&backend));

        let returning = match navigation.current_url() {
            Ok(url) => url.path() == redirect_path,
            Err(err) => {
                warn!("Could not read current URL: {}", err);
                false
            }
        };

        let phase = if returning {
            debug!("Program loaded on redirect path {}", redirect_path);
            FlowPhase::AwaitingRedirect
        } else {
            if let Some(stale) = store.load() {
                info!(
                    "Discarding stale pending login for provider {} ({}s old)",
                    stale.provider.name,
                    stale.age().num_seconds()
                );
            }
            if let Err(err) = store.clear() {
                warn!("Failed to clear stale pending login: {}", err);
            }
            FlowPhase::Idle
        };

        Ok(Self {
            backend,
            registry,
            store,
            navigation,
            events,
            session,
            redirect_url: config.redirect_url,
            phase: RwLock::new(phase),
        })
    }

    /// Fetch the provider listing from the backend and cache it for
    /// [`OAuthFlow::begin_login`].
    pub async fn load_providers(&self) -> AuthResult<Vec<Provider>> {
        self.registry.load().await
    }

    /// Start a login with the named provider.
    ///
    /// Persists the pending record, then navigates to the provider's
    /// authorization URL with the configured redirect target appended. In a
    /// real host the navigation unloads the program, so a successful call
    /// never meaningfully returns there; test doubles observe the navigation
    /// instead.
    pub fn begin_login(&self, provider_name: &str, extra: Map<String, Value>) -> AuthResult<()> {
        let provider = self
            .registry
            .get(provider_name)
            .ok_or_else(|| AuthError::UnknownProvider(provider_name.to_string()))?;

        // The backend issues URL templates that the redirect target
        // completes verbatim.
        let authorization_url = format!("{}{}", provider.authorization_url, self.redirect_url);

        self.store.save(&PendingLogin::new(provider.clone(), extra))?;
        *self.phase.write() = FlowPhase::AwaitingRedirect;

        info!("Navigating to authorization URL for provider {}", provider.name);
        self.navigation.navigate(&authorization_url);
        Ok(())
    }

    /// Resolve a pending return from the authorization server.
    ///
    /// Returns `Ok(None)` when there is nothing to resolve (normal load).
    /// Terminal failures are returned *and* emitted on the `Error` event
    /// channel; the stored record is gone after any resolution attempt, so a
    /// replayed return can never trigger a second exchange.
    pub async fn resolve(&self) -> AuthResult<Option<SessionData>> {
        {
            let mut phase = self.phase.write();
            if *phase != FlowPhase::AwaitingRedirect {
                return Ok(None);
            }
            *phase = FlowPhase::Resolving;
        }

        let record = self.store.load();
        let response = self.auth_response();

        let (record, response) = match (record, response) {
            (record, None) => {
                // Forged or truncated return URL; drop whatever was stored.
                if record.is_some() {
                    self.clear_record();
                }
                return Err(self.fail(AuthError::MissingRedirectParameters));
            }
            (None, Some(_)) => {
                // Nothing stored: an abandoned attempt or a replayed return.
                return Err(self.fail(AuthError::MissingRedirectParameters));
            }
            (Some(record), Some(response)) => (record, response),
        };

        if record.provider.state != response.state {
            warn!(
                "State parameter mismatch for provider {}",
                record.provider.name
            );
            self.clear_record();
            return Err(self.fail(AuthError::StateMismatch));
        }

        // At-most-one exchange: the record is gone before the suspension
        // point below, even if the exchange itself fails or the program is
        // torn down mid-flight.
        self.clear_record();

        info!(
            "Exchanging authorization code for provider {}",
            record.provider.name
        );
        let session = match self
            .backend
            .auth_with_oauth2(
                &record.provider.name,
                &response.code,
                &record.provider.code_verifier,
                &self.redirect_url,
                &record.extra,
            )
            .await
        {
            Ok(session) => session,
            Err(err) => return Err(self.fail(err)),
        };

        *self.phase.write() = FlowPhase::Succeeded;
        self.events.emit(&AuthEvent::Success {
            provider: record.provider,
            session: session.clone(),
        });

        Ok(Some(session))
    }

    /// Clear the session via the backend; observers are notified through the
    /// same `Change` path as any other session mutation.
    pub fn logout(&self) {
        info!("Logging out");
        self.backend.clear_session();
    }

    /// Register an event listener.
    pub fn add_event_listener(
        &self,
        kind: AuthEventKind,
        listener: impl Fn(&AuthEvent) + Send + Sync + 'static,
    ) -> ListenerId {
        self.events.add(kind, listener)
    }

    /// Remove an event listener.
    pub fn remove_event_listener(&self, kind: AuthEventKind, id: ListenerId) -> bool {
        self.events.remove(kind, id)
    }

    /// Subscribe to the reactive session container; the subscriber is
    /// immediately invoked with the current snapshot.
    pub fn subscribe(
        &self,
        subscriber: impl Fn(&SessionState) + Send + Sync + 'static,
    ) -> SubscriberId {
        self.session.subscribe(subscriber)
    }

    /// Remove a session subscriber.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.session.unsubscribe(id)
    }

    /// Snapshot of the mirrored session state.
    pub fn session(&self) -> SessionState {
        self.session.get()
    }

    /// Current flow phase.
    pub fn phase(&self) -> FlowPhase {
        *self.phase.read()
    }

    fn auth_response(&self) -> Option<AuthResponse> {
        let url = self.navigation.current_url().ok()?;
        let mut state = None;
        let mut code = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "state" => state = Some(value.into_owned()),
                "code" => code = Some(value.into_owned()),
                _ => {}
            }
        }
        Some(AuthResponse {
            state: state?,
            code: code?,
        })
    }

    fn clear_record(&self) {
        if let Err(err) = self.store.clear() {
            warn!("Failed to clear pending login record: {}", err);
        }
    }

    fn fail(&self, cause: AuthError) -> AuthError {
        *self.phase.write() = FlowPhase::Failed;
        self.events.emit(&AuthEvent::Error {
            cause: cause.clone(),
        });
        cause
    }
}
