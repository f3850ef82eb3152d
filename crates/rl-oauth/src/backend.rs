//! Authentication backend interface

use async_trait::async_trait;
use rl_types::{AuthResult, Provider, SessionData, SessionState};
use serde_json::{Map, Value};

/// Hook invoked after every session mutation.
pub type SessionChangeHook = Box<dyn Fn() + Send + Sync>;

/// The remote authentication backend, as seen by the flow controller.
///
/// Implementations own the current session: a successful code exchange
/// updates it as a side effect, `clear_session` resets it, and every mutation
/// (including external token refresh) must invoke the registered change
/// hooks afterwards.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// List the providers available for login.
    ///
    /// A failed listing yields [`rl_types::AuthError::BackendUnavailable`];
    /// the caller decides whether to retry.
    async fn list_auth_methods(&self) -> AuthResult<Vec<Provider>>;

    /// Exchange an authorization code for a session.
    ///
    /// `extra` is the flow-specific creation data captured before the
    /// redirect. Rejections yield [`rl_types::AuthError::ExchangeFailed`].
    async fn auth_with_oauth2(
        &self,
        provider: &str,
        code: &str,
        code_verifier: &str,
        redirect_url: &str,
        extra: &Map<String, Value>,
    ) -> AuthResult<SessionData>;

    /// Snapshot of the current session.
    fn session(&self) -> SessionState;

    /// Register a change hook.
    fn on_session_change(&self, hook: SessionChangeHook);

    /// Clear the session (logout). Fires the change hooks.
    fn clear_session(&self);
}
