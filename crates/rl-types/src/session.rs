//! Provider and session wire types
//!
//! Field names follow the backend's JSON surface (camelCase), so these types
//! round-trip both the network responses and the persisted pending record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A login provider issued by the backend for a single login attempt.
///
/// `state` is a single-use anti-CSRF token and `code_verifier` the PKCE
/// secret; both are minted by the backend when the listing is fetched and
/// consumed exactly once during the code exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    /// Provider name, e.g. "google"
    pub name: String,

    /// Authorization URL template; the registered redirect target is
    /// appended verbatim to produce the full authorization URL
    #[serde(rename = "authUrl")]
    pub authorization_url: String,

    /// PKCE code verifier presented during the exchange
    #[serde(rename = "codeVerifier")]
    pub code_verifier: String,

    /// Anti-CSRF state token round-tripped through the redirect
    pub state: String,
}

/// Snapshot of the backend's session store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Session token; empty when logged out
    pub token: String,

    /// The authenticated identity record, if any
    pub identity: Option<Value>,

    /// Whether the backend considers the session valid
    pub is_valid: bool,
}

impl SessionState {
    /// The logged-out state.
    pub fn cleared() -> Self {
        Self::default()
    }

    /// Builds an authenticated state from an exchange result.
    pub fn authenticated(token: String, identity: Value) -> Self {
        Self {
            is_valid: !token.is_empty(),
            token,
            identity: Some(identity),
        }
    }
}

/// Result of a successful code exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    /// Session token issued by the backend
    pub token: String,

    /// The created or matched identity record
    pub record: Value,

    /// Provider metadata returned alongside the session (raw tokens,
    /// avatar URL, ...), when the backend includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}
