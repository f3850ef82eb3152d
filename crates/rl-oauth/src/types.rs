//! Core types for the login flow

use chrono::{DateTime, Utc};
use rl_types::Provider;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Pending-authorization record persisted across the navigation boundary.
///
/// At most one record exists at a time; starting a second login before the
/// first resolves overwrites it. The record is written just before the
/// authorization navigation and deleted during resolution, before the code
/// exchange runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingLogin {
    /// The provider this attempt was started with
    pub provider: Provider,

    /// Flow-specific creation data forwarded to the code exchange
    /// (e.g. `{"emailVisibility": false}`)
    #[serde(default, rename = "createData")]
    pub extra: Map<String, Value>,

    /// When the record was written; used only for stale-cleanup diagnostics
    #[serde(rename = "savedAt")]
    pub saved_at: DateTime<Utc>,
}

impl PendingLogin {
    /// Stamp a new record with the current time.
    pub fn new(provider: Provider, extra: Map<String, Value>) -> Self {
        Self {
            provider,
            extra,
            saved_at: Utc::now(),
        }
    }

    /// Time elapsed since the record was written.
    pub fn age(&self) -> chrono::Duration {
        Utc::now() - self.saved_at
    }
}

/// Authorization response parsed from the return URL's query string.
///
/// Ephemeral; consumed once during resolution and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    /// Anti-CSRF state token echoed back by the authorization server
    pub state: String,

    /// Short-lived authorization code to exchange for a session
    pub code: String,
}

/// Flow controller phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowPhase {
    /// Normal program load; nothing pending
    Idle,

    /// A login was started, or the current load is a return from the
    /// authorization server awaiting resolution
    AwaitingRedirect,

    /// Resolution in progress (code exchange in flight)
    Resolving,

    /// Resolution completed with a session
    Succeeded,

    /// Resolution failed terminally
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider() -> Provider {
        Provider {
            name: "google".to_string(),
            authorization_url: "https://accounts.google.com/auth".to_string(),
            code_verifier: "v1".to_string(),
            state: "s1".to_string(),
        }
    }

    #[test]
    fn test_pending_login_roundtrip() {
        let mut extra = Map::new();
        extra.insert("emailVisibility".to_string(), json!(false));
        let record = PendingLogin::new(provider(), extra);

        let raw = serde_json::to_string(&record).unwrap();
        let loaded: PendingLogin = serde_json::from_str(&raw).unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_pending_login_wire_names() {
        let record = PendingLogin::new(provider(), Map::new());
        let value = serde_json::to_value(&record).unwrap();

        assert!(value.get("createData").is_some());
        assert!(value.get("savedAt").is_some());
        assert_eq!(value["provider"]["authUrl"], "https://accounts.google.com/auth");
    }

    #[test]
    fn test_pending_login_missing_create_data() {
        // Records written by older hosts may omit the creation payload
        let raw = r#"{
            "provider": {"name": "google", "authUrl": "u", "codeVerifier": "v", "state": "s"},
            "savedAt": "2026-01-01T00:00:00Z"
        }"#;
        let record: PendingLogin = serde_json::from_str(raw).unwrap();
        assert!(record.extra.is_empty());
    }
}
