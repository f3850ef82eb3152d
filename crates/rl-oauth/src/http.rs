//! HTTP authentication backend client
//!
//! Speaks the PocketBase-style REST surface: a provider listing endpoint and
//! a code-exchange endpoint scoped to a record collection. Owns the local
//! session mirror and its change hooks.

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Client;
use rl_types::{AuthError, AuthResult, Provider, SessionData, SessionState};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, info};

use crate::backend::{AuthBackend, SessionChangeHook};

/// Response body of the provider listing endpoint.
#[derive(Debug, Deserialize)]
struct AuthMethodsResponse {
    #[serde(default, rename = "authProviders")]
    auth_providers: Vec<Provider>,
}

/// Request body of the code-exchange endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OAuth2Request<'a> {
    provider: &'a str,
    code: &'a str,
    code_verifier: &'a str,
    redirect_url: &'a str,
    create_data: &'a Map<String, Value>,
}

/// HTTP client for a PocketBase-style authentication backend.
pub struct HttpBackend {
    http: Client,
    base_url: String,
    collection: String,
    session: RwLock<SessionState>,
    hooks: RwLock<Vec<SessionChangeHook>>,
}

impl HttpBackend {
    /// Create a client against `base_url`, authenticating records in the
    /// default `users` collection.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_collection(base_url, "users")
    }

    /// Create a client authenticating records in `collection`.
    pub fn with_collection(base_url: impl Into<String>, collection: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            collection: collection.into(),
            session: RwLock::new(SessionState::cleared()),
            hooks: RwLock::new(Vec::new()),
        }
    }

    fn collection_url(&self, tail: &str) -> String {
        format!(
            "{}/api/collections/{}/{}",
            self.base_url, self.collection, tail
        )
    }

    fn set_session(&self, next: SessionState) {
        *self.session.write() = next;
        for hook in self.hooks.read().iter() {
            hook();
        }
    }
}

#[async_trait]
impl AuthBackend for HttpBackend {
    async fn list_auth_methods(&self) -> AuthResult<Vec<Provider>> {
        let url = self.collection_url("auth-methods");
        debug!("Fetching auth methods: {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AuthError::BackendUnavailable(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::BackendUnavailable(format!(
                "Listing returned {}: {}",
                status, body
            )));
        }

        let listing: AuthMethodsResponse = response.json().await.map_err(|e| {
            AuthError::BackendUnavailable(format!("Failed to parse listing: {}", e))
        })?;

        Ok(listing.auth_providers)
    }

    async fn auth_with_oauth2(
        &self,
        provider: &str,
        code: &str,
        code_verifier: &str,
        redirect_url: &str,
        extra: &Map<String, Value>,
    ) -> AuthResult<SessionData> {
        let url = self.collection_url("auth-with-oauth2");
        info!("Exchanging authorization code with provider: {}", provider);

        let response = self
            .http
            .post(&url)
            .json(&OAuth2Request {
                provider,
                code,
                code_verifier,
                redirect_url,
                create_data: extra,
            })
            .send()
            .await
            .map_err(|e| AuthError::ExchangeFailed(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Code exchange failed with status {}: {}", status, body);
            return Err(AuthError::ExchangeFailed(format!(
                "Exchange returned {}: {}",
                status, body
            )));
        }

        let session: SessionData = response.json().await.map_err(|e| {
            AuthError::ExchangeFailed(format!("Failed to parse exchange response: {}", e))
        })?;

        self.set_session(SessionState::authenticated(
            session.token.clone(),
            session.record.clone(),
        ));

        info!("Code exchange successful for provider: {}", provider);
        Ok(session)
    }

    fn session(&self) -> SessionState {
        self.session.read().clone()
    }

    fn on_session_change(&self, hook: SessionChangeHook) {
        self.hooks.write().push(hook);
    }

    fn clear_session(&self) {
        info!("Clearing session");
        self.set_session(SessionState::cleared());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_auth_methods_response_deserialization() {
        let json = r#"{
            "usernamePassword": false,
            "authProviders": [
                {"name": "google", "authUrl": "https://a/", "codeVerifier": "v", "state": "s"},
                {"name": "github", "authUrl": "https://b/", "codeVerifier": "w", "state": "t"}
            ]
        }"#;

        let listing: AuthMethodsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(listing.auth_providers.len(), 2);
        assert_eq!(listing.auth_providers[0].name, "google");
        assert_eq!(listing.auth_providers[1].state, "t");
    }

    #[test]
    fn test_auth_methods_response_without_providers() {
        let listing: AuthMethodsResponse = serde_json::from_str("{}").unwrap();
        assert!(listing.auth_providers.is_empty());
    }

    #[test]
    fn test_oauth2_request_wire_names() {
        let mut extra = Map::new();
        extra.insert("emailVisibility".to_string(), json!(false));

        let request = OAuth2Request {
            provider: "google",
            code: "abc",
            code_verifier: "v1",
            redirect_url: "https://app.example/oauth",
            create_data: &extra,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["provider"], "google");
        assert_eq!(value["codeVerifier"], "v1");
        assert_eq!(value["redirectUrl"], "https://app.example/oauth");
        assert_eq!(value["createData"]["emailVisibility"], false);
    }

    #[test]
    fn test_collection_url_trims_trailing_slash() {
        let backend = HttpBackend::new("https://backend.example/");
        assert_eq!(
            backend.collection_url("auth-methods"),
            "https://backend.example/api/collections/users/auth-methods"
        );
    }

    #[test]
    fn test_session_starts_cleared_and_hooks_fire() {
        let backend = HttpBackend::with_collection("https://backend.example", "members");
        assert!(!backend.session().is_valid);

        let fired = std::sync::Arc::new(RwLock::new(0u32));
        let fired_clone = std::sync::Arc::clone(&fired);
        backend.on_session_change(Box::new(move || *fired_clone.write() += 1));

        backend.clear_session();
        assert_eq!(*fired.read(), 1);
    }
}
