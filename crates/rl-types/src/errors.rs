//! Error types and conversions

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Missing state or code parameter")]
    MissingRedirectParameters,

    #[error("State parameters don't match")]
    StateMismatch,

    #[error("Code exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

// Kept as a String payload so the error stays Clone; event listeners and the
// caller of `resolve` both observe the same failure.
impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        AuthError::Serialization(err.to_string())
    }
}

impl From<AuthError> for String {
    fn from(err: AuthError) -> String {
        err.to_string()
    }
}
