//! Shared types, error types, and session data for redirect-login

pub mod errors;
pub mod session;

pub use errors::{AuthError, AuthResult};
pub use session::{Provider, SessionData, SessionState};
