//! OAuth2 authorization-code login orchestration
//!
//! Drives the browser-redirect login flow for an application that delegates
//! token issuance to a remote authentication backend. The controller persists
//! a pending-authorization record before navigating away, survives the full
//! program reload, verifies the returned `state` parameter against the stored
//! record, exchanges the authorization code for a session, and mirrors the
//! session into a reactive container for observers.
//!
//! # Features
//! - Pending login persisted across the navigation boundary (single record,
//!   last write wins)
//! - CSRF protection: the returned `state` must match the stored provider's
//!   state exactly, and the record is cleared before the exchange so at most
//!   one exchange can ever run per attempt
//! - Typed events (`Success` / `Error` / `Change`) dispatched synchronously
//!   in registration order, with panicking listeners isolated
//! - Reactive session cell that replays the current snapshot to new
//!   subscribers
//! - Injectable storage and navigation capabilities, so the controller runs
//!   without a real host
//!
//! # Usage example
//! ```no_run
//! # use std::sync::Arc;
//! # use rl_oauth::{FlowConfig, OAuthFlow, HttpBackend};
//! # use rl_storage::MemoryStorage;
//! # async fn example(navigation: Arc<dyn rl_oauth::Navigation>) -> rl_types::AuthResult<()> {
//! let backend = Arc::new(HttpBackend::new("https://backend.example"));
//! let storage = Arc::new(MemoryStorage::new());
//! let flow = OAuthFlow::new(
//!     backend,
//!     storage,
//!     navigation,
//!     FlowConfig { redirect_url: "https://app.example/oauth".into() },
//! )?;
//!
//! // Register listeners, then resolve a pending return (no-op on a normal load)
//! flow.resolve().await?;
//!
//! // Start a login; navigation unloads the program in a real host
//! flow.load_providers().await?;
//! flow.begin_login("google", Default::default())?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod events;
pub mod flow;
pub mod http;
pub mod navigation;
pub mod registry;
pub mod state;
pub mod store;
pub mod types;

pub use backend::{AuthBackend, SessionChangeHook};
pub use events::{AuthEvent, AuthEventKind, EventBus, ListenerId};
pub use flow::{FlowConfig, OAuthFlow};
pub use http::HttpBackend;
pub use navigation::Navigation;
pub use registry::ProviderRegistry;
pub use state::{SessionCell, SubscriberId};
pub use store::{RedirectStore, STORAGE_KEY};
pub use types::{AuthResponse, FlowPhase, PendingLogin};
