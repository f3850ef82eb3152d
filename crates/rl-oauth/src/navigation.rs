//! Navigation capability

use rl_types::AuthResult;
use url::Url;

/// The host's navigation subsystem: the URL the program is loaded at, and
/// full-page navigation away from it.
///
/// `navigate` unloads the program in a real host, so the flow controller
/// treats it as a point of no return; test doubles should record the target
/// URL as an observable side effect rather than act on it.
pub trait Navigation: Send + Sync {
    /// The URL the program is currently loaded at.
    fn current_url(&self) -> AuthResult<Url>;

    /// Navigate to `url`, unloading the program in a real host.
    fn navigate(&self, url: &str);
}
