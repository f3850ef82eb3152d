//! Storage capability trait

use rl_types::AuthResult;

/// Persistent key-value storage as exposed by the host environment.
///
/// Semantics match browser local storage: string keys and values, last write
/// wins, no transactions. Values must survive a full program reload.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> AuthResult<Option<String>>;

    /// Store `value` under `key`, overwriting any existing value.
    fn set(&self, key: &str, value: &str) -> AuthResult<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> AuthResult<()>;
}
