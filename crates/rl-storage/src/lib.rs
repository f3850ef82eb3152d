//! Key-value storage capability
//!
//! Abstracts the host's persistent key-value store (browser local storage, a
//! settings file, an OS store) behind a narrow trait so the flow controller
//! can be driven without a real host. Used by the redirect record store to
//! carry the pending login across the navigation boundary.

mod memory;
mod storage_trait;

pub use memory::MemoryStorage;
pub use storage_trait::KeyValueStorage;
