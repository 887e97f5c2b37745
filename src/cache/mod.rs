//! Key/value cache store for the Vault token and namespace.
//!
//! The credential manager never touches a global: it receives an
//! `Arc<dyn CacheStore>`. Tests use [`MemoryCache`]; the CLI uses [`FileCache`] so a
//! token obtained in one invocation is reused by the next until it expires.

mod file;
mod memory;

pub use file::FileCache;
pub use memory::MemoryCache;

use crate::errors::Result;

/// Cache key holding the serialized [`crate::auth::CachedToken`]
pub const VAULT_TOKEN_CACHE_KEY: &str = "vault-token";

/// Cache key holding the active namespace
pub const VAULT_NAMESPACE_CACHE_KEY: &str = "vault-namespace";

/// String key/value store with get/set/remove.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
