//! # vaultdeck
//!
//! A client for HashiCorp Vault's KV v2 secrets engine: browse the key tree, read
//! and write secret versions, soft-delete, destroy and restore them, and destroy
//! whole folders.
//!
//! ## Architecture
//!
//! ```text
//! CLI → SecretTree → SecretVersionController → KvEngine ──→ Vault KV v2
//!                                                  ↓
//!                      CredentialManager → Authenticator (LDAP login)
//!                              ↓
//!                          CacheStore (token, namespace)
//! ```
//!
//! ## Core Components
//!
//! - **Credential manager**: cached expiring token, namespace, lazy login
//! - **Secret version controller**: current-version reads, writes, delete intents
//! - **Secret tree**: folder listing and recursive destroy
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vaultdeck::kv::{InMemoryKvEngine, SecretPayload, SecretVersionController};
//!
//! #[tokio::main]
//! async fn main() -> vaultdeck::Result<()> {
//!     let secrets = SecretVersionController::new(Arc::new(InMemoryKvEngine::new()));
//!     secrets.write_new_version("/app/db", &SecretPayload::new().with("user", "app")).await?;
//!     let outcome = secrets.read_current_version("/app/db").await?;
//!     assert!(outcome.payload().is_some());
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cache;
pub mod cli;
pub mod config;
pub mod errors;
pub mod kv;
pub mod observability;
pub mod startup;
pub mod types;

pub use errors::{Result, VaultError};
pub use startup::Explorer;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
