//! # KV v2 secrets
//!
//! - [`KvEngine`]: raw backend operations, one call each
//! - [`VaultKvEngine`]: the engine over a live Vault server
//! - [`InMemoryKvEngine`]: a process-local engine for tests and dry runs
//! - [`SecretVersionController`]: read/write/delete/undelete semantics
//! - [`SecretTree`]: folder listing and recursive destroy

pub mod controller;
pub mod engine;
pub mod memory;
pub mod model;
pub mod path;
pub mod payload;
pub mod tree;
pub mod vault;

pub use controller::SecretVersionController;
pub use engine::KvEngine;
pub use memory::{EngineCall, InMemoryKvEngine};
pub use model::{
    DeleteIntent, DestroyFailure, DestroyReport, RawMetadata, RawVersion, ReadOutcome, RefusalReason,
    SecretVersion, TreeEntry, VersionMetadata, WrittenVersion,
};
pub use payload::{SecretPayload, SecretValue};
pub use tree::{filter_technical, SecretTree};
pub use vault::VaultKvEngine;
