//! Raw KV v2 operations.
//!
//! A [`KvEngine`] issues exactly one backend call per method and performs no
//! interpretation beyond decoding. Version semantics live in
//! [`super::SecretVersionController`]. Paths are absolute (`/app/db`, folders
//! `/app/`).

use async_trait::async_trait;

use super::model::{RawMetadata, WrittenVersion};
use super::payload::SecretPayload;
use crate::errors::Result;

#[async_trait]
pub trait KvEngine: Send + Sync {
    /// Immediate children of a folder; sub-folders end with `/`.
    async fn list(&self, folder: &str) -> Result<Vec<String>>;

    /// Data of the current version.
    async fn read_data(&self, path: &str) -> Result<SecretPayload>;

    async fn read_metadata(&self, path: &str) -> Result<RawMetadata>;

    /// Create a new version holding exactly `payload`.
    async fn write_data(&self, path: &str, payload: &SecretPayload) -> Result<WrittenVersion>;

    /// Soft-delete the current version.
    async fn delete_latest(&self, path: &str) -> Result<()>;

    async fn destroy_versions(&self, path: &str, versions: &[u64]) -> Result<()>;

    /// Destroy every version and the metadata.
    async fn delete_metadata(&self, path: &str) -> Result<()>;

    async fn undelete_versions(&self, path: &str, versions: &[u64]) -> Result<()>;
}
