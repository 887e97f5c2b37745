//! Version state transitions of a KV v2 secret.

use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::engine::KvEngine;
use super::model::{DeleteIntent, ReadOutcome, RefusalReason, VersionMetadata, WrittenVersion};
use super::path;
use super::payload::SecretPayload;
use crate::errors::{Operation, Result, VaultError};

/// Reads, writes, deletes and restores secret versions.
///
/// UI-level intents are translated into the matching engine call here; the engine
/// itself only knows raw operations. Paths are normalized to `/a/b` form before
/// they reach the engine.
pub struct SecretVersionController<E: KvEngine> {
    engine: Arc<E>,
}

impl<E: KvEngine> Clone for SecretVersionController<E> {
    fn clone(&self) -> Self {
        Self { engine: Arc::clone(&self.engine) }
    }
}

impl<E: KvEngine> SecretVersionController<E> {
    pub fn new(engine: Arc<E>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    /// Version history with the current version resolved.
    #[instrument(skip(self))]
    pub async fn read_metadata(&self, path: &str) -> Result<VersionMetadata> {
        let path = path::secret_path(path);
        let raw = self.engine.read_metadata(&path).await?;
        VersionMetadata::resolve(&path, raw)
    }

    /// Read the current version, or report why it cannot be read.
    ///
    /// A deleted or destroyed current version yields [`ReadOutcome::Refused`] and
    /// the data endpoint is not called.
    #[instrument(skip(self))]
    pub async fn read_current_version(&self, path: &str) -> Result<ReadOutcome> {
        let path = path::secret_path(path);
        let metadata = VersionMetadata::resolve(&path, self.engine.read_metadata(&path).await?)?;

        if let Some(reason) = RefusalReason::for_version(&metadata.current) {
            debug!(version = metadata.current.version, %reason, "Read refused");
            return Ok(ReadOutcome::Refused { reason, metadata });
        }

        let payload = self.engine.read_data(&path).await?;
        Ok(ReadOutcome::Secret { payload, metadata })
    }

    /// Store `payload` as a new version, replacing every field of the previous one.
    #[instrument(skip(self, payload), fields(fields = payload.len()))]
    pub async fn write_new_version(&self, path: &str, payload: &SecretPayload) -> Result<WrittenVersion> {
        let path = path::secret_path(path);
        let written = self.engine.write_data(&path, payload).await?;
        info!(version = written.version, "Secret version written");
        Ok(written)
    }

    /// Carry out a delete intent. Destroying the current version needs its number;
    /// without one nothing is sent.
    #[instrument(skip(self))]
    pub async fn apply_delete(
        &self,
        path: &str,
        intent: DeleteIntent,
        current_version: Option<u64>,
    ) -> Result<()> {
        let path = path::secret_path(path);
        match intent {
            DeleteIntent::DeleteCurrentVersion => self.engine.delete_latest(&path).await?,
            DeleteIntent::DestroyCurrentVersion => {
                let version = required_version(Operation::Destroy, &path, current_version)?;
                self.engine.destroy_versions(&path, &[version]).await?
            }
            DeleteIntent::DestroyAllVersions => self.engine.delete_metadata(&path).await?,
        }
        info!(operation = %intent.operation(), "Secret deleted");
        Ok(())
    }

    /// Restore a soft-deleted version.
    #[instrument(skip(self))]
    pub async fn undelete(&self, path: &str, version: Option<u64>) -> Result<()> {
        let path = path::secret_path(path);
        let version = required_version(Operation::Undelete, &path, version)?;
        self.engine.undelete_versions(&path, &[version]).await?;
        info!(version, "Secret version restored");
        Ok(())
    }
}

/// Version numbers start at 1, so 0 counts as absent.
fn required_version(operation: Operation, path: &str, version: Option<u64>) -> Result<u64> {
    version.filter(|v| *v > 0).ok_or_else(|| VaultError::missing_version(operation, path))
}
