//! KV v2 engine backed by a live Vault server through `vaultrs`.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, Instrument};
use vaultrs::client::VaultClient;
use vaultrs::error::ClientError;
use vaultrs::kv2;

use super::engine::KvEngine;
use super::model::{parse_timestamp, RawMetadata, RawVersion, WrittenVersion};
use super::path;
use super::payload::SecretPayload;
use crate::auth::CredentialManager;
use crate::errors::{Operation, Result, VaultError};
use crate::kv_span;

/// Talks to the KV v2 engine mounted at `mount`.
///
/// Every call asks the [`CredentialManager`] for a client first, so an expired
/// token is renewed transparently before the request goes out.
#[derive(Debug, Clone)]
pub struct VaultKvEngine {
    credentials: Arc<CredentialManager>,
    mount: String,
}

impl VaultKvEngine {
    pub fn new(credentials: Arc<CredentialManager>, mount: impl Into<String>) -> Self {
        let mount = mount.into().trim_matches('/').to_string();
        Self { credentials, mount }
    }

    pub fn mount(&self) -> &str {
        &self.mount
    }

    async fn client(&self) -> Result<VaultClient> {
        self.credentials.authenticated_client().await?.vault_client()
    }
}

/// A 404 from Vault means nothing lives at the path; everything else is a transport
/// failure carrying Vault's own message.
pub(crate) fn map_client_error(operation: Operation, path: &str, err: ClientError) -> VaultError {
    match err {
        ClientError::APIError { code: 404, .. } => {
            debug!(operation = %operation, path = %path, "Nothing found in Vault");
            VaultError::NotFound { operation, path: path.to_string() }
        }
        other => {
            error!(operation = %operation, path = %path, error = %other, "Vault request failed");
            VaultError::transport(operation, path, other.to_string())
        }
    }
}

#[async_trait]
impl KvEngine for VaultKvEngine {
    async fn list(&self, folder: &str) -> Result<Vec<String>> {
        async {
            let client = self.client().await?;
            kv2::list(&client, &self.mount, path::relative(folder))
                .await
                .map_err(|e| map_client_error(Operation::List, folder, e))
        }
        .instrument(kv_span!(Operation::List, folder))
        .await
    }

    async fn read_data(&self, path: &str) -> Result<SecretPayload> {
        async {
            let client = self.client().await?;
            kv2::read::<SecretPayload>(&client, &self.mount, path::relative(path))
                .await
                .map_err(|e| map_client_error(Operation::Read, path, e))
        }
        .instrument(kv_span!(Operation::Read, path))
        .await
    }

    async fn read_metadata(&self, path: &str) -> Result<RawMetadata> {
        async {
            let client = self.client().await?;
            let response = kv2::read_metadata(&client, &self.mount, path::relative(path))
                .await
                .map_err(|e| map_client_error(Operation::ReadMetadata, path, e))?;

            let mut raw = RawMetadata { current_version: response.current_version, ..Default::default() };
            for (key, entry) in response.versions {
                let version = key.parse::<u64>().map_err(|_| {
                    VaultError::malformed(path, format!("version key '{}' is not a number", key))
                })?;
                raw.versions.insert(
                    version,
                    RawVersion {
                        created_time: entry.created_time,
                        deletion_time: entry.deletion_time,
                        destroyed: entry.destroyed,
                    },
                );
            }
            Ok::<_, VaultError>(raw)
        }
        .instrument(kv_span!(Operation::ReadMetadata, path))
        .await
    }

    async fn write_data(&self, path: &str, payload: &SecretPayload) -> Result<WrittenVersion> {
        async {
            let client = self.client().await?;
            let response = kv2::set(&client, &self.mount, path::relative(path), payload)
                .await
                .map_err(|e| map_client_error(Operation::Write, path, e))?;

            Ok::<_, VaultError>(WrittenVersion {
                version: response.version,
                created_time: parse_timestamp(path, &response.created_time)?,
            })
        }
        .instrument(kv_span!(Operation::Write, path, fields = payload.len()))
        .await
    }

    async fn delete_latest(&self, path: &str) -> Result<()> {
        async {
            let client = self.client().await?;
            kv2::delete_latest(&client, &self.mount, path::relative(path))
                .await
                .map_err(|e| map_client_error(Operation::Delete, path, e))
        }
        .instrument(kv_span!(Operation::Delete, path))
        .await
    }

    async fn destroy_versions(&self, path: &str, versions: &[u64]) -> Result<()> {
        async {
            let client = self.client().await?;
            kv2::destroy_versions(&client, &self.mount, path::relative(path), versions.to_vec())
                .await
                .map_err(|e| map_client_error(Operation::Destroy, path, e))
        }
        .instrument(kv_span!(Operation::Destroy, path, versions = ?versions))
        .await
    }

    async fn delete_metadata(&self, path: &str) -> Result<()> {
        async {
            let client = self.client().await?;
            kv2::delete_metadata(&client, &self.mount, path::relative(path))
                .await
                .map_err(|e| map_client_error(Operation::DestroyAll, path, e))
        }
        .instrument(kv_span!(Operation::DestroyAll, path))
        .await
    }

    async fn undelete_versions(&self, path: &str, versions: &[u64]) -> Result<()> {
        async {
            let client = self.client().await?;
            kv2::undelete_versions(&client, &self.mount, path::relative(path), versions.to_vec())
                .await
                .map_err(|e| map_client_error(Operation::Undelete, path, e))
        }
        .instrument(kv_span!(Operation::Undelete, path, versions = ?versions))
        .await
    }
}
