//! In-memory KV v2 engine.
//!
//! Mirrors the version semantics of a real KV v2 mount closely enough to exercise
//! the controller and the tree without a server: soft delete, destroy, undelete,
//! metadata removal and folder listing. Calls are recorded in order and failures
//! can be injected per operation and path.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Mutex, MutexGuard};

use super::engine::KvEngine;
use super::model::{RawMetadata, RawVersion, WrittenVersion};
use super::path;
use super::payload::SecretPayload;
use crate::errors::{Operation, Result, VaultError};

/// One recorded engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCall {
    pub operation: Operation,
    pub path: String,
}

#[derive(Debug, Clone)]
struct StoredVersion {
    payload: Option<SecretPayload>,
    created_time: DateTime<Utc>,
    deletion_time: Option<DateTime<Utc>>,
    destroyed: bool,
}

#[derive(Debug, Default)]
struct StoredSecret {
    current_version: u64,
    versions: BTreeMap<u64, StoredVersion>,
}

#[derive(Debug, Default)]
struct State {
    secrets: BTreeMap<String, StoredSecret>,
    calls: Vec<EngineCall>,
    failures: HashSet<(Operation, String)>,
}

#[derive(Debug, Default)]
pub struct InMemoryKvEngine {
    state: Mutex<State>,
}

impl InMemoryKvEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a new version of `path` without recording a call.
    pub fn insert(&self, path: &str, payload: SecretPayload) -> u64 {
        let mut state = self.lock();
        Self::push_version(&mut state, &path::secret_path(path), payload)
    }

    /// Make every later `operation` on `path` fail with a transport error.
    pub fn fail_on(&self, operation: Operation, path: &str) {
        self.lock().failures.insert((operation, path.to_string()));
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Whether any metadata exists for `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.lock().secrets.contains_key(&path::secret_path(path))
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // Poisoning only happens after a panic in a test; keep the data.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record the call and apply any injected failure.
    fn begin(&self, operation: Operation, path: &str) -> Result<MutexGuard<'_, State>> {
        let mut state = self.lock();
        state.calls.push(EngineCall { operation, path: path.to_string() });
        if state.failures.contains(&(operation, path.to_string())) {
            return Err(VaultError::transport(operation, path, "injected failure"));
        }
        Ok(state)
    }

    fn push_version(state: &mut State, path: &str, payload: SecretPayload) -> u64 {
        let secret = state.secrets.entry(path.to_string()).or_default();
        let version = secret.versions.keys().next_back().copied().unwrap_or(0) + 1;
        secret.versions.insert(
            version,
            StoredVersion { payload: Some(payload), created_time: Utc::now(), deletion_time: None, destroyed: false },
        );
        secret.current_version = version;
        version
    }

    fn not_found(operation: Operation, path: &str) -> VaultError {
        VaultError::NotFound { operation, path: path.to_string() }
    }
}

#[async_trait]
impl KvEngine for InMemoryKvEngine {
    async fn list(&self, folder: &str) -> Result<Vec<String>> {
        let state = self.begin(Operation::List, folder)?;
        let prefix = path::folder_path(folder);

        let children: BTreeSet<String> = state
            .secrets
            .keys()
            .filter_map(|key| key.strip_prefix(prefix.as_str()))
            .filter(|rest| !rest.is_empty())
            .map(|rest| match rest.find(path::SEPARATOR) {
                Some(idx) => rest[..=idx].to_string(),
                None => rest.to_string(),
            })
            .collect();

        if children.is_empty() {
            return Err(Self::not_found(Operation::List, folder));
        }
        Ok(children.into_iter().collect())
    }

    async fn read_data(&self, path: &str) -> Result<SecretPayload> {
        let state = self.begin(Operation::Read, path)?;
        state
            .secrets
            .get(path)
            .and_then(|secret| secret.versions.get(&secret.current_version))
            .filter(|version| version.deletion_time.is_none() && !version.destroyed)
            .and_then(|version| version.payload.clone())
            .ok_or_else(|| Self::not_found(Operation::Read, path))
    }

    async fn read_metadata(&self, path: &str) -> Result<RawMetadata> {
        let state = self.begin(Operation::ReadMetadata, path)?;
        let secret = state.secrets.get(path).ok_or_else(|| Self::not_found(Operation::ReadMetadata, path))?;

        let versions = secret
            .versions
            .iter()
            .map(|(number, version)| {
                let raw = RawVersion {
                    created_time: version.created_time.to_rfc3339(),
                    deletion_time: version.deletion_time.map(|t| t.to_rfc3339()).unwrap_or_default(),
                    destroyed: version.destroyed,
                };
                (*number, raw)
            })
            .collect();

        Ok(RawMetadata { current_version: secret.current_version, versions })
    }

    async fn write_data(&self, path: &str, payload: &SecretPayload) -> Result<WrittenVersion> {
        let mut state = self.begin(Operation::Write, path)?;
        let version = Self::push_version(&mut state, path, payload.clone());
        let created_time = state.secrets[path].versions[&version].created_time;
        Ok(WrittenVersion { version, created_time })
    }

    async fn delete_latest(&self, path: &str) -> Result<()> {
        let mut state = self.begin(Operation::Delete, path)?;
        if let Some(secret) = state.secrets.get_mut(path) {
            let current = secret.current_version;
            if let Some(version) = secret.versions.get_mut(&current) {
                version.deletion_time.get_or_insert_with(Utc::now);
            }
        }
        Ok(())
    }

    async fn destroy_versions(&self, path: &str, versions: &[u64]) -> Result<()> {
        let mut state = self.begin(Operation::Destroy, path)?;
        if let Some(secret) = state.secrets.get_mut(path) {
            for number in versions {
                if let Some(version) = secret.versions.get_mut(number) {
                    version.destroyed = true;
                    version.payload = None;
                }
            }
        }
        Ok(())
    }

    async fn delete_metadata(&self, path: &str) -> Result<()> {
        let mut state = self.begin(Operation::DestroyAll, path)?;
        state.secrets.remove(path);
        Ok(())
    }

    async fn undelete_versions(&self, path: &str, versions: &[u64]) -> Result<()> {
        let mut state = self.begin(Operation::Undelete, path)?;
        let secret = state.secrets.get_mut(path).ok_or_else(|| Self::not_found(Operation::Undelete, path))?;

        for number in versions {
            match secret.versions.get_mut(number) {
                Some(version) if version.destroyed => {
                    return Err(VaultError::AlreadyDestroyed { path: path.to_string(), version: *number });
                }
                Some(version) => version.deletion_time = None,
                None => {}
            }
        }
        Ok(())
    }
}
