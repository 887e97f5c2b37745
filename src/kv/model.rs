//! Domain model for versioned secrets and the key tree.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use super::path;
use super::payload::SecretPayload;
use crate::errors::{Operation, Result, VaultError};

/// One version entry as reported by the backend, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawVersion {
    pub created_time: String,
    /// Empty when the version is not soft-deleted
    pub deletion_time: String,
    pub destroyed: bool,
}

/// Version listing of a secret as reported by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMetadata {
    pub current_version: u64,
    pub versions: BTreeMap<u64, RawVersion>,
}

/// One version of a secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecretVersion {
    pub version: u64,
    pub created_time: DateTime<Utc>,
    pub deletion_time: Option<DateTime<Utc>>,
    /// Data permanently erased
    pub destroyed: bool,
    /// Soft-deleted, recoverable through undelete unless also destroyed
    pub deleted: bool,
}

/// Version history of a secret with its current version resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionMetadata {
    pub current: SecretVersion,
    /// Newest first
    pub versions: Vec<SecretVersion>,
}

pub(crate) fn parse_timestamp(path: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| VaultError::malformed(path, format!("invalid timestamp '{}': {}", value, e)))
}

impl VersionMetadata {
    /// Interpret raw metadata. The backend's current-version pointer must match
    /// one of the listed versions.
    pub fn resolve(path: &str, raw: RawMetadata) -> Result<Self> {
        let mut versions = raw
            .versions
            .into_iter()
            .map(|(version, entry)| -> Result<SecretVersion> {
                let deletion_time = if entry.deletion_time.is_empty() {
                    None
                } else {
                    Some(parse_timestamp(path, &entry.deletion_time)?)
                };
                Ok(SecretVersion {
                    version,
                    created_time: parse_timestamp(path, &entry.created_time)?,
                    deleted: deletion_time.is_some(),
                    deletion_time,
                    destroyed: entry.destroyed,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        versions.sort_by(|a, b| b.version.cmp(&a.version));

        let current = versions
            .iter()
            .find(|v| v.version == raw.current_version)
            .cloned()
            .ok_or_else(|| VaultError::MetadataInconsistency {
                path: path.to_string(),
                current_version: raw.current_version,
            })?;

        Ok(Self { current, versions })
    }
}

/// Why a read was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefusalReason {
    Destroyed,
    Deleted,
}

impl RefusalReason {
    /// Destroyed wins over deleted.
    pub fn for_version(version: &SecretVersion) -> Option<Self> {
        if version.destroyed {
            Some(Self::Destroyed)
        } else if version.deleted {
            Some(Self::Deleted)
        } else {
            None
        }
    }
}

impl fmt::Display for RefusalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefusalReason::Destroyed => f.write_str("Version has been destroyed"),
            RefusalReason::Deleted => f.write_str("Version has been deleted"),
        }
    }
}

/// Result of reading the current version of a secret.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReadOutcome {
    Secret { payload: SecretPayload, metadata: VersionMetadata },
    Refused { reason: RefusalReason, metadata: VersionMetadata },
}

impl ReadOutcome {
    pub fn metadata(&self) -> &VersionMetadata {
        match self {
            ReadOutcome::Secret { metadata, .. } | ReadOutcome::Refused { metadata, .. } => metadata,
        }
    }

    pub fn payload(&self) -> Option<&SecretPayload> {
        match self {
            ReadOutcome::Secret { payload, .. } => Some(payload),
            ReadOutcome::Refused { .. } => None,
        }
    }

    pub fn refusal(&self) -> Option<RefusalReason> {
        match self {
            ReadOutcome::Refused { reason, .. } => Some(*reason),
            ReadOutcome::Secret { .. } => None,
        }
    }
}

/// Version created by a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WrittenVersion {
    pub version: u64,
    pub created_time: DateTime<Utc>,
}

/// Destructive action requested on a secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteIntent {
    /// Soft delete of the current version
    DeleteCurrentVersion,
    /// Permanent erase of one version; needs the version number
    DestroyCurrentVersion,
    /// Permanent erase of every version and the metadata
    DestroyAllVersions,
}

impl DeleteIntent {
    pub fn operation(&self) -> Operation {
        match self {
            DeleteIntent::DeleteCurrentVersion => Operation::Delete,
            DeleteIntent::DestroyCurrentVersion => Operation::Destroy,
            DeleteIntent::DestroyAllVersions => Operation::DestroyAll,
        }
    }

    /// Warning shown before the action is confirmed.
    pub fn warning(&self) -> &'static str {
        match self {
            DeleteIntent::DeleteCurrentVersion => {
                "This deletes current version of the secret. It can be un-deleted later."
            }
            DeleteIntent::DestroyCurrentVersion => {
                "Current version is permanently destroyed and cannot be read or recovered later."
            }
            DeleteIntent::DestroyAllVersions => {
                "All secret versions and metadata are permanently destroyed and cannot be read or recovered later."
            }
        }
    }
}

/// Child of a folder in the key tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    /// Full path
    pub key: String,
    /// Last segment, with the trailing separator for folders
    pub label: String,
    pub is_folder: bool,
}

impl TreeEntry {
    /// `parent` must be a folder path.
    pub fn new(parent: &str, child: &str) -> Self {
        Self {
            key: format!("{}{}", parent, child),
            label: child.to_string(),
            is_folder: path::is_folder(child),
        }
    }
}

/// A leaf or folder the recursive destroy could not process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DestroyFailure {
    pub key: String,
    pub operation: String,
    pub message: String,
}

impl DestroyFailure {
    pub fn new(key: &str, operation: Operation, error: &VaultError) -> Self {
        Self { key: key.to_string(), operation: operation.to_string(), message: error.to_string() }
    }
}

/// Outcome of a recursive destroy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DestroyReport {
    /// Leaves whose whole history was destroyed
    pub destroyed: usize,
    pub failures: Vec<DestroyFailure>,
}

impl DestroyReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
