//! Folder listing and recursive destroy over the key hierarchy.

use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::controller::SecretVersionController;
use super::engine::KvEngine;
use super::model::{DeleteIntent, DestroyFailure, DestroyReport, TreeEntry};
use super::path;
use crate::errors::{Operation, Result};

pub struct SecretTree<E: KvEngine> {
    controller: SecretVersionController<E>,
}

impl<E: KvEngine> Clone for SecretTree<E> {
    fn clone(&self) -> Self {
        Self { controller: self.controller.clone() }
    }
}

impl<E: KvEngine> SecretTree<E> {
    pub fn new(controller: SecretVersionController<E>) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> &SecretVersionController<E> {
        &self.controller
    }

    fn engine(&self) -> &Arc<E> {
        self.controller.engine()
    }

    /// Immediate children of a folder, sorted case-insensitively by label.
    ///
    /// Vault answers 404 for a folder with nothing under it; that is an empty
    /// listing here, not an error.
    #[instrument(skip(self))]
    pub async fn list_children(&self, path: &str) -> Result<Vec<TreeEntry>> {
        let folder = path::folder_path(path);
        let children = match self.engine().list(&folder).await {
            Ok(children) => children,
            Err(e) if e.is_not_found() => {
                debug!(folder = %folder, "Empty folder");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let mut entries: Vec<TreeEntry> =
            children.iter().map(|child| TreeEntry::new(&folder, child)).collect();
        entries.sort_by_cached_key(|entry| entry.label.to_lowercase());
        Ok(entries)
    }

    /// Destroy every secret under `path`, including all versions and metadata.
    ///
    /// Folders are walked depth-first with an explicit stack, visiting children in
    /// listing order. A leaf or sub-folder that fails is recorded in the report and
    /// the walk goes on; only failing to list `path` itself is an error.
    #[instrument(skip(self))]
    pub async fn destroy_recursively(&self, path: &str) -> Result<DestroyReport> {
        let root = path::folder_path(path);
        let mut report = DestroyReport::default();

        let mut stack: Vec<TreeEntry> = self.list_children(&root).await?.into_iter().rev().collect();

        while let Some(entry) = stack.pop() {
            if entry.is_folder {
                match self.list_children(&entry.key).await {
                    Ok(children) => stack.extend(children.into_iter().rev()),
                    Err(e) => {
                        warn!(key = %entry.key, error = %e, "Could not list folder, skipping it");
                        report.failures.push(DestroyFailure::new(&entry.key, Operation::List, &e));
                    }
                }
                continue;
            }

            match self.controller.apply_delete(&entry.key, DeleteIntent::DestroyAllVersions, None).await {
                Ok(()) => report.destroyed += 1,
                Err(e) => {
                    warn!(key = %entry.key, error = %e, "Could not destroy secret");
                    report.failures.push(DestroyFailure::new(&entry.key, Operation::DestroyAll, &e));
                }
            }
        }

        info!(destroyed = report.destroyed, failed = report.failures.len(), "Recursive destroy finished");
        Ok(report)
    }
}

/// Drop entries whose label is a configured technical path, unless `show` is set.
/// Labels are compared without the trailing separator, so `sys` hides `sys/`.
pub fn filter_technical(entries: Vec<TreeEntry>, technical: &[String], show: bool) -> Vec<TreeEntry> {
    if show || technical.is_empty() {
        return entries;
    }
    entries
        .into_iter()
        .filter(|entry| {
            let label = entry.label.trim_end_matches(path::SEPARATOR);
            !technical.iter().any(|t| t.trim_matches(path::SEPARATOR) == label)
        })
        .collect()
}
