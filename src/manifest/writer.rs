//! Manifest file writing
//!
//! This module provides:
//! - ManifestWriter for applying a release plan to package.json files
//! - Dry-run mode support (no actual file modifications)
//! - Format preservation when updating versions and specifiers
//!
//! Every edit is computed in memory before the first file is written, so a
//! manifest that cannot be edited aborts the run with nothing on disk changed.

use crate::error::ManifestError;
use crate::manifest::package_json;
use crate::propagation::ReleasePlan;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writer for manifest files that applies version updates
pub struct ManifestWriter {
    /// Whether to run in dry-run mode (no file modifications)
    dry_run: bool,
}

/// Result of applying updates to a manifest file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResult {
    /// Path to the manifest file
    pub path: PathBuf,
    /// Number of fields rewritten
    pub updates_applied: usize,
    /// Whether the file was actually modified
    pub file_modified: bool,
}

impl WriteResult {
    fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            updates_applied: 0,
            file_modified: false,
        }
    }

    /// Returns true if any field was rewritten
    pub fn has_updates(&self) -> bool {
        self.updates_applied > 0
    }
}

struct PendingWrite {
    result: WriteResult,
    content: String,
}

impl ManifestWriter {
    /// Create a new ManifestWriter
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Create a ManifestWriter in dry-run mode
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }

    /// Check if this writer is in dry-run mode
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Write new versions and dependency specifiers for every touched package,
    /// in discovery order
    pub fn write_plan(&self, plan: &ReleasePlan) -> Result<Vec<WriteResult>, ManifestError> {
        let mut pending = Vec::new();

        for package in plan.graph.packages() {
            let new_version = plan.assignment.get(&package.name);
            let rewrites: Vec<_> = plan.rewrites_for(&package.name).collect();
            if new_version.is_none() && rewrites.is_empty() {
                continue;
            }

            let path = package.manifest_path();
            let mut content = read_manifest(&path)?;
            let mut result = WriteResult::new(&path);

            if let Some(version) = new_version {
                content = package_json::update_version(&content, &version.to_string(), &path)?;
                result.updates_applied += 1;
            }

            for rewrite in rewrites {
                content = package_json::update_dependency(
                    &content,
                    rewrite.dependency_type,
                    &rewrite.dependency,
                    &rewrite.new_specifier,
                    &path,
                )?;
                result.updates_applied += 1;
            }

            pending.push(PendingWrite { result, content });
        }

        pending
            .into_iter()
            .map(|write| self.commit(write))
            .collect()
    }

    /// Update the top-level `version` of a JSON config file
    pub fn write_config_version(
        &self,
        path: &Path,
        version: &str,
    ) -> Result<WriteResult, ManifestError> {
        let content = read_manifest(path)?;
        let content = package_json::update_version(&content, version, path)?;

        let mut result = WriteResult::new(path);
        result.updates_applied = 1;
        self.commit(PendingWrite { result, content })
    }

    fn commit(&self, write: PendingWrite) -> Result<WriteResult, ManifestError> {
        let PendingWrite { mut result, content } = write;

        if result.has_updates() && !self.dry_run {
            write_manifest(&result.path, &content)?;
            result.file_modified = true;
        }

        debug!(
            path = %result.path.display(),
            updates = result.updates_applied,
            written = result.file_modified,
            "manifest processed"
        );
        Ok(result)
    }
}

/// Read a manifest file content safely
pub fn read_manifest(path: &Path) -> Result<String, ManifestError> {
    if !path.exists() {
        return Err(ManifestError::not_found(path));
    }
    fs::read_to_string(path).map_err(|e| ManifestError::read_error(path, e))
}

/// Write content to a manifest file
pub fn write_manifest(path: &Path, content: &str) -> Result<(), ManifestError> {
    fs::write(path, content).map_err(|e| ManifestError::write_error(path, e))
}
