//! Workspace manifest discovery and editing
//!
//! This module provides functionality to:
//! - Resolve workspace package globs (config, package.json, pnpm-workspace.yaml)
//! - Discover and parse workspace package.json files
//! - Apply version and specifier edits while preserving formatting

mod detector;
mod package_json;
mod workspace;
mod writer;

pub use detector::discover_packages;
pub use package_json::{parse_package, update_dependency, update_version};
pub use workspace::{has_pnpm_workspace, package_patterns, DEFAULT_PACKAGE_PATTERN};
pub use writer::{read_manifest, write_manifest, ManifestWriter, WriteResult};

use crate::domain::Package;
use crate::error::ManifestError;
use std::path::Path;

/// Discover the packages of the workspace rooted at `root`
pub fn load_workspace(
    root: &Path,
    configured_patterns: Option<&[String]>,
) -> Result<Vec<Package>, ManifestError> {
    let patterns = package_patterns(root, configured_patterns);
    discover_packages(root, &patterns)
}
