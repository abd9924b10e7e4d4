//! Workspace package discovery
//!
//! Features:
//! - Expands package globs relative to the workspace root
//! - `!pattern` entries exclude matching directories
//! - Skips node_modules and directories without a package.json

use crate::domain::Package;
use crate::error::ManifestError;
use crate::manifest::package_json::parse_package;
use crate::manifest::writer::read_manifest;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Discover workspace packages under `root`, in pattern order then path order
pub fn discover_packages(root: &Path, patterns: &[String]) -> Result<Vec<Package>, ManifestError> {
    let (excludes, includes): (Vec<&String>, Vec<&String>) =
        patterns.iter().partition(|p| p.starts_with('!'));

    let excludes: Vec<glob::Pattern> = excludes
        .iter()
        .filter_map(|p| glob::Pattern::new(p.trim_start_matches('!').trim_end_matches('/')).ok())
        .collect();

    let mut seen = HashSet::new();
    let mut packages = Vec::new();

    for pattern in includes {
        for location in expand_pattern(root, pattern)? {
            let relative = location.strip_prefix(root).unwrap_or(&location);
            if excludes.iter().any(|ex| ex.matches_path(relative)) {
                debug!(path = %relative.display(), "excluded by workspace pattern");
                continue;
            }
            if !seen.insert(location.clone()) {
                continue;
            }

            let content = read_manifest(&location.join("package.json"))?;
            packages.push(parse_package(&content, &location)?);
        }
    }

    debug!(count = packages.len(), "workspace packages discovered");
    Ok(packages)
}

/// Directories matched by one pattern that contain a package.json
fn expand_pattern(root: &Path, pattern: &str) -> Result<Vec<PathBuf>, ManifestError> {
    let trimmed = pattern
        .trim_end_matches('/')
        .trim_end_matches("/package.json");
    let full = format!(
        "{}/{}/package.json",
        glob::Pattern::escape(&root.to_string_lossy()),
        trimmed
    );

    let paths = glob::glob(&full).map_err(|e| ManifestError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.msg.to_string(),
    })?;

    let mut locations = Vec::new();
    for entry in paths {
        match entry {
            Ok(manifest) => {
                if manifest.components().any(|c| c.as_os_str() == "node_modules") {
                    continue;
                }
                if let Some(dir) = manifest.parent() {
                    locations.push(dir.to_path_buf());
                }
            }
            Err(e) => warn!(error = %e, "unreadable path while expanding workspace pattern"),
        }
    }

    locations.sort();
    Ok(locations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_package(root: &Path, dir: &str, content: &str) {
        let location = root.join(dir);
        fs::create_dir_all(&location).unwrap();
        fs::write(location.join("package.json"), content).unwrap();
    }

    fn names(packages: &[Package]) -> Vec<&str> {
        packages.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_discover_packages_sorted_by_path() {
        let dir = TempDir::new().unwrap();
        write_package(dir.path(), "packages/b", r#"{"name": "pkg-b", "version": "1.0.0"}"#);
        write_package(dir.path(), "packages/a", r#"{"name": "pkg-a", "version": "1.0.0"}"#);
        fs::create_dir_all(dir.path().join("packages/empty")).unwrap();

        let packages = discover_packages(dir.path(), &["packages/*".to_string()]).unwrap();
        assert_eq!(names(&packages), vec!["pkg-a", "pkg-b"]);
        assert_eq!(packages[0].location, dir.path().join("packages/a"));
    }

    #[test]
    fn test_discover_packages_pattern_order_and_dedup() {
        let dir = TempDir::new().unwrap();
        write_package(dir.path(), "packages/core", r#"{"name": "core", "version": "1.0.0"}"#);
        write_package(dir.path(), "apps/web", r#"{"name": "web", "version": "1.0.0"}"#);

        let patterns = vec![
            "apps/*".to_string(),
            "packages/*".to_string(),
            "packages/core".to_string(),
        ];
        let packages = discover_packages(dir.path(), &patterns).unwrap();
        assert_eq!(names(&packages), vec!["web", "core"]);
    }

    #[test]
    fn test_discover_packages_exclusion() {
        let dir = TempDir::new().unwrap();
        write_package(dir.path(), "packages/a", r#"{"name": "a", "version": "1.0.0"}"#);
        write_package(dir.path(), "packages/fixture", r#"{"name": "fixture", "version": "1.0.0"}"#);

        let patterns = vec!["packages/*".to_string(), "!packages/fixture".to_string()];
        let packages = discover_packages(dir.path(), &patterns).unwrap();
        assert_eq!(names(&packages), vec!["a"]);
    }

    #[test]
    fn test_discover_packages_recursive_skips_node_modules() {
        let dir = TempDir::new().unwrap();
        write_package(dir.path(), "packages/a", r#"{"name": "a", "version": "1.0.0"}"#);
        write_package(
            dir.path(),
            "packages/a/node_modules/dep",
            r#"{"name": "dep", "version": "9.9.9"}"#,
        );

        let packages = discover_packages(dir.path(), &["packages/**".to_string()]).unwrap();
        assert_eq!(names(&packages), vec!["a"]);
    }

    #[test]
    fn test_discover_packages_invalid_pattern() {
        let dir = TempDir::new().unwrap();
        let err = discover_packages(dir.path(), &["packages/[".to_string()]).unwrap_err();
        assert!(matches!(err, ManifestError::InvalidPattern { .. }));
    }

    #[test]
    fn test_discover_packages_invalid_manifest() {
        let dir = TempDir::new().unwrap();
        write_package(dir.path(), "packages/a", r#"{"version": "1.0.0"}"#);

        let err = discover_packages(dir.path(), &["packages/*".to_string()]).unwrap_err();
        assert!(matches!(err, ManifestError::MissingName { .. }));
    }
}
