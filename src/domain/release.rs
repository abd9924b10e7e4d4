//! Release result structures
//!
//! Structured values returned by the versioning pipeline:
//! - `VersionAssignment`: new version per package plus the bump kind and modifiers
//! - `ManifestRewrite`: one dependency specifier change
//! - `PackageChange`: the per-package summary handed to writers and formatters

use super::{DependencyType, ReleaseType};
use semver::Version;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Versioning mode of the workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionMode {
    /// All packages share one version line
    Fixed,
    /// Each package has its own version line
    Independent,
}

impl fmt::Display for VersionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionMode::Fixed => write!(f, "fixed"),
            VersionMode::Independent => write!(f, "independent"),
        }
    }
}

/// How the new versions were chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpKind {
    /// A semver keyword applied to every package
    Release(ReleaseType),
    /// Derived from conventional commits
    Recommended,
    /// A literal version supplied by the caller
    Explicit,
    /// Chosen interactively
    Prompted,
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BumpKind::Release(rt) => write!(f, "{}", rt),
            BumpKind::Recommended => write!(f, "recommended"),
            BumpKind::Explicit => write!(f, "explicit"),
            BumpKind::Prompted => write!(f, "prompted"),
        }
    }
}

/// Modifiers applied on top of the bump
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Modifiers {
    pub prerelease_id: Option<String>,
    pub build_metadata: Option<String>,
    pub graduate: bool,
}

/// The new version of one package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionChange {
    pub name: String,
    pub old_version: Option<Version>,
    pub new_version: Version,
}

/// New versions for the update set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionAssignment {
    pub mode: VersionMode,
    pub kind: BumpKind,
    pub modifiers: Modifiers,
    /// The version recorded for the root pseudo-package in fixed mode
    pub lockstep_version: Option<Version>,
    /// One entry per versioned package, in update-set order
    pub versions: Vec<VersionChange>,
    /// Private packages without a version that were left unversioned
    pub skipped: Vec<String>,
}

impl VersionAssignment {
    /// New version assigned to `name`
    pub fn get(&self, name: &str) -> Option<&Version> {
        self.versions
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.new_version)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Names of versioned packages, in update-set order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.versions.iter().map(|c| c.name.as_str())
    }
}

/// A rewritten dependency specifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestRewrite {
    /// Package whose manifest changes
    pub package: String,
    pub dependency_type: DependencyType,
    /// Name of the dependency being rewritten
    pub dependency: String,
    pub old_specifier: String,
    pub new_specifier: String,
}

impl fmt::Display for ManifestRewrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}.{}: {} -> {}",
            self.package, self.dependency_type, self.dependency, self.old_specifier, self.new_specifier
        )
    }
}

/// Per-package release summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageChange {
    pub name: String,
    pub location: PathBuf,
    pub private: bool,
    pub old_version: Option<String>,
    pub new_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment() -> VersionAssignment {
        VersionAssignment {
            mode: VersionMode::Independent,
            kind: BumpKind::Release(ReleaseType::Patch),
            modifiers: Modifiers::default(),
            lockstep_version: None,
            versions: vec![VersionChange {
                name: "a".to_string(),
                old_version: Some(Version::new(1, 0, 0)),
                new_version: Version::new(1, 0, 1),
            }],
            skipped: vec![],
        }
    }

    #[test]
    fn test_assignment_lookup() {
        let a = assignment();
        assert_eq!(a.get("a"), Some(&Version::new(1, 0, 1)));
        assert!(a.contains("a"));
        assert!(!a.contains("b"));
        assert_eq!(a.len(), 1);
        assert!(!a.is_empty());
        assert_eq!(a.names().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn test_bump_kind_display() {
        assert_eq!(BumpKind::Release(ReleaseType::Premajor).to_string(), "premajor");
        assert_eq!(BumpKind::Recommended.to_string(), "recommended");
        assert_eq!(VersionMode::Fixed.to_string(), "fixed");
    }

    #[test]
    fn test_manifest_rewrite_display() {
        let rewrite = ManifestRewrite {
            package: "b".to_string(),
            dependency_type: DependencyType::Dependencies,
            dependency: "a".to_string(),
            old_specifier: "^1.0.0".to_string(),
            new_specifier: "^2.0.0".to_string(),
        };
        assert_eq!(rewrite.to_string(), "b dependencies.a: ^1.0.0 -> ^2.0.0");
    }
}
