//! Workspace package model

use super::Specifier;
use crate::error::ValidationError;
use crate::parser::parse_specifier;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// The manifest section a dependency is declared in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DependencyType {
    Dependencies,
    DevDependencies,
    OptionalDependencies,
    PeerDependencies,
}

impl DependencyType {
    /// All dependency sections, in manifest order
    pub const ALL: [DependencyType; 4] = [
        DependencyType::Dependencies,
        DependencyType::DevDependencies,
        DependencyType::OptionalDependencies,
        DependencyType::PeerDependencies,
    ];

    /// The package.json key for this section
    pub fn manifest_key(&self) -> &'static str {
        match self {
            DependencyType::Dependencies => "dependencies",
            DependencyType::DevDependencies => "devDependencies",
            DependencyType::OptionalDependencies => "optionalDependencies",
            DependencyType::PeerDependencies => "peerDependencies",
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.manifest_key())
    }
}

/// One entry of a manifest dependency section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestDependency {
    /// Dependency package name
    pub name: String,
    /// Section the dependency is declared in
    pub dependency_type: DependencyType,
    /// Parsed specifier
    pub specifier: Specifier,
}

/// A workspace member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Unique package name
    pub name: String,
    /// Current version, absent for unversioned private packages
    pub version: Option<String>,
    /// Package root directory
    pub location: PathBuf,
    /// Whether the manifest sets `"private": true`
    pub private: bool,
    /// Dependency entries of all four sections, in manifest order
    pub dependencies: Vec<ManifestDependency>,
}

impl Package {
    /// Creates a new package with no dependencies
    pub fn new(name: impl Into<String>, version: Option<&str>) -> Self {
        let name = name.into();
        Self {
            location: PathBuf::from(&name),
            name,
            version: version.map(str::to_string),
            private: false,
            dependencies: Vec::new(),
        }
    }

    /// Sets the package location (builder pattern)
    pub fn with_location(mut self, location: impl Into<PathBuf>) -> Self {
        self.location = location.into();
        self
    }

    /// Marks the package private (builder pattern)
    pub fn with_private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    /// Adds a dependency entry parsed from its raw specifier (builder pattern)
    pub fn with_dependency(
        mut self,
        dependency_type: DependencyType,
        name: impl Into<String>,
        raw: &str,
    ) -> Self {
        self.dependencies.push(ManifestDependency {
            name: name.into(),
            dependency_type,
            specifier: parse_specifier(raw),
        });
        self
    }

    /// Path of the package.json manifest
    pub fn manifest_path(&self) -> PathBuf {
        self.location.join("package.json")
    }

    /// Location relative to `root`, falling back to the absolute location
    pub fn relative_location(&self, root: &Path) -> PathBuf {
        self.location
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| self.location.clone())
    }

    /// Parses the current version
    pub fn semver(&self) -> Result<Option<Version>, ValidationError> {
        match self.version.as_deref() {
            None => Ok(None),
            Some(raw) => Version::parse(raw)
                .map(Some)
                .map_err(|e| ValidationError::invalid_version(&self.name, raw, e.to_string())),
        }
    }

    /// Parses the current version, failing when it is absent
    pub fn require_semver(&self) -> Result<Version, ValidationError> {
        self.semver()?
            .ok_or_else(|| ValidationError::missing_version(&self.name))
    }

    /// Replaces the current version
    pub fn set_version(&mut self, version: &Version) {
        self.version = Some(version.to_string());
    }

    /// Replaces the specifier of a dependency entry, returning false if no entry matches
    pub fn set_specifier(
        &mut self,
        dependency_type: DependencyType,
        name: &str,
        raw: &str,
    ) -> bool {
        match self
            .dependencies
            .iter_mut()
            .find(|d| d.dependency_type == dependency_type && d.name == name)
        {
            Some(dep) => {
                dep.specifier = parse_specifier(raw);
                true
            }
            None => false,
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}@{}", self.name, version),
            None => write!(f, "{}", self.name),
        }
    }
}
