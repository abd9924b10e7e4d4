//! External collaborator interfaces
//!
//! The versioning pipeline suspends only at these seams. Each call is awaited
//! to completion before the next package is processed.
//! - `VersionPrompt`: interactive version selection and confirmation
//! - `VersionRecommender`: conventional-commit version recommendation
//! - `ChangelogWriter`: changelog generation for released packages

use crate::domain::{Package, ReleaseType, VersionMode};
use crate::error::{CollaboratorError, ConfigError};
use async_trait::async_trait;
use semver::Version;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A version offered by interactive selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCandidate {
    pub release: ReleaseType,
    pub version: Version,
}

/// The answer to a version selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionChoice {
    /// Apply a bump keyword
    Bump(ReleaseType),
    /// Use this exact version
    Literal(Version),
}

/// Interactive version selection
#[async_trait]
pub trait VersionPrompt: Send + Sync {
    /// Choose a version for `package`, or for every package in fixed mode when `package` is None
    async fn select_version(
        &self,
        package: Option<&str>,
        current: &Version,
        candidates: &[VersionCandidate],
    ) -> Result<VersionChoice, CollaboratorError>;

    /// Ask a yes/no question
    async fn confirm(&self, message: &str) -> Result<bool, CollaboratorError>;
}

/// How versions below 1.0.0 react to breaking changes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PremajorVersionBump {
    /// Breaking changes bump minor, features bump patch
    #[default]
    Default,
    /// Every change bumps patch
    ForcePatch,
}

impl FromStr for PremajorVersionBump {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(PremajorVersionBump::Default),
            "force-patch" => Ok(PremajorVersionBump::ForcePatch),
            other => Err(ConfigError::InvalidPremajorPolicy {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for PremajorVersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PremajorVersionBump::Default => write!(f, "default"),
            PremajorVersionBump::ForcePatch => write!(f, "force-patch"),
        }
    }
}

/// Options passed to the recommender
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendOptions {
    /// Repository root
    pub root_path: PathBuf,
    /// Prefix of fixed-mode release tags
    pub tag_prefix: String,
    /// Set when the package should be released as a prerelease
    pub prerelease_id: Option<String>,
    pub build_metadata: Option<String>,
    pub changelog_preset: Option<String>,
    /// Keep incrementing an existing prerelease instead of releasing it
    pub bump_prerelease: bool,
}

impl RecommendOptions {
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            tag_prefix: "v".to_string(),
            prerelease_id: None,
            build_metadata: None,
            changelog_preset: None,
            bump_prerelease: false,
        }
    }

    /// Set the fixed-mode tag prefix
    pub fn with_tag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.tag_prefix = prefix.into();
        self
    }

    /// Set the changelog preset
    pub fn with_changelog_preset(mut self, preset: Option<String>) -> Self {
        self.changelog_preset = preset;
        self
    }

    /// Set whether existing prereleases keep incrementing
    pub fn with_bump_prerelease(mut self, bump: bool) -> Self {
        self.bump_prerelease = bump;
        self
    }
}

/// Conventional-commit version recommendation
#[async_trait]
pub trait VersionRecommender: Send + Sync {
    /// Recommend the next version of `package`
    async fn recommend_version(
        &self,
        package: &Package,
        mode: VersionMode,
        options: &RecommendOptions,
        premajor: PremajorVersionBump,
    ) -> Result<String, CollaboratorError>;
}

/// Which changelog a writer call targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangelogMode {
    Fixed,
    Independent,
    /// The repository-level changelog of a fixed-mode project
    Root,
}

impl fmt::Display for ChangelogMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangelogMode::Fixed => write!(f, "fixed"),
            ChangelogMode::Independent => write!(f, "independent"),
            ChangelogMode::Root => write!(f, "root"),
        }
    }
}

/// Options passed to the changelog writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogOptions {
    pub root_path: PathBuf,
    pub tag_prefix: String,
    pub changelog_preset: Option<String>,
}

/// Changelog generation
#[async_trait]
pub trait ChangelogWriter: Send + Sync {
    /// Prepend a release section for the package's (already updated) version
    async fn update_changelog(
        &self,
        package: &Package,
        mode: ChangelogMode,
        options: &ChangelogOptions,
    ) -> Result<(), CollaboratorError>;
}
