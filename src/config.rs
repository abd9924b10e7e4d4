//! Project configuration file
//!
//! Reads `monover.json` from the workspace root, falling back to `lerna.json`.
//! Every field is optional; CLI flags override what is read here.

use crate::collaborator::PremajorVersionBump;
use crate::domain::VersionMode;
use crate::error::ConfigError;
use crate::update::PackageSelector;
use semver::Version;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config file names, in lookup order
pub const CONFIG_FILES: [&str; 2] = ["monover.json", "lerna.json"];

const INDEPENDENT: &str = "independent";

/// Parsed project configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// A semantic version (fixed mode) or "independent"
    pub version: Option<String>,
    /// Package globs
    pub packages: Option<Vec<String>>,
    #[serde(default)]
    pub command: CommandConfig,
    /// The file this configuration was read from
    #[serde(skip)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandConfig {
    #[serde(default)]
    pub version: VersionCommandConfig,
}

/// Defaults for the version command
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionCommandConfig {
    pub exact: Option<bool>,
    /// `false` excludes private packages
    pub private: Option<bool>,
    pub conventional_commits: Option<bool>,
    pub changelog: Option<bool>,
    pub tag_version_prefix: Option<String>,
    pub preid: Option<String>,
    pub premajor_version_bump: Option<String>,
    pub force_publish: Option<ForcePublishValue>,
    pub changelog_preset: Option<String>,
}

/// `forcePublish` accepts a boolean, a comma separated string or a list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ForcePublishValue {
    Flag(bool),
    List(String),
    Names(Vec<String>),
}

impl ForcePublishValue {
    pub fn selector(&self) -> PackageSelector {
        match self {
            ForcePublishValue::Flag(true) => PackageSelector::All,
            ForcePublishValue::Flag(false) => PackageSelector::None,
            ForcePublishValue::List(value) => PackageSelector::parse(value),
            ForcePublishValue::Names(names) => PackageSelector::from_list(names),
        }
    }
}

impl ProjectConfig {
    /// Load the configuration of the workspace at `root`, or defaults when no file exists
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        for name in CONFIG_FILES {
            let path = root.join(name);
            if path.is_file() {
                debug!(path = %path.display(), "reading project configuration");
                return Self::from_file(&path);
            }
        }
        Ok(Self::default())
    }

    /// Parse a specific config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::InvalidFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut config = Self::parse(&content).map_err(|message| ConfigError::InvalidFile {
            path: path.to_path_buf(),
            message,
        })?;
        config.path = Some(path.to_path_buf());
        config.lockstep_version()?;
        config.premajor_version_bump()?;
        Ok(config)
    }

    fn parse(content: &str) -> Result<Self, String> {
        serde_json::from_str(content).map_err(|e| e.to_string())
    }

    pub fn is_independent(&self) -> bool {
        self.version.as_deref() == Some(INDEPENDENT)
    }

    pub fn mode(&self) -> VersionMode {
        if self.is_independent() {
            VersionMode::Independent
        } else {
            VersionMode::Fixed
        }
    }

    /// The configured fixed-mode version; None in independent mode or when unset
    pub fn lockstep_version(&self) -> Result<Option<Version>, ConfigError> {
        match self.version.as_deref() {
            None | Some(INDEPENDENT) => Ok(None),
            Some(raw) => Version::parse(raw)
                .map(Some)
                .map_err(|e| ConfigError::InvalidFile {
                    path: self.path.clone().unwrap_or_default(),
                    message: format!("invalid version '{}': {}", raw, e),
                }),
        }
    }

    pub fn premajor_version_bump(&self) -> Result<PremajorVersionBump, ConfigError> {
        self.command
            .version
            .premajor_version_bump
            .as_deref()
            .map_or(Ok(PremajorVersionBump::Default), str::parse)
    }

    pub fn force_publish(&self) -> PackageSelector {
        self.command
            .version
            .force_publish
            .as_ref()
            .map(ForcePublishValue::selector)
            .unwrap_or_default()
    }

    pub fn exact(&self) -> bool {
        self.command.version.exact.unwrap_or(false)
    }

    pub fn exclude_private(&self) -> bool {
        self.command.version.private == Some(false)
    }

    pub fn conventional_commits(&self) -> bool {
        self.command.version.conventional_commits.unwrap_or(false)
    }

    pub fn changelog(&self) -> bool {
        self.command.version.changelog.unwrap_or(true)
    }

    pub fn tag_version_prefix(&self) -> &str {
        self.command
            .version
            .tag_version_prefix
            .as_deref()
            .unwrap_or("v")
    }
}
