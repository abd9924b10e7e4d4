//! Package selection and collection options
//!
//! This module provides:
//! - `PackageSelector`: "all", exact names or glob patterns, used for
//!   force-publish, prerelease and graduate selection
//! - `CollectOptions`: all options of update collection

use crate::domain::VersionMode;
use glob::Pattern;

/// Selects workspace packages by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PackageSelector {
    /// Selects nothing
    #[default]
    None,
    /// Selects every package
    All,
    /// Exact names or glob patterns
    Patterns(Vec<String>),
}

impl PackageSelector {
    /// Builds a selector from a comma separated list; `*` or an empty value selects all
    pub fn parse(value: &str) -> Self {
        let patterns: Vec<String> = value
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();

        if patterns.is_empty() || patterns.iter().any(|p| p == "*" || p == "true") {
            PackageSelector::All
        } else {
            PackageSelector::Patterns(patterns)
        }
    }

    /// Builds a selector from an optional flag value.
    ///
    /// `None` means the flag was absent, `Some(None)` that it was given bare.
    pub fn from_flag(flag: Option<Option<&str>>) -> Self {
        match flag {
            None => PackageSelector::None,
            Some(None) => PackageSelector::All,
            Some(Some(value)) => PackageSelector::parse(value),
        }
    }

    /// Builds a selector from a list of names or patterns
    pub fn from_list(values: &[String]) -> Self {
        PackageSelector::parse(&values.join(","))
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, PackageSelector::None)
    }

    pub fn is_all(&self) -> bool {
        matches!(self, PackageSelector::All)
    }

    /// Check if a package name is selected
    pub fn matches(&self, name: &str) -> bool {
        match self {
            PackageSelector::None => false,
            PackageSelector::All => true,
            PackageSelector::Patterns(patterns) => patterns.iter().any(|p| {
                p == name || Pattern::new(p).is_ok_and(|pattern| pattern.matches(name))
            }),
        }
    }
}

/// Options controlling update collection
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Packages always included regardless of changes
    pub force_publish: PackageSelector,
    /// Prerelease packages to graduate, included regardless of changes
    pub graduate: PackageSelector,
    /// Remove private packages from the result
    pub exclude_private: bool,
    /// Versioning mode
    pub mode: VersionMode,
    /// In fixed mode, version every package once anything changed
    pub lockstep_all: bool,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            force_publish: PackageSelector::None,
            graduate: PackageSelector::None,
            exclude_private: false,
            mode: VersionMode::Fixed,
            lockstep_all: false,
        }
    }
}

impl CollectOptions {
    /// Create options with default settings (fixed mode, nothing forced)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the force-publish selector
    pub fn with_force_publish(mut self, selector: PackageSelector) -> Self {
        self.force_publish = selector;
        self
    }

    /// Set the graduate selector
    pub fn with_graduate(mut self, selector: PackageSelector) -> Self {
        self.graduate = selector;
        self
    }

    /// Set whether private packages are excluded
    pub fn with_exclude_private(mut self, exclude: bool) -> Self {
        self.exclude_private = exclude;
        self
    }

    /// Set the versioning mode
    pub fn with_mode(mut self, mode: VersionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set whether fixed mode widens to every package
    pub fn with_lockstep_all(mut self, lockstep_all: bool) -> Self {
        self.lockstep_all = lockstep_all;
        self
    }

    /// Returns true if the result should be widened to every package
    pub fn widens_to_all(&self) -> bool {
        self.mode == VersionMode::Fixed && (self.lockstep_all || self.graduate.is_active())
    }
}
