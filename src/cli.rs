//! CLI argument parsing module for monover

use crate::collaborator::PremajorVersionBump;
use crate::domain::ReleaseType;
use crate::error::ConfigError;
use crate::update::PackageSelector;
use clap::{ArgAction, Parser};
use semver::Version;
use std::path::PathBuf;

/// The positional bump argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BumpArg {
    /// A semver keyword such as `minor`
    Release(ReleaseType),
    /// A literal version such as `2.0.0`
    Explicit(Version),
}

/// Parse a bump keyword or an explicit version
pub fn parse_bump(s: &str) -> Result<BumpArg, ConfigError> {
    if let Ok(release) = s.parse::<ReleaseType>() {
        return Ok(BumpArg::Release(release));
    }
    let literal = s.strip_prefix('v').unwrap_or(s);
    Version::parse(literal)
        .map(BumpArg::Explicit)
        .map_err(|_| ConfigError::InvalidBump {
            value: s.to_string(),
        })
}

/// Dependency-aware release versioning for JavaScript monorepos
#[derive(Parser, Debug, Clone)]
#[command(
    name = "monover",
    version,
    about = "Dependency-aware release versioning for JavaScript monorepos"
)]
pub struct CliArgs {
    /// Workspace root (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// major, minor, patch, premajor, preminor, prepatch, prerelease or an explicit version
    #[arg(value_parser = parse_bump)]
    pub bump: Option<BumpArg>,

    // Version selection
    /// Recommend versions from conventional commits
    #[arg(long)]
    pub conventional_commits: bool,

    /// Release changed packages (all, or the listed names/globs) as prereleases
    #[arg(long, num_args = 0..=1, require_equals = true, value_name = "NAMES")]
    pub conventional_prerelease: Option<Option<String>>,

    /// Graduate prerelease packages (all, or the listed names/globs) to stable versions
    #[arg(long, num_args = 0..=1, require_equals = true, value_name = "NAMES")]
    pub conventional_graduate: Option<Option<String>>,

    /// Bump existing prereleases to a new prerelease boundary instead of incrementing them
    #[arg(long)]
    pub conventional_bump_prerelease: bool,

    /// Pre-1.0 bump policy for recommendations
    #[arg(long, value_name = "POLICY")]
    pub premajor_version_bump: Option<PremajorVersionBump>,

    /// Prerelease identifier (default: the current one, else "alpha")
    #[arg(long)]
    pub preid: Option<String>,

    /// Build metadata appended to every new version
    #[arg(long)]
    pub build_metadata: Option<String>,

    // Update set
    /// Version packages (all, or the listed names/globs) even without changes
    #[arg(long, num_args = 0..=1, require_equals = true, value_name = "NAMES")]
    pub force_publish: Option<Option<String>>,

    /// Treat only these packages as changed, skipping git change detection
    #[arg(
        long,
        num_args = 0..=1,
        require_equals = true,
        value_delimiter = ',',
        action = ArgAction::Append,
        value_name = "NAMES"
    )]
    pub changed: Option<Vec<String>>,

    /// Never version private packages
    #[arg(long)]
    pub no_private: bool,

    /// Only valid for projects configured with "version": "independent"
    #[arg(long)]
    pub independent: bool,

    // Manifest and changelog options
    /// Write exact versions instead of ranges into dependent manifests
    #[arg(long)]
    pub exact: bool,

    /// Prefix of fixed-mode release tags (default: "v")
    #[arg(long)]
    pub tag_version_prefix: Option<String>,

    /// Conventional changelog preset name
    #[arg(long)]
    pub changelog_preset: Option<String>,

    /// Do not write CHANGELOG.md files
    #[arg(long)]
    pub no_changelog: bool,

    // General options
    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Dry run mode - show what would be versioned without making changes
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Show manifest changes in diff format
    #[arg(long)]
    pub diff: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,
}

impl CliArgs {
    /// Selector of `--force-publish`
    pub fn force_publish_selector(&self) -> PackageSelector {
        PackageSelector::from_flag(self.force_publish.as_ref().map(Option::as_deref))
    }

    /// Selector of `--conventional-prerelease`
    pub fn prerelease_selector(&self) -> PackageSelector {
        PackageSelector::from_flag(self.conventional_prerelease.as_ref().map(Option::as_deref))
    }

    /// Selector of `--conventional-graduate`
    pub fn graduate_selector(&self) -> PackageSelector {
        PackageSelector::from_flag(self.conventional_graduate.as_ref().map(Option::as_deref))
    }

    /// Names given with `--changed`, if change detection is overridden
    pub fn changed_packages(&self) -> Option<Vec<String>> {
        self.changed.as_ref().map(|names| {
            names
                .iter()
                .map(|n| n.trim())
                .filter(|n| !n.is_empty())
                .map(String::from)
                .collect()
        })
    }
}
