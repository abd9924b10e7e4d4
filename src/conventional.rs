//! Conventional-commit analysis
//!
//! This module provides:
//! - Parsing of commit messages in `type(scope)!: subject` form
//! - `ConventionalRecommender`, the git-backed `VersionRecommender`
//!
//! Breaking changes recommend `major`, `feat` recommends `minor`, anything
//! else `patch`. Below 1.0.0 a breaking change recommends `minor` instead
//! (or `patch` under the force-patch policy).

use crate::changelog::ChangelogPreset;
use crate::collaborator::{PremajorVersionBump, RecommendOptions, VersionRecommender};
use crate::domain::{apply_build_metadata, increment, Package, ReleaseType, VersionMode};
use crate::error::CollaboratorError;
use crate::git::GitRepository;
use async_trait::async_trait;
use regex::Regex;
use semver::Version;
use std::sync::LazyLock;
use tracing::debug;

/// Regex for the commit header: type, optional scope, optional `!`, subject
static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<type>[A-Za-z]+)(?:\((?P<scope>[^)]*)\))?(?P<bang>!)?:\s*(?P<subject>.+)$")
        .expect("Invalid regex")
});

/// Regex for a breaking-change footer
static BREAKING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^BREAKING[ -]CHANGE:\s*(?P<note>.+)$").expect("Invalid regex")
});

/// A parsed commit message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionalCommit {
    /// Lower-cased commit type, `None` for non-conventional headers
    pub kind: Option<String>,
    pub scope: Option<String>,
    pub subject: String,
    /// Breaking-change note, or the subject for `type!:` headers
    pub breaking: Option<String>,
}

impl ConventionalCommit {
    /// Parse a full commit message
    pub fn parse(message: &str) -> Self {
        let header = message.lines().next().unwrap_or_default().trim();
        let footer_note = BREAKING_RE
            .captures(message)
            .and_then(|c| c.name("note"))
            .map(|m| m.as_str().trim().to_string());

        match HEADER_RE.captures(header) {
            Some(caps) => {
                let subject = caps["subject"].trim().to_string();
                let breaking = footer_note.or_else(|| {
                    caps.name("bang").map(|_| subject.clone())
                });
                Self {
                    kind: Some(caps["type"].to_lowercase()),
                    scope: caps
                        .name("scope")
                        .map(|m| m.as_str().to_string())
                        .filter(|s| !s.is_empty()),
                    subject,
                    breaking,
                }
            }
            None => Self {
                kind: None,
                scope: None,
                subject: header.to_string(),
                breaking: footer_note,
            },
        }
    }

    pub fn is_breaking(&self) -> bool {
        self.breaking.is_some()
    }

    pub fn is_feature(&self) -> bool {
        self.kind.as_deref() == Some("feat")
    }

    pub fn is_fix(&self) -> bool {
        self.kind.as_deref() == Some("fix")
    }

    /// The release level this commit asks for
    pub fn level(&self) -> ReleaseType {
        if self.is_breaking() {
            ReleaseType::Major
        } else if self.is_feature() {
            ReleaseType::Minor
        } else {
            ReleaseType::Patch
        }
    }
}

/// Highest release level requested by `messages`; `patch` when there are none
pub fn recommended_level<S: AsRef<str>>(messages: &[S]) -> ReleaseType {
    messages
        .iter()
        .map(|m| ConventionalCommit::parse(m.as_ref()).level())
        .max_by_key(|level| level_rank(*level))
        .unwrap_or(ReleaseType::Patch)
}

fn level_rank(level: ReleaseType) -> u8 {
    match level {
        ReleaseType::Major => 2,
        ReleaseType::Minor => 1,
        _ => 0,
    }
}

/// Tag pattern of the last release of `package`
pub fn release_tag_pattern(package: &str, mode: VersionMode, tag_prefix: &str) -> String {
    match mode {
        VersionMode::Fixed => format!("{}*", tag_prefix),
        VersionMode::Independent => format!("{}@*", package),
    }
}

/// Next version for a package at `current` given a commit-derived level
pub fn next_version(
    current: &Version,
    level: ReleaseType,
    options: &RecommendOptions,
    premajor: PremajorVersionBump,
) -> Result<Version, crate::error::ValidationError> {
    let mut level = level;
    if current.major == 0 {
        level = match (premajor, level) {
            (PremajorVersionBump::ForcePatch, _) => ReleaseType::Patch,
            (PremajorVersionBump::Default, ReleaseType::Major) => ReleaseType::Minor,
            (_, other) => other,
        };
    }

    let next = match options.prerelease_id.as_deref() {
        Some(id) => {
            let release = if options.bump_prerelease || should_bump_prerelease(level, current) {
                match level {
                    ReleaseType::Major => ReleaseType::Premajor,
                    ReleaseType::Minor => ReleaseType::Preminor,
                    _ => ReleaseType::Prepatch,
                }
            } else {
                ReleaseType::Prerelease
            };
            increment(current, release, Some(id))?
        }
        None => increment(current, level, None)?,
    };

    match options.build_metadata.as_deref() {
        Some(metadata) => apply_build_metadata(&next, metadata),
        None => Ok(next),
    }
}

/// Whether a prerelease must move to a new boundary instead of incrementing
fn should_bump_prerelease(level: ReleaseType, current: &Version) -> bool {
    if current.pre.is_empty() {
        return true;
    }
    match level {
        ReleaseType::Major => current.minor != 0 || current.patch != 0,
        ReleaseType::Minor => current.patch != 0,
        _ => false,
    }
}

/// Recommends versions from the git history of each package
#[derive(Debug, Clone)]
pub struct ConventionalRecommender {
    git: GitRepository,
}

impl ConventionalRecommender {
    pub fn new(git: GitRepository) -> Self {
        Self { git }
    }

    /// Commit messages touching `package` since its last release
    pub fn commits_since_release(
        &self,
        package: &Package,
        mode: VersionMode,
        tag_prefix: &str,
    ) -> Result<Vec<String>, CollaboratorError> {
        let pattern = release_tag_pattern(&package.name, mode, tag_prefix);
        let tag = self.git.last_tag(&pattern)?;
        let location = package.relative_location(self.git.root());
        self.git.commit_messages(tag.as_deref(), Some(&location))
    }
}

#[async_trait]
impl VersionRecommender for ConventionalRecommender {
    async fn recommend_version(
        &self,
        package: &Package,
        mode: VersionMode,
        options: &RecommendOptions,
        premajor: PremajorVersionBump,
    ) -> Result<String, CollaboratorError> {
        // Both built-in presets derive the same release level; unknown ones fail here,
        // before any manifest is written
        ChangelogPreset::from_name(options.changelog_preset.as_deref())?;

        let current = package
            .require_semver()
            .map_err(|e| CollaboratorError::recommendation(&package.name, e.to_string()))?;

        let commits = self.commits_since_release(package, mode, &options.tag_prefix)?;
        let level = recommended_level(&commits);
        debug!(package = %package.name, commits = commits.len(), %level, "commit analysis");

        let next = next_version(&current, level, options, premajor)
            .map_err(|e| CollaboratorError::recommendation(&package.name, e.to_string()))?;
        Ok(next.to_string())
    }
}
