//! CHANGELOG.md generation
//!
//! Prepends one section per release, grouped by commit type:
//! - BREAKING CHANGES
//! - Features
//! - Bug Fixes
//! - Performance Improvements and Reverts (`conventionalcommits` preset)
//!
//! A release without notable commits gets a "version bump only" note.

use crate::collaborator::{ChangelogMode, ChangelogOptions, ChangelogWriter};
use crate::conventional::{release_tag_pattern, ConventionalCommit};
use crate::domain::{Package, VersionMode};
use crate::error::CollaboratorError;
use crate::git::GitRepository;
use async_trait::async_trait;
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Changelog file name
pub const CHANGELOG_FILE: &str = "CHANGELOG.md";

const HEADER: &str = "# Change Log\n\nAll notable changes to this project will be documented in this file.\nSee [Conventional Commits](https://conventionalcommits.org) for commit guidelines.\n";

/// Section layout of a generated changelog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChangelogPreset {
    #[default]
    Angular,
    ConventionalCommits,
}

impl ChangelogPreset {
    /// Resolve a preset by name; `None` selects the default.
    /// The `conventional-changelog-` package prefix is accepted.
    pub fn from_name(name: Option<&str>) -> Result<Self, CollaboratorError> {
        let Some(name) = name else {
            return Ok(Self::default());
        };
        match name.trim().trim_start_matches("conventional-changelog-") {
            "angular" => Ok(ChangelogPreset::Angular),
            "conventionalcommits" => Ok(ChangelogPreset::ConventionalCommits),
            _ => Err(CollaboratorError::UnknownPreset {
                name: name.to_string(),
            }),
        }
    }

    fn breaking_title(self) -> &'static str {
        match self {
            ChangelogPreset::Angular => "BREAKING CHANGES",
            ChangelogPreset::ConventionalCommits => "⚠ BREAKING CHANGES",
        }
    }

    /// (commit type, section title) pairs in rendering order
    fn groups(self) -> &'static [(&'static str, &'static str)] {
        match self {
            ChangelogPreset::Angular => &[("feat", "Features"), ("fix", "Bug Fixes")],
            ChangelogPreset::ConventionalCommits => &[
                ("feat", "Features"),
                ("fix", "Bug Fixes"),
                ("perf", "Performance Improvements"),
                ("revert", "Reverts"),
            ],
        }
    }
}

/// Writes CHANGELOG.md files from the git history
#[derive(Debug, Clone)]
pub struct FileChangelogWriter {
    git: GitRepository,
}

impl FileChangelogWriter {
    pub fn new(git: GitRepository) -> Self {
        Self { git }
    }

    fn changelog_path(package: &Package, mode: ChangelogMode, root: &Path) -> PathBuf {
        match mode {
            ChangelogMode::Root => root.join(CHANGELOG_FILE),
            _ => package.location.join(CHANGELOG_FILE),
        }
    }

    fn commits(
        &self,
        package: &Package,
        mode: ChangelogMode,
        options: &ChangelogOptions,
    ) -> Result<Vec<ConventionalCommit>, CollaboratorError> {
        let (pattern, path) = match mode {
            ChangelogMode::Independent => (
                release_tag_pattern(&package.name, VersionMode::Independent, &options.tag_prefix),
                Some(package.relative_location(self.git.root())),
            ),
            ChangelogMode::Fixed => (
                release_tag_pattern(&package.name, VersionMode::Fixed, &options.tag_prefix),
                Some(package.relative_location(self.git.root())),
            ),
            ChangelogMode::Root => (
                release_tag_pattern(&package.name, VersionMode::Fixed, &options.tag_prefix),
                None,
            ),
        };

        let tag = self.git.last_tag(&pattern)?;
        let messages = self.git.commit_messages(tag.as_deref(), path.as_deref())?;
        Ok(messages.iter().map(|m| ConventionalCommit::parse(m)).collect())
    }
}

#[async_trait]
impl ChangelogWriter for FileChangelogWriter {
    async fn update_changelog(
        &self,
        package: &Package,
        mode: ChangelogMode,
        options: &ChangelogOptions,
    ) -> Result<(), CollaboratorError> {
        let preset = ChangelogPreset::from_name(options.changelog_preset.as_deref())?;
        let path = Self::changelog_path(package, mode, &options.root_path);
        let version = package.version.as_deref().unwrap_or("0.0.0");
        let commits = self.commits(package, mode, options)?;

        let date = Local::now().format("%Y-%m-%d").to_string();
        let section = render_section(&package.name, version, &date, &commits, preset);

        let existing = match std::fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(CollaboratorError::Changelog {
                    path,
                    message: e.to_string(),
                })
            }
        };

        let content = prepend_section(existing.as_deref(), &section);
        std::fs::write(&path, content).map_err(|e| CollaboratorError::Changelog {
            path: path.clone(),
            message: e.to_string(),
        })?;

        debug!(path = %path.display(), %mode, version, "changelog updated");
        Ok(())
    }
}

/// One release section in markdown
pub fn render_section(
    name: &str,
    version: &str,
    date: &str,
    commits: &[ConventionalCommit],
    preset: ChangelogPreset,
) -> String {
    let mut out = format!("## {} ({})\n\n", version, date);

    let breaking: Vec<&str> = commits.iter().filter_map(|c| c.breaking.as_deref()).collect();
    let groups: Vec<(&str, Vec<&ConventionalCommit>)> = preset
        .groups()
        .iter()
        .map(|(kind, title)| {
            let group = commits
                .iter()
                .filter(|c| c.kind.as_deref() == Some(*kind))
                .collect();
            (*title, group)
        })
        .collect();

    if breaking.is_empty() && groups.iter().all(|(_, group)| group.is_empty()) {
        out.push_str(&format!("**Note:** Version bump only for package {}\n", name));
        return out;
    }

    if !breaking.is_empty() {
        out.push_str(&format!("### {}\n\n", preset.breaking_title()));
        for note in breaking {
            out.push_str(&format!("* {}\n", note));
        }
        out.push('\n');
    }

    for (title, group) in groups {
        if group.is_empty() {
            continue;
        }
        out.push_str(&format!("### {}\n\n", title));
        for commit in group {
            match &commit.scope {
                Some(scope) => out.push_str(&format!("* **{}:** {}\n", scope, commit.subject)),
                None => out.push_str(&format!("* {}\n", commit.subject)),
            }
        }
        out.push('\n');
    }

    out.truncate(out.trim_end().len());
    out.push('\n');
    out
}

/// Insert `section` below the header, creating the header when missing
pub fn prepend_section(existing: Option<&str>, section: &str) -> String {
    let body = existing
        .map(|content| content.strip_prefix(HEADER).unwrap_or(content))
        .unwrap_or_default()
        .trim_start();

    if body.is_empty() {
        format!("{}\n{}", HEADER, section)
    } else {
        format!("{}\n{}\n{}", HEADER, section, body)
    }
}
