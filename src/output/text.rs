//! Text output formatter for human-readable display
//!
//! This module provides:
//! - The `Changes:` listing of new versions, private packages marked
//! - Version change type indication (major/minor/patch/prerelease)
//! - Dependency specifier rewrites and skipped packages in verbose mode

use crate::orchestrator::{OrchestratorResult, RunStatus};
use crate::output::{OutputFormatter, Verbosity, NOTHING_TO_VERSION};
use colored::Colorize;
use semver::Version;
use std::io::Write;

/// Semantic version change type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionChangeType {
    /// Major version change (breaking)
    Major,
    /// Minor version change (features)
    Minor,
    /// Patch version change (fixes)
    Patch,
    /// The new version is a prerelease
    Prerelease,
    /// Unknown or unparseable
    Unknown,
}

impl VersionChangeType {
    /// Determine the change type between two versions
    pub fn from_versions(old: Option<&str>, new: &str) -> Self {
        let old = old.and_then(|v| Version::parse(v).ok());
        let new = Version::parse(new).ok();

        match (old, new) {
            (_, Some(new)) if !new.pre.is_empty() => VersionChangeType::Prerelease,
            (Some(old), Some(new)) => {
                if new.major != old.major {
                    VersionChangeType::Major
                } else if new.minor != old.minor {
                    VersionChangeType::Minor
                } else {
                    VersionChangeType::Patch
                }
            }
            _ => VersionChangeType::Unknown,
        }
    }

    /// Get the display label with color
    pub fn colored_label(&self) -> String {
        match self {
            VersionChangeType::Major => "major".red().bold().to_string(),
            VersionChangeType::Minor => "minor".yellow().to_string(),
            VersionChangeType::Patch => "patch".green().to_string(),
            VersionChangeType::Prerelease => "prerelease".magenta().to_string(),
            VersionChangeType::Unknown => "?".dimmed().to_string(),
        }
    }

    /// Get the plain label
    pub fn label(&self) -> &'static str {
        match self {
            VersionChangeType::Major => "major",
            VersionChangeType::Minor => "minor",
            VersionChangeType::Patch => "patch",
            VersionChangeType::Prerelease => "prerelease",
            VersionChangeType::Unknown => "?",
        }
    }
}

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether this is a dry-run
    dry_run: bool,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity, dry_run: bool) -> Self {
        Self {
            verbosity,
            dry_run,
            color: true,
        }
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, dry_run: bool, color: bool) -> Self {
        Self {
            verbosity,
            dry_run,
            color,
        }
    }

    /// Get the dry-run prefix if applicable
    fn dry_run_prefix(&self) -> String {
        if !self.dry_run {
            String::new()
        } else if self.color {
            format!("{} ", "(dry-run)".cyan())
        } else {
            "(dry-run) ".to_string()
        }
    }

    fn paint(&self, text: &str, f: impl Fn(&str) -> String) -> String {
        if self.color {
            f(text)
        } else {
            text.to_string()
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        if result.status == RunStatus::NothingChanged {
            if self.verbosity != Verbosity::Quiet {
                writeln!(writer, "{}{}", self.dry_run_prefix(), NOTHING_TO_VERSION)?;
            }
            return Ok(());
        }

        if self.verbosity == Verbosity::Quiet {
            return Ok(());
        }

        writeln!(writer)?;
        writeln!(writer, "{}Changes:", self.dry_run_prefix())?;
        for change in &result.changes {
            let old = change.old_version.as_deref().unwrap_or("(none)");
            let new = self.paint(&change.new_version, |s| s.green().to_string());
            let private = if change.private { " (private)" } else { "" };

            if self.verbosity == Verbosity::Verbose {
                let kind = VersionChangeType::from_versions(
                    change.old_version.as_deref(),
                    &change.new_version,
                );
                let label = if self.color {
                    kind.colored_label()
                } else {
                    kind.label().to_string()
                };
                writeln!(
                    writer,
                    " - {}: {} => {}{} [{}]",
                    change.name, old, new, private, label
                )?;
            } else {
                writeln!(writer, " - {}: {} => {}{}", change.name, old, new, private)?;
            }
        }

        if self.verbosity == Verbosity::Verbose {
            if !result.rewrites.is_empty() {
                writeln!(writer)?;
                writeln!(writer, "Dependency updates:")?;
                for rewrite in &result.rewrites {
                    writeln!(writer, " - {}", rewrite)?;
                }
            }
            if !result.skipped.is_empty() {
                writeln!(writer)?;
                writeln!(
                    writer,
                    "Skipped (private, no version): {}",
                    self.paint(&result.skipped.join(", "), |s| s.dimmed().to_string())
                )?;
            }
        }

        writeln!(writer)?;
        Ok(())
    }

    fn format_summary(
        &self,
        result: &OrchestratorResult,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let prefix = self.dry_run_prefix();
        let count = result.changes.len();

        match result.status {
            RunStatus::NothingChanged | RunStatus::Planned => {}
            RunStatus::Aborted => writeln!(writer, "Aborted.")?,
            RunStatus::Completed if result.dry_run => writeln!(
                writer,
                "{}{} package(s) would be versioned",
                prefix, count
            )?,
            RunStatus::Completed => {
                let manifests = result.written.iter().filter(|w| w.file_modified).count();
                let message = format!(
                    "Versioned {} package(s), updated {} manifest(s)",
                    count, manifests
                );
                writeln!(writer, "{}", self.paint(&message, |s| s.green().bold().to_string()))?;
                if result.changelogs > 0 && self.verbosity == Verbosity::Verbose {
                    writeln!(writer, "Updated {} changelog(s)", result.changelogs)?;
                }
            }
        }

        Ok(())
    }
}
