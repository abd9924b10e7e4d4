//! Diff output formatter for showing manifest edits
//!
//! One unified-diff style block per touched package.json: the version line
//! and every rewritten dependency specifier.

use crate::orchestrator::{OrchestratorResult, RunStatus};
use crate::output::{OutputFormatter, NOTHING_TO_VERSION};
use std::io::Write;
use std::path::Path;

/// Diff formatter for showing version changes
pub struct DiffFormatter {
    /// Whether this is a dry-run
    dry_run: bool,
}

impl DiffFormatter {
    /// Create a new diff formatter
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Get the dry-run prefix if applicable
    fn dry_run_prefix(&self) -> &'static str {
        if self.dry_run {
            "(dry-run) "
        } else {
            ""
        }
    }

    fn manifest_path(result: &OrchestratorResult, location: &Path) -> String {
        let relative = location.strip_prefix(&result.root).unwrap_or(location);
        relative.join("package.json").display().to_string()
    }
}

impl OutputFormatter for DiffFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let prefix = self.dry_run_prefix();

        if result.status == RunStatus::NothingChanged {
            writeln!(writer, "{}# {}", prefix, NOTHING_TO_VERSION)?;
            return Ok(());
        }

        // Packages receiving a new version, then dependents only touched by rewrites
        let mut touched: Vec<(&str, &Path)> = result
            .changes
            .iter()
            .map(|c| (c.name.as_str(), c.location.as_path()))
            .collect();
        for rewrite in &result.rewrites {
            if touched.iter().all(|(name, _)| *name != rewrite.package) {
                if let Some(location) = result.location_of(&rewrite.package) {
                    touched.push((rewrite.package.as_str(), location));
                }
            }
        }

        for (name, location) in touched {
            let path = Self::manifest_path(result, location);
            writeln!(writer, "{}--- a/{}", prefix, path)?;
            writeln!(writer, "{}+++ b/{}", prefix, path)?;

            if let Some(change) = result.changes.iter().find(|c| c.name == name) {
                writeln!(writer, "@@ version @@")?;
                if let Some(old) = &change.old_version {
                    writeln!(writer, "-  \"version\": \"{}\"", old)?;
                }
                writeln!(writer, "+  \"version\": \"{}\"", change.new_version)?;
            }

            for rewrite in result.rewrites.iter().filter(|r| r.package == name) {
                writeln!(writer, "@@ {} @@", rewrite.dependency_type)?;
                writeln!(writer, "-  \"{}\": \"{}\"", rewrite.dependency, rewrite.old_specifier)?;
                writeln!(writer, "+  \"{}\": \"{}\"", rewrite.dependency, rewrite.new_specifier)?;
            }

            writeln!(writer)?;
        }

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
            RunStatus::Completed if result.dry_run => {
                writeln!(writer, "{}# {} package(s) would be versioned", prefix, count)
            }
            RunStatus::Completed => writeln!(writer, "# {} package(s) versioned", count),
            RunStatus::Aborted => writeln!(writer, "# aborted"),
            RunStatus::NothingChanged | RunStatus::Planned => Ok(()),
        }
    }
}
