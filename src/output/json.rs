//! JSON output formatter for machine processing
//!
//! Prints one array entry per versioned package:
//! `{ name, version, newVersion, private, location }`

use crate::orchestrator::OrchestratorResult;
use crate::output::OutputFormatter;
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
#[derive(Debug, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self
    }
}

/// JSON representation of a versioned package
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonPackage<'a> {
    name: &'a str,
    /// Version before this release
    version: Option<&'a str>,
    new_version: &'a str,
    private: bool,
    location: String,
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let packages: Vec<JsonPackage> = result
            .changes
            .iter()
            .map(|change| JsonPackage {
                name: &change.name,
                version: change.old_version.as_deref(),
                new_version: &change.new_version,
                private: change.private,
                location: change.location.display().to_string(),
            })
            .collect();

        let json = serde_json::to_string_pretty(&packages).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)
    }

    fn format_summary(
        &self,
        _result: &OrchestratorResult,
        _writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        Ok(())
    }
}
