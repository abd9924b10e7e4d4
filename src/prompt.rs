//! Interactive prompts
//!
//! Uses dialoguer for terminal-based version selection and confirmation.
//! The blocking terminal calls run on tokio's blocking pool.

use crate::collaborator::{VersionCandidate, VersionChoice, VersionPrompt};
use crate::error::CollaboratorError;
use async_trait::async_trait;
use dialoguer::{Confirm, Input, Select};
use semver::Version;

const CUSTOM_VERSION: &str = "Custom Version";

/// Terminal prompt backed by dialoguer
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    pub fn new() -> Self {
        Self
    }
}

/// Menu labels: one per candidate plus the custom entry
pub fn menu_items(candidates: &[VersionCandidate]) -> Vec<String> {
    let mut items: Vec<String> = candidates
        .iter()
        .map(|c| format!("{} ({})", capitalize(c.release.as_str()), c.version))
        .collect();
    items.push(CUSTOM_VERSION.to_string());
    items
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn selection_prompt(package: Option<&str>, current: &Version) -> String {
    match package {
        Some(name) => format!("Select a new version for {} (currently {})", name, current),
        None => format!("Select a new version (currently {})", current),
    }
}

#[async_trait]
impl VersionPrompt for TerminalPrompt {
    async fn select_version(
        &self,
        package: Option<&str>,
        current: &Version,
        candidates: &[VersionCandidate],
    ) -> Result<VersionChoice, CollaboratorError> {
        let prompt = selection_prompt(package, current);
        let items = menu_items(candidates);
        let releases: Vec<_> = candidates.iter().map(|c| c.release).collect();

        tokio::task::spawn_blocking(move || {
            let index = Select::new()
                .with_prompt(prompt)
                .items(&items)
                .default(0)
                .interact()
                .map_err(|e| CollaboratorError::prompt(e.to_string()))?;

            if let Some(release) = releases.get(index) {
                return Ok(VersionChoice::Bump(*release));
            }

            let raw: String = Input::new()
                .with_prompt("Enter a custom version")
                .validate_with(|input: &String| {
                    Version::parse(input.trim())
                        .map(|_| ())
                        .map_err(|_| "Must be a valid semver version")
                })
                .interact_text()
                .map_err(|e| CollaboratorError::prompt(e.to_string()))?;

            Version::parse(raw.trim())
                .map(VersionChoice::Literal)
                .map_err(|e| CollaboratorError::prompt(e.to_string()))
        })
        .await
        .map_err(|e| CollaboratorError::prompt(e.to_string()))?
    }

    async fn confirm(&self, message: &str) -> Result<bool, CollaboratorError> {
        let message = message.to_string();
        tokio::task::spawn_blocking(move || {
            Confirm::new()
                .with_prompt(message)
                .default(false)
                .interact()
                .map_err(|e| CollaboratorError::prompt(e.to_string()))
        })
        .await
        .map_err(|e| CollaboratorError::prompt(e.to_string()))?
    }
}

/// Non-interactive prompt that accepts every confirmation, for `--yes`
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

#[async_trait]
impl VersionPrompt for AssumeYes {
    async fn select_version(
        &self,
        package: Option<&str>,
        _current: &Version,
        _candidates: &[VersionCandidate],
    ) -> Result<VersionChoice, CollaboratorError> {
        Err(CollaboratorError::prompt(format!(
            "a version must be selected interactively{}; pass a bump or --conventional-commits",
            package.map(|p| format!(" for {}", p)).unwrap_or_default()
        )))
    }

    async fn confirm(&self, _message: &str) -> Result<bool, CollaboratorError> {
        Ok(true)
    }
}
