//! Workspace package pattern sources
//!
//! Reads package globs from (in priority order):
//! - the project configuration (`packages`)
//! - package.json (`workspaces` as an array or `{ "packages": [...] }`)
//! - pnpm-workspace.yaml (`packages:` list)
//!
//! Falls back to `packages/*` when none of them is present.

use std::path::Path;

/// Pattern used when nothing else is configured
pub const DEFAULT_PACKAGE_PATTERN: &str = "packages/*";

/// Resolve the package globs for a workspace rooted at `dir`
pub fn package_patterns(dir: &Path, configured: Option<&[String]>) -> Vec<String> {
    if let Some(patterns) = configured.filter(|p| !p.is_empty()) {
        return patterns.to_vec();
    }

    if let Some(patterns) = read_package_json_workspaces(dir) {
        return patterns;
    }

    if let Some(patterns) = read_pnpm_workspace_packages(dir) {
        return patterns;
    }

    vec![DEFAULT_PACKAGE_PATTERN.to_string()]
}

/// Read `workspaces` from the root package.json
fn read_package_json_workspaces(dir: &Path) -> Option<Vec<String>> {
    let content = std::fs::read_to_string(dir.join("package.json")).ok()?;
    let json: serde_json::Value = serde_json::from_str(&content).ok()?;

    let workspaces = json.get("workspaces")?;
    let list = workspaces
        .as_array()
        .or_else(|| workspaces.get("packages")?.as_array())?;

    let patterns: Vec<String> = list
        .iter()
        .filter_map(|v| v.as_str().map(String::from))
        .collect();
    (!patterns.is_empty()).then_some(patterns)
}

/// Read the `packages:` list from pnpm-workspace.yaml
fn read_pnpm_workspace_packages(dir: &Path) -> Option<Vec<String>> {
    let content = std::fs::read_to_string(dir.join("pnpm-workspace.yaml")).ok()?;
    let patterns = parse_pnpm_packages(&content);
    (!patterns.is_empty()).then_some(patterns)
}

/// Simple YAML parsing for the top-level `packages:` sequence
fn parse_pnpm_packages(content: &str) -> Vec<String> {
    let mut patterns = Vec::new();
    let mut in_packages = false;

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if !line.starts_with(char::is_whitespace) && !trimmed.starts_with('-') {
            in_packages = trimmed == "packages:";
            continue;
        }

        if in_packages {
            if let Some(item) = trimmed.strip_prefix('-') {
                let item = item.trim().trim_matches('"').trim_matches('\'');
                if !item.is_empty() {
                    patterns.push(item.to_string());
                }
            }
        }
    }

    patterns
}

/// Check if a directory has pnpm workspace configuration
pub fn has_pnpm_workspace(dir: &Path) -> bool {
    dir.join("pnpm-workspace.yaml").exists()
}
