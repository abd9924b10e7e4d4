//! Dependency specifier types for package.json ranges
//!
//! Handles the specifier styles found in workspace manifests:
//! - Plain semver: `1.2.3`, `^1.2.3`, `~1.2.3`, `>=1.2.3`, `1.x`, `>=1.0.0 <2.0.0`
//! - Workspace protocol: `workspace:*`, `workspace:^`, `workspace:~`, `workspace:^1.2.3`
//! - Relative paths: `file:../pkg`, `link:../pkg`, `../pkg`
//! - Anything else (git urls, dist-tags, aliases) is external

use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// The kind of dependency specifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecifierKind {
    /// Exact version (e.g., `1.2.3`)
    Exact,
    /// Caret range (e.g., `^1.2.3`)
    Caret,
    /// Tilde range (e.g., `~1.2.3`)
    Tilde,
    /// Greater than or equal (e.g., `>=1.2.3`)
    GreaterOrEqual,
    /// Greater than (e.g., `>1.2.3`)
    Greater,
    /// Less than or equal (e.g., `<=1.2.3`)
    LessOrEqual,
    /// Less than (e.g., `<1.2.3`)
    Less,
    /// Wildcard (e.g., `1.2.x`, `*`)
    Wildcard,
    /// Compound range (e.g., `>=1.0.0 <2.0.0`, `1.0.0 - 2.0.0`, `^1.0.0 || ^2.0.0`)
    Range,
    /// Workspace protocol without a version (`workspace:*`, `workspace:^`, `workspace:~`)
    WorkspaceAlias,
    /// Workspace protocol with a pinned version (`workspace:^1.2.3`)
    WorkspaceVersion,
    /// Relative path (`file:../pkg`, `link:../pkg`)
    File,
    /// Not a version we understand (git url, dist-tag, npm alias)
    External,
}

impl SpecifierKind {
    /// Returns true for plain semver specifiers (no protocol)
    pub fn is_semver(&self) -> bool {
        matches!(
            self,
            SpecifierKind::Exact
                | SpecifierKind::Caret
                | SpecifierKind::Tilde
                | SpecifierKind::GreaterOrEqual
                | SpecifierKind::Greater
                | SpecifierKind::LessOrEqual
                | SpecifierKind::Less
                | SpecifierKind::Wildcard
                | SpecifierKind::Range
        )
    }

    /// Returns true for specifiers that carry an operator followed by a single version
    pub fn is_operator_version(&self) -> bool {
        matches!(
            self,
            SpecifierKind::Exact | SpecifierKind::Caret | SpecifierKind::Tilde
        )
    }

    /// Returns true for specifiers that are never rewritten
    pub fn is_verbatim(&self) -> bool {
        matches!(
            self,
            SpecifierKind::WorkspaceAlias | SpecifierKind::File | SpecifierKind::External
        )
    }
}

/// A dependency specifier with its original string representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specifier {
    /// The kind of specifier
    pub kind: SpecifierKind,
    /// The raw specifier as it appears in the manifest
    pub raw: String,
    /// The version number, for kinds that carry one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Text preserved in front of the version on rewrite (e.g., `^`, `workspace:~`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl Specifier {
    /// Creates a new Specifier without version information
    pub fn new(kind: SpecifierKind, raw: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
            version: None,
            prefix: None,
        }
    }

    /// Sets the version carried by this specifier
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the prefix preserved on rewrite
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Formats a new version while preserving the original prefix
    pub fn format_updated(&self, new_version: &str) -> String {
        let mut result = String::new();
        if let Some(ref prefix) = self.prefix {
            result.push_str(prefix);
        }
        result.push_str(new_version);
        result
    }

    /// The range portion of the specifier, with any workspace protocol stripped
    pub fn range(&self) -> &str {
        self.raw.strip_prefix("workspace:").unwrap_or(&self.raw)
    }

    /// Returns true if `version` satisfies this specifier.
    ///
    /// Only semver and pinned workspace specifiers can be satisfied;
    /// everything else returns false.
    pub fn satisfied_by(&self, version: &Version) -> bool {
        match self.kind {
            SpecifierKind::Exact => self
                .version
                .as_deref()
                .and_then(|v| Version::parse(v).ok())
                .is_some_and(|pinned| pinned.cmp_precedence(version) == Ordering::Equal),
            SpecifierKind::WorkspaceVersion => {
                let range = self.range();
                if range.starts_with(['^', '~']) {
                    req_matches(range, version)
                } else {
                    Specifier::new(SpecifierKind::Exact, range)
                        .with_version(range)
                        .satisfied_by(version)
                }
            }
            kind if kind.is_semver() => self
                .raw
                .split("||")
                .any(|alternative| req_matches(&normalize_range(alternative), version)),
            _ => false,
        }
    }
}

/// Rewrites npm range syntax into the comma-separated form `semver::VersionReq` parses
fn normalize_range(range: &str) -> String {
    let tokens: Vec<&str> = range.split_whitespace().collect();

    if tokens.len() == 3 && tokens[1] == "-" {
        return format!(">={}, <={}", tokens[0], tokens[2]);
    }

    tokens
        .iter()
        .map(|token| {
            let wildcard = token
                .split('.')
                .map(|part| match part {
                    "x" | "X" => "*",
                    other => other,
                })
                .collect::<Vec<_>>()
                .join(".");
            if wildcard.starts_with(|c: char| c.is_ascii_digit()) && !wildcard.contains('*') {
                // A bare version inside a compound range is an exact comparator
                format!("={}", wildcard)
            } else {
                wildcard
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn req_matches(range: &str, version: &Version) -> bool {
    VersionReq::parse(range.trim()).is_ok_and(|req| req.matches(version))
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
