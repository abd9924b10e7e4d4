//! npm dependency specifier parser
//!
//! Handles specifier formats:
//! - Exact: `1.2.3`, `1.2.3-beta.1+build.5`
//! - Caret / Tilde: `^1.2.3`, `~1.2.3`
//! - Comparison: `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3`
//! - Wildcard: `*`, `1.x`, `1.2.*`
//! - Range: `>=1.0.0 <2.0.0`, `1.0.0 - 2.0.0`, `^1.0.0 || ^2.0.0`
//! - Workspace protocol: `workspace:*`, `workspace:^`, `workspace:~`, `workspace:^1.2.3`
//! - Relative paths: `file:../x`, `link:../x`, `../x`

use crate::domain::{Specifier, SpecifierKind};
use regex::Regex;
use std::sync::LazyLock;

/// npm specifier parser
pub struct NpmSpecifierParser;

const VERSION: &str = r"\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?(?:\+[0-9A-Za-z.-]+)?";

static OPERATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^(\^|~|>=|<=|>|<|=)?({})$", VERSION)).unwrap());
static COMPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?:\^|~|>=|<=|>|<|=)?(?:{}|\d+(?:\.\d+)?(?:\.[xX*])?|\d+\.[xX*](?:\.[xX*])?)$",
        VERSION
    ))
    .unwrap()
});
static HYPHEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^{}\s+-\s+{}$", VERSION, VERSION)).unwrap());
static WILDCARD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d+\.(?:\d+\.)?)?[xX*]$").unwrap());
static WORKSPACE_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^workspace:([\^~]?)({})$", VERSION)).unwrap());

impl NpmSpecifierParser {
    /// Parse a specifier string. Never fails: unrecognized input is `External`.
    pub fn parse(&self, raw: &str) -> Specifier {
        let trimmed = raw.trim();

        if let Some(rest) = trimmed.strip_prefix("workspace:") {
            return parse_workspace(raw, rest);
        }

        if is_relative_path(trimmed) {
            return Specifier::new(SpecifierKind::File, raw);
        }

        if let Some(caps) = OPERATOR_RE.captures(trimmed) {
            let operator = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let version = caps.get(2).map(|m| m.as_str()).unwrap_or(trimmed);
            let kind = match operator {
                "" | "=" => SpecifierKind::Exact,
                "^" => SpecifierKind::Caret,
                "~" => SpecifierKind::Tilde,
                ">=" => SpecifierKind::GreaterOrEqual,
                ">" => SpecifierKind::Greater,
                "<=" => SpecifierKind::LessOrEqual,
                _ => SpecifierKind::Less,
            };
            let spec = Specifier::new(kind, raw).with_version(version);
            return if operator.is_empty() {
                spec
            } else {
                spec.with_prefix(operator)
            };
        }

        if WILDCARD_RE.is_match(trimmed) {
            return Specifier::new(SpecifierKind::Wildcard, raw);
        }

        if is_compound_range(trimmed) {
            return Specifier::new(SpecifierKind::Range, raw);
        }

        Specifier::new(SpecifierKind::External, raw)
    }
}

fn parse_workspace(raw: &str, rest: &str) -> Specifier {
    if let Some(caps) = WORKSPACE_VERSION_RE.captures(raw.trim()) {
        let operator = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let version = caps.get(2).map(|m| m.as_str()).unwrap_or(rest);
        return Specifier::new(SpecifierKind::WorkspaceVersion, raw)
            .with_version(version)
            .with_prefix(format!("workspace:{}", operator));
    }
    // `workspace:*`, `workspace:^`, `workspace:~` and anything we cannot version
    Specifier::new(SpecifierKind::WorkspaceAlias, raw)
}

fn is_relative_path(s: &str) -> bool {
    ["file:", "link:", "portal:", "./", "../", "/", "~/"]
        .iter()
        .any(|p| s.starts_with(p))
}

fn is_compound_range(s: &str) -> bool {
    s.split("||").all(|alternative| {
        let alternative = alternative.trim();
        if alternative.is_empty() {
            return false;
        }
        HYPHEN_RE.is_match(alternative)
            || alternative
                .split_whitespace()
                .all(|token| COMPARATOR_RE.is_match(token))
    })
}
