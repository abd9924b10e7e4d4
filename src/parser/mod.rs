//! Dependency specifier parsing
//!
//! Manifests are parsed up front into structured `Specifier` values so that
//! range rewriting never has to re-inspect raw strings.

mod npm;

pub use npm::NpmSpecifierParser;

use crate::domain::Specifier;

/// Parse a raw package.json specifier
pub fn parse_specifier(raw: &str) -> Specifier {
    NpmSpecifierParser.parse(raw)
}
