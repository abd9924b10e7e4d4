//! Semantic version arithmetic
//!
//! Increment rules follow npm's `semver.inc`:
//! - `major`/`minor`/`patch` on a prerelease first release the pending version
//!   when it already sits on that boundary (`2.0.0-alpha.1` + major = `2.0.0`)
//! - `pre*` bumps seed the prerelease counter at `<id>.0`
//! - `prerelease` increments the trailing numeric identifier

use crate::error::{ConfigError, ValidationError};
use semver::{BuildMetadata, Prerelease, Version};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Default prerelease identifier when neither the caller nor the version supplies one
pub const DEFAULT_PREID: &str = "alpha";

/// A semver bump keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    Patch,
    Minor,
    Major,
    Prepatch,
    Preminor,
    Premajor,
    Prerelease,
}

impl ReleaseType {
    /// All keywords, in the order offered by interactive selection
    pub const ALL: [ReleaseType; 7] = [
        ReleaseType::Patch,
        ReleaseType::Minor,
        ReleaseType::Major,
        ReleaseType::Prepatch,
        ReleaseType::Preminor,
        ReleaseType::Premajor,
        ReleaseType::Prerelease,
    ];

    /// Returns true for keywords that produce a prerelease version
    pub fn is_prerelease(&self) -> bool {
        matches!(
            self,
            ReleaseType::Prepatch
                | ReleaseType::Preminor
                | ReleaseType::Premajor
                | ReleaseType::Prerelease
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseType::Patch => "patch",
            ReleaseType::Minor => "minor",
            ReleaseType::Major => "major",
            ReleaseType::Prepatch => "prepatch",
            ReleaseType::Preminor => "preminor",
            ReleaseType::Premajor => "premajor",
            ReleaseType::Prerelease => "prerelease",
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReleaseType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReleaseType::ALL
            .into_iter()
            .find(|rt| rt.as_str() == s)
            .ok_or_else(|| ConfigError::InvalidBump {
                value: s.to_string(),
            })
    }
}

/// Increments `current` by `release`.
///
/// `preid` names the prerelease identifier for `pre*` bumps; without one the
/// counter is a bare number (`1.0.1-0`).
pub fn increment(
    current: &Version,
    release: ReleaseType,
    preid: Option<&str>,
) -> Result<Version, ValidationError> {
    let mut next = Version::new(current.major, current.minor, current.patch);
    let on_prerelease = !current.pre.is_empty();

    match release {
        ReleaseType::Major => {
            if !(on_prerelease && current.minor == 0 && current.patch == 0) {
                bump_major(&mut next);
            }
        }
        ReleaseType::Minor => {
            if !(on_prerelease && current.patch == 0) {
                bump_minor(&mut next);
            }
        }
        ReleaseType::Patch => {
            if !on_prerelease {
                next.patch += 1;
            }
        }
        ReleaseType::Premajor => {
            bump_major(&mut next);
            next.pre = seed_prerelease(preid)?;
        }
        ReleaseType::Preminor => {
            bump_minor(&mut next);
            next.pre = seed_prerelease(preid)?;
        }
        ReleaseType::Prepatch => {
            next.patch += 1;
            next.pre = seed_prerelease(preid)?;
        }
        ReleaseType::Prerelease => {
            if on_prerelease {
                next.pre = next_prerelease(&current.pre, preid)?;
            } else {
                next.patch += 1;
                next.pre = seed_prerelease(preid)?;
            }
        }
    }

    Ok(next)
}

fn bump_major(v: &mut Version) {
    v.major += 1;
    v.minor = 0;
    v.patch = 0;
}

fn bump_minor(v: &mut Version) {
    v.minor += 1;
    v.patch = 0;
}

fn seed_prerelease(preid: Option<&str>) -> Result<Prerelease, ValidationError> {
    match preid {
        Some(id) => prerelease_from(&format!("{}.0", id), id),
        None => Ok(Prerelease::new("0").unwrap_or(Prerelease::EMPTY)),
    }
}

fn next_prerelease(current: &Prerelease, preid: Option<&str>) -> Result<Prerelease, ValidationError> {
    let mut parts: Vec<String> = current.as_str().split('.').map(str::to_string).collect();

    match parts
        .iter()
        .rposition(|part| part.parse::<u64>().is_ok())
    {
        Some(idx) => {
            let n: u64 = parts[idx].parse().unwrap_or(0);
            parts[idx] = (n + 1).to_string();
        }
        None => parts.push("0".to_string()),
    }

    if let Some(id) = preid {
        let keeps_id = parts.first().map(String::as_str) == Some(id)
            && parts.get(1).is_some_and(|p| p.parse::<u64>().is_ok());
        if !keeps_id {
            return seed_prerelease(Some(id));
        }
    }

    prerelease_from(&parts.join("."), current.as_str())
}

fn prerelease_from(text: &str, id: &str) -> Result<Prerelease, ValidationError> {
    Prerelease::new(text).map_err(|_| ValidationError::InvalidPrereleaseId { id: id.to_string() })
}

/// Strips the prerelease and build metadata, releasing the pending version
pub fn graduate(version: &Version) -> Version {
    Version::new(version.major, version.minor, version.patch)
}

/// Replaces the build metadata of `version`
pub fn apply_build_metadata(version: &Version, metadata: &str) -> Result<Version, ValidationError> {
    let build = BuildMetadata::new(metadata).map_err(|_| ValidationError::InvalidBuildMetadata {
        metadata: metadata.to_string(),
    })?;
    let mut next = version.clone();
    next.build = build;
    Ok(next)
}

/// The leading alphanumeric prerelease identifier, if any (`beta` for `1.0.0-beta.2`)
pub fn prerelease_id(version: &Version) -> Option<String> {
    version
        .pre
        .as_str()
        .split('.')
        .next()
        .filter(|id| !id.is_empty() && id.parse::<u64>().is_err())
        .map(str::to_string)
}

/// Precedence equality, ignoring build metadata
pub fn same_version(a: &Version, b: &Version) -> bool {
    a.cmp_precedence(b) == Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn inc(current: &str, release: ReleaseType, preid: Option<&str>) -> String {
        increment(&v(current), release, preid).unwrap().to_string()
    }

    #[test]
    fn test_release_type_from_str() {
        assert_eq!("major".parse::<ReleaseType>().unwrap(), ReleaseType::Major);
        assert_eq!(
            "prerelease".parse::<ReleaseType>().unwrap(),
            ReleaseType::Prerelease
        );
        assert!("huge".parse::<ReleaseType>().is_err());
    }

    #[test]
    fn test_release_type_is_prerelease() {
        assert!(ReleaseType::Premajor.is_prerelease());
        assert!(ReleaseType::Prerelease.is_prerelease());
        assert!(!ReleaseType::Major.is_prerelease());
    }

    #[test]
    fn test_increment_release_keywords() {
        assert_eq!(inc("1.0.0", ReleaseType::Patch, None), "1.0.1");
        assert_eq!(inc("2.5.0", ReleaseType::Patch, None), "2.5.1");
        assert_eq!(inc("1.2.3", ReleaseType::Minor, None), "1.3.0");
        assert_eq!(inc("1.2.3", ReleaseType::Major, None), "2.0.0");
    }

    #[test]
    fn test_increment_releases_pending_prerelease() {
        assert_eq!(inc("2.0.0-alpha.1", ReleaseType::Major, None), "2.0.0");
        assert_eq!(inc("1.1.0-alpha.1", ReleaseType::Major, None), "2.0.0");
        assert_eq!(inc("1.3.0-beta.0", ReleaseType::Minor, None), "1.3.0");
        assert_eq!(inc("1.3.1-beta.0", ReleaseType::Minor, None), "1.4.0");
        assert_eq!(inc("1.0.1-alpha.0", ReleaseType::Patch, None), "1.0.1");
    }

    #[test]
    fn test_increment_pre_keywords() {
        assert_eq!(
            inc("1.0.0", ReleaseType::Premajor, Some("alpha")),
            "2.0.0-alpha.0"
        );
        assert_eq!(
            inc("1.0.0", ReleaseType::Preminor, Some("beta")),
            "1.1.0-beta.0"
        );
        assert_eq!(
            inc("1.0.0", ReleaseType::Prepatch, Some("rc")),
            "1.0.1-rc.0"
        );
        assert_eq!(inc("1.0.0", ReleaseType::Prepatch, None), "1.0.1-0");
    }

    #[test]
    fn test_increment_prerelease() {
        assert_eq!(
            inc("1.0.0", ReleaseType::Prerelease, Some("alpha")),
            "1.0.1-alpha.0"
        );
        assert_eq!(
            inc("1.0.1-alpha.0", ReleaseType::Prerelease, Some("alpha")),
            "1.0.1-alpha.1"
        );
        assert_eq!(inc("1.0.1-alpha.0", ReleaseType::Prerelease, None), "1.0.1-alpha.1");
        assert_eq!(inc("1.0.1-alpha", ReleaseType::Prerelease, None), "1.0.1-alpha.0");
    }

    #[test]
    fn test_increment_prerelease_switches_identifier() {
        assert_eq!(
            inc("1.0.1-alpha.3", ReleaseType::Prerelease, Some("beta")),
            "1.0.1-beta.0"
        );
        assert_eq!(
            inc("1.0.1-alpha", ReleaseType::Prerelease, Some("alpha")),
            "1.0.1-alpha.0"
        );
    }

    #[test]
    fn test_increment_drops_build_metadata() {
        assert_eq!(inc("1.0.0+001", ReleaseType::Patch, None), "1.0.1");
    }

    #[test]
    fn test_increment_invalid_preid() {
        let err = increment(&v("1.0.0"), ReleaseType::Premajor, Some("bad id")).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidPrereleaseId { .. }));
    }

    #[test]
    fn test_graduate() {
        assert_eq!(graduate(&v("1.0.0-alpha.3")).to_string(), "1.0.0");
        assert_eq!(graduate(&v("2.1.0")).to_string(), "2.1.0");
    }

    #[test]
    fn test_apply_build_metadata() {
        let with_meta = apply_build_metadata(&v("1.0.1"), "001").unwrap();
        assert_eq!(with_meta.to_string(), "1.0.1+001");
        assert!(same_version(&with_meta, &v("1.0.1")));

        let err = apply_build_metadata(&v("1.0.1"), "not valid!").unwrap_err();
        assert!(err.to_string().contains("invalid build metadata"));
    }

    #[test]
    fn test_prerelease_id() {
        assert_eq!(prerelease_id(&v("1.0.0-beta.2")), Some("beta".to_string()));
        assert_eq!(prerelease_id(&v("1.0.0-0")), None);
        assert_eq!(prerelease_id(&v("1.0.0")), None);
    }
}
