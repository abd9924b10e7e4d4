//! Version strategies and the pre-1.0 bump policy

use crate::collaborator::{PremajorVersionBump, RecommendOptions, VersionPrompt, VersionRecommender};
use crate::domain::{increment, prerelease_id, BumpKind, ReleaseType};
use crate::error::ValidationError;
use semver::Version;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// How new versions are chosen, selected once per run
#[derive(Clone)]
pub enum VersionStrategy {
    /// Apply a semver keyword
    Bump(ReleaseType),
    /// Use a literal version
    Explicit(Version),
    /// Ask the prompt collaborator
    Prompt(Arc<dyn VersionPrompt>),
    /// Ask the conventional-commit recommender
    Recommended {
        recommender: Arc<dyn VersionRecommender>,
        options: RecommendOptions,
        premajor: PremajorVersionBump,
    },
}

impl VersionStrategy {
    /// The bump kind recorded on the assignment
    pub fn kind(&self) -> BumpKind {
        match self {
            VersionStrategy::Bump(rt) => BumpKind::Release(*rt),
            VersionStrategy::Explicit(_) => BumpKind::Explicit,
            VersionStrategy::Prompt(_) => BumpKind::Prompted,
            VersionStrategy::Recommended { .. } => BumpKind::Recommended,
        }
    }
}

impl fmt::Debug for VersionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionStrategy::Bump(rt) => f.debug_tuple("Bump").field(rt).finish(),
            VersionStrategy::Explicit(v) => f.debug_tuple("Explicit").field(v).finish(),
            VersionStrategy::Prompt(_) => f.write_str("Prompt"),
            VersionStrategy::Recommended { options, premajor, .. } => f
                .debug_struct("Recommended")
                .field("options", options)
                .field("premajor", premajor)
                .finish(),
        }
    }
}

/// Holds a pre-1.0 recommendation to the bump the policy allows.
///
/// `force-patch` caps any recommendation above the next patch at the next
/// patch; `default` keeps pre-1.0 packages below 1.0.0 by capping at the next
/// minor. Versions at 1.0.0 or above are returned unchanged.
pub fn apply_premajor_policy(
    current: &Version,
    recommended: Version,
    policy: PremajorVersionBump,
) -> Result<Version, ValidationError> {
    if current.major != 0 {
        return Ok(recommended);
    }

    let (release, prerelease) = match policy {
        PremajorVersionBump::ForcePatch => (ReleaseType::Patch, ReleaseType::Prepatch),
        PremajorVersionBump::Default => (ReleaseType::Minor, ReleaseType::Preminor),
    };

    let ceiling = increment(current, release, None)?;
    let exceeds = match policy {
        PremajorVersionBump::ForcePatch => {
            recommended.cmp_precedence(&ceiling) == Ordering::Greater
        }
        PremajorVersionBump::Default => recommended.major > 0,
    };
    if !exceeds {
        return Ok(recommended);
    }

    let mut clamped = if recommended.pre.is_empty() {
        ceiling
    } else {
        let id = prerelease_id(&recommended);
        increment(current, prerelease, id.as_deref())?
    };
    clamped.build = recommended.build;
    Ok(clamped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn clamp(current: &str, recommended: &str, policy: PremajorVersionBump) -> String {
        apply_premajor_policy(&v(current), v(recommended), policy)
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_force_patch_clamps_minor_recommendation() {
        assert_eq!(clamp("0.1.0", "0.2.0", PremajorVersionBump::ForcePatch), "0.1.1");
        assert_eq!(clamp("0.1.0", "1.0.0", PremajorVersionBump::ForcePatch), "0.1.1");
    }

    #[test]
    fn test_force_patch_keeps_patch_recommendation() {
        assert_eq!(clamp("0.1.0", "0.1.1", PremajorVersionBump::ForcePatch), "0.1.1");
    }

    #[test]
    fn test_force_patch_keeps_prerelease_and_build() {
        assert_eq!(
            clamp("0.1.0", "0.2.0-beta.0+001", PremajorVersionBump::ForcePatch),
            "0.1.1-beta.0+001"
        );
    }

    #[test]
    fn test_default_caps_breaking_change_at_minor() {
        assert_eq!(clamp("0.1.0", "1.0.0", PremajorVersionBump::Default), "0.2.0");
        assert_eq!(clamp("0.1.0", "0.2.0", PremajorVersionBump::Default), "0.2.0");
    }

    #[test]
    fn test_policy_ignored_from_1_0_0() {
        assert_eq!(clamp("1.2.0", "2.0.0", PremajorVersionBump::ForcePatch), "2.0.0");
        assert_eq!(clamp("1.2.0", "2.0.0", PremajorVersionBump::Default), "2.0.0");
    }

    #[test]
    fn test_strategy_kind() {
        assert_eq!(
            VersionStrategy::Bump(ReleaseType::Major).kind(),
            BumpKind::Release(ReleaseType::Major)
        );
        assert_eq!(
            VersionStrategy::Explicit(v("3.0.0")).kind(),
            BumpKind::Explicit
        );
    }
}
