//! Version resolution
//!
//! This module provides:
//! - Version strategies (keyword bump, literal version, prompt, recommendation)
//! - The pre-1.0 bump policy applied to recommendations
//! - The version resolver that assigns a new version to every package in an
//!   update set, in fixed (lockstep) or independent mode

mod strategy;

pub use strategy::{apply_premajor_policy, VersionStrategy};

use crate::collaborator::{
    PremajorVersionBump, RecommendOptions, VersionCandidate, VersionChoice, VersionPrompt,
    VersionRecommender,
};
use crate::domain::{
    apply_build_metadata, graduate, increment, prerelease_id, Modifiers, ReleaseType,
    VersionAssignment, VersionChange, VersionMode, DEFAULT_PREID,
};
use crate::error::{PipelineError, ValidationError};
use crate::graph::ProjectGraph;
use crate::update::{PackageSelector, UpdateSet};
use semver::{BuildMetadata, Prerelease, Version};
use std::cmp::Ordering;
use tracing::debug;

/// Options of version resolution
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub mode: VersionMode,
    /// Current lockstep version of a fixed-mode project
    pub lockstep_version: Option<Version>,
    /// Explicit prerelease identifier
    pub preid: Option<String>,
    pub build_metadata: Option<String>,
    /// Packages released as prereleases by recommendation
    pub prerelease: PackageSelector,
    /// Packages whose prerelease is graduated
    pub graduate: PackageSelector,
}

impl ResolveOptions {
    pub fn new(mode: VersionMode) -> Self {
        Self {
            mode,
            lockstep_version: None,
            preid: None,
            build_metadata: None,
            prerelease: PackageSelector::None,
            graduate: PackageSelector::None,
        }
    }

    /// Set the current lockstep version
    pub fn with_lockstep_version(mut self, version: Option<Version>) -> Self {
        self.lockstep_version = version;
        self
    }

    /// Set the prerelease identifier
    pub fn with_preid(mut self, preid: Option<String>) -> Self {
        self.preid = preid;
        self
    }

    /// Set the build metadata
    pub fn with_build_metadata(mut self, metadata: Option<String>) -> Self {
        self.build_metadata = metadata;
        self
    }

    /// Set the prerelease selector
    pub fn with_prerelease(mut self, selector: PackageSelector) -> Self {
        self.prerelease = selector;
        self
    }

    /// Set the graduate selector
    pub fn with_graduate(mut self, selector: PackageSelector) -> Self {
        self.graduate = selector;
        self
    }
}

/// Assigns new versions to an update set
#[derive(Debug, Clone)]
pub struct VersionResolver {
    strategy: VersionStrategy,
    options: ResolveOptions,
}

impl VersionResolver {
    /// Create a new VersionResolver
    pub fn new(strategy: VersionStrategy, options: ResolveOptions) -> Self {
        Self { strategy, options }
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    pub fn strategy(&self) -> &VersionStrategy {
        &self.strategy
    }

    /// Checks modifiers and current versions without computing anything.
    ///
    /// Returns the versioned packages with their current versions, plus the
    /// unversioned private packages that are skipped.
    pub fn validate(
        &self,
        graph: &ProjectGraph,
        updates: &UpdateSet,
    ) -> Result<(Vec<(String, Version)>, Vec<String>), ValidationError> {
        let prerelease_bump =
            matches!(self.strategy, VersionStrategy::Bump(rt) if rt.is_prerelease());
        if self.options.graduate.is_active()
            && (self.options.prerelease.is_active() || prerelease_bump)
        {
            return Err(ValidationError::ConflictingModifiers);
        }

        if let Some(id) = &self.options.preid {
            if id.is_empty() || Prerelease::new(id).is_err() {
                return Err(ValidationError::InvalidPrereleaseId { id: id.clone() });
            }
        }

        if let Some(metadata) = &self.options.build_metadata {
            if BuildMetadata::new(metadata).is_err() {
                return Err(ValidationError::InvalidBuildMetadata {
                    metadata: metadata.clone(),
                });
            }
        }

        let mut versioned = Vec::new();
        let mut skipped = Vec::new();
        for name in updates.iter() {
            let Some(package) = graph.package(name) else {
                continue;
            };
            match package.semver()? {
                Some(version) => versioned.push((name.to_string(), version)),
                None if package.private => {
                    debug!(package = name, "skipping unversioned private package");
                    skipped.push(name.to_string());
                }
                None => return Err(ValidationError::missing_version(name)),
            }
        }

        Ok((versioned, skipped))
    }

    /// Resolve new versions for every package of `updates`
    pub async fn resolve(
        &self,
        graph: &ProjectGraph,
        updates: &UpdateSet,
    ) -> Result<VersionAssignment, PipelineError> {
        let (versioned, skipped) = self.validate(graph, updates)?;

        let (versions, lockstep_version) = match self.options.mode {
            VersionMode::Fixed => self.resolve_fixed(graph, &versioned).await?,
            VersionMode::Independent => (self.resolve_independent(graph, &versioned).await?, None),
        };

        Ok(VersionAssignment {
            mode: self.options.mode,
            kind: self.strategy.kind(),
            modifiers: Modifiers {
                prerelease_id: self.options.preid.clone(),
                build_metadata: self.options.build_metadata.clone(),
                graduate: self.options.graduate.is_active(),
            },
            lockstep_version,
            versions,
            skipped,
        })
    }

    async fn resolve_fixed(
        &self,
        graph: &ProjectGraph,
        versioned: &[(String, Version)],
    ) -> Result<(Vec<VersionChange>, Option<Version>), PipelineError> {
        let base = match &self.options.lockstep_version {
            Some(version) => version.clone(),
            None => match versioned
                .iter()
                .map(|(_, v)| v)
                .max_by(|a, b| a.cmp_precedence(b))
            {
                Some(highest) => highest.clone(),
                None => return Ok((Vec::new(), None)),
            },
        };

        let next = match &self.strategy {
            VersionStrategy::Bump(rt) => increment(&base, *rt, Some(self.preid_for(&base).as_str()))?,
            VersionStrategy::Explicit(version) => version.clone(),
            VersionStrategy::Prompt(prompt) => self.choose(prompt.as_ref(), None, &base).await?,
            VersionStrategy::Recommended {
                recommender,
                options,
                premajor,
            } => {
                self.recommend_fixed(graph, versioned, &base, recommender.as_ref(), options, *premajor)
                    .await?
            }
        };
        let next = self.finish(next, self.options.graduate.is_active())?;

        let versions = versioned
            .iter()
            .map(|(name, old)| VersionChange {
                name: name.clone(),
                old_version: Some(old.clone()),
                new_version: next.clone(),
            })
            .collect();

        Ok((versions, Some(next)))
    }

    async fn recommend_fixed(
        &self,
        graph: &ProjectGraph,
        versioned: &[(String, Version)],
        base: &Version,
        recommender: &dyn VersionRecommender,
        options: &RecommendOptions,
        premajor: PremajorVersionBump,
    ) -> Result<Version, PipelineError> {
        let mut highest: Option<Version> = None;

        for (name, _) in versioned {
            let Some(package) = graph.package(name) else {
                continue;
            };
            // Recommend from the shared version line, not the package's own history
            let mut rebased = package.clone();
            rebased.set_version(base);

            let options = self.recommend_options(name, base, options);
            let raw = recommender
                .recommend_version(&rebased, VersionMode::Fixed, &options, premajor)
                .await?;
            let recommended = parse_recommendation(name, &raw)?;
            debug!(package = %name, recommended = %recommended, "fixed-mode recommendation");

            let is_higher = match &highest {
                Some(h) => recommended.cmp_precedence(h) == Ordering::Greater,
                None => true,
            };
            if is_higher {
                highest = Some(recommended);
            }
        }

        let next = match highest {
            Some(version) if version.cmp_precedence(base) == Ordering::Greater => version,
            _ => increment(base, ReleaseType::Patch, None)?,
        };

        Ok(apply_premajor_policy(base, next, premajor)?)
    }

    async fn resolve_independent(
        &self,
        graph: &ProjectGraph,
        versioned: &[(String, Version)],
    ) -> Result<Vec<VersionChange>, PipelineError> {
        let mut versions = Vec::with_capacity(versioned.len());

        for (name, current) in versioned {
            let next = match &self.strategy {
                VersionStrategy::Bump(rt) => {
                    increment(current, *rt, Some(self.preid_for(current).as_str()))?
                }
                VersionStrategy::Explicit(version) => version.clone(),
                VersionStrategy::Prompt(prompt) => {
                    self.choose(prompt.as_ref(), Some(name), current).await?
                }
                VersionStrategy::Recommended {
                    recommender,
                    options,
                    premajor,
                } => {
                    let Some(package) = graph.package(name) else {
                        continue;
                    };
                    let options = self.recommend_options(name, current, options);
                    let raw = recommender
                        .recommend_version(package, VersionMode::Independent, &options, *premajor)
                        .await?;
                    apply_premajor_policy(current, parse_recommendation(name, &raw)?, *premajor)?
                }
            };

            let next = self.finish(next, self.options.graduate.matches(name))?;
            versions.push(VersionChange {
                name: name.clone(),
                old_version: Some(current.clone()),
                new_version: next,
            });
        }

        Ok(versions)
    }

    async fn choose(
        &self,
        prompt: &dyn VersionPrompt,
        package: Option<&str>,
        current: &Version,
    ) -> Result<Version, PipelineError> {
        let preid = self.preid_for(current);
        let candidates = ReleaseType::ALL
            .iter()
            .map(|&release| {
                increment(current, release, Some(preid.as_str()))
                    .map(|version| VersionCandidate { release, version })
            })
            .collect::<Result<Vec<_>, _>>()?;

        match prompt.select_version(package, current, &candidates).await? {
            VersionChoice::Bump(rt) => Ok(increment(current, rt, Some(preid.as_str()))?),
            VersionChoice::Literal(version) => Ok(version),
        }
    }

    fn recommend_options(&self, name: &str, current: &Version, base: &RecommendOptions) -> RecommendOptions {
        let mut options = base.clone();
        options.prerelease_id = self
            .options
            .prerelease
            .matches(name)
            .then(|| self.preid_for(current));
        options.build_metadata = self.options.build_metadata.clone();
        options
    }

    /// Explicit id, else the id already on the version, else the default
    fn preid_for(&self, current: &Version) -> String {
        self.options
            .preid
            .clone()
            .or_else(|| prerelease_id(current))
            .unwrap_or_else(|| DEFAULT_PREID.to_string())
    }

    fn finish(&self, version: Version, graduating: bool) -> Result<Version, ValidationError> {
        let version = if graduating && !version.pre.is_empty() {
            graduate(&version)
        } else {
            version
        };
        match &self.options.build_metadata {
            Some(metadata) => apply_build_metadata(&version, metadata),
            None => Ok(version),
        }
    }
}

fn parse_recommendation(package: &str, raw: &str) -> Result<Version, ValidationError> {
    Version::parse(raw.trim())
        .map_err(|e| ValidationError::invalid_version(package, raw, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::{PremajorVersionBump, RecommendOptions};
    use crate::domain::{BumpKind, DependencyType, Package};
    use crate::error::CollaboratorError;
    use crate::update::{CollectOptions, UpdateCollector};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    struct MockRecommender {
        results: HashMap<String, String>,
        calls: Mutex<Vec<(String, String, VersionMode, Option<String>)>>,
    }

    impl MockRecommender {
        fn new(results: &[(&str, &str)]) -> Arc<Self> {
            Arc::new(Self {
                results: results
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl VersionRecommender for MockRecommender {
        async fn recommend_version(
            &self,
            package: &Package,
            mode: VersionMode,
            options: &RecommendOptions,
            _premajor: PremajorVersionBump,
        ) -> Result<String, CollaboratorError> {
            self.calls.lock().unwrap().push((
                package.name.clone(),
                package.version.clone().unwrap_or_default(),
                mode,
                options.prerelease_id.clone(),
            ));
            self.results
                .get(&package.name)
                .cloned()
                .ok_or_else(|| CollaboratorError::recommendation(&package.name, "no result"))
        }
    }

    struct MockPrompt {
        choices: Mutex<Vec<VersionChoice>>,
        seen: Mutex<Vec<(Option<String>, usize)>>,
    }

    #[async_trait]
    impl VersionPrompt for MockPrompt {
        async fn select_version(
            &self,
            package: Option<&str>,
            _current: &Version,
            candidates: &[VersionCandidate],
        ) -> Result<VersionChoice, CollaboratorError> {
            self.seen
                .lock()
                .unwrap()
                .push((package.map(str::to_string), candidates.len()));
            self.choices
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| CollaboratorError::prompt("no more answers"))
        }

        async fn confirm(&self, _message: &str) -> Result<bool, CollaboratorError> {
            Ok(true)
        }
    }

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn graph(packages: Vec<Package>) -> ProjectGraph {
        ProjectGraph::build(packages).unwrap()
    }

    fn all(graph: &ProjectGraph) -> UpdateSet {
        UpdateCollector::new(CollectOptions::new().with_force_publish(PackageSelector::All))
            .collect(graph, [])
    }

    fn recommended(recommender: Arc<MockRecommender>, premajor: PremajorVersionBump) -> VersionStrategy {
        VersionStrategy::Recommended {
            recommender,
            options: RecommendOptions::new("/repo"),
            premajor,
        }
    }

    fn new_versions(assignment: &VersionAssignment) -> Vec<String> {
        assignment
            .versions
            .iter()
            .map(|c| format!("{}@{}", c.name, c.new_version))
            .collect()
    }

    #[tokio::test]
    async fn test_independent_bump_uses_each_current_version() {
        let g = graph(vec![
            Package::new("a", Some("1.0.0")),
            Package::new("b", Some("2.5.0")),
        ]);
        let resolver = VersionResolver::new(
            VersionStrategy::Bump(ReleaseType::Patch),
            ResolveOptions::new(VersionMode::Independent),
        );

        let assignment = resolver.resolve(&g, &all(&g)).await.unwrap();
        assert_eq!(new_versions(&assignment), vec!["a@1.0.1", "b@2.5.1"]);
        assert_eq!(assignment.kind, BumpKind::Release(ReleaseType::Patch));
        assert!(assignment.lockstep_version.is_none());
    }

    #[tokio::test]
    async fn test_fixed_bump_is_identical_for_all() {
        let g = graph(vec![
            Package::new("a", Some("1.0.0")),
            Package::new("b", Some("1.0.0")),
        ]);
        let resolver = VersionResolver::new(
            VersionStrategy::Bump(ReleaseType::Major),
            ResolveOptions::new(VersionMode::Fixed).with_lockstep_version(Some(v("1.0.0"))),
        );

        let assignment = resolver.resolve(&g, &all(&g)).await.unwrap();
        assert_eq!(new_versions(&assignment), vec!["a@2.0.0", "b@2.0.0"]);
        assert_eq!(assignment.lockstep_version, Some(v("2.0.0")));
    }

    #[tokio::test]
    async fn test_fixed_without_lockstep_uses_highest_version() {
        let g = graph(vec![
            Package::new("a", Some("1.0.0")),
            Package::new("b", Some("1.3.0")),
        ]);
        let resolver = VersionResolver::new(
            VersionStrategy::Bump(ReleaseType::Minor),
            ResolveOptions::new(VersionMode::Fixed),
        );

        let assignment = resolver.resolve(&g, &all(&g)).await.unwrap();
        assert_eq!(new_versions(&assignment), vec!["a@1.4.0", "b@1.4.0"]);
    }

    #[tokio::test]
    async fn test_prerelease_bump_uses_preid_resolution() {
        let g = graph(vec![
            Package::new("a", Some("1.0.0")),
            Package::new("b", Some("1.0.1-beta.0")),
        ]);

        let resolver = VersionResolver::new(
            VersionStrategy::Bump(ReleaseType::Prerelease),
            ResolveOptions::new(VersionMode::Independent),
        );
        let assignment = resolver.resolve(&g, &all(&g)).await.unwrap();
        assert_eq!(
            new_versions(&assignment),
            vec!["a@1.0.1-alpha.0", "b@1.0.1-beta.1"]
        );

        let resolver = VersionResolver::new(
            VersionStrategy::Bump(ReleaseType::Prerelease),
            ResolveOptions::new(VersionMode::Independent).with_preid(Some("rc".to_string())),
        );
        let assignment = resolver.resolve(&g, &all(&g)).await.unwrap();
        assert_eq!(new_versions(&assignment), vec!["a@1.0.1-rc.0", "b@1.0.1-rc.0"]);
    }

    #[tokio::test]
    async fn test_explicit_version_with_build_metadata() {
        let g = graph(vec![Package::new("a", Some("1.0.0"))]);
        let resolver = VersionResolver::new(
            VersionStrategy::Explicit(v("3.0.0")),
            ResolveOptions::new(VersionMode::Independent)
                .with_build_metadata(Some("001".to_string())),
        );

        let assignment = resolver.resolve(&g, &all(&g)).await.unwrap();
        assert_eq!(new_versions(&assignment), vec!["a@3.0.0+001"]);
        assert_eq!(assignment.modifiers.build_metadata.as_deref(), Some("001"));
    }

    #[tokio::test]
    async fn test_missing_version_on_public_package_is_fatal() {
        let g = graph(vec![
            Package::new("package-1", Some("1.0.0")),
            Package::new("package-3", None),
        ]);
        let resolver = VersionResolver::new(
            VersionStrategy::Bump(ReleaseType::Patch),
            ResolveOptions::new(VersionMode::Independent),
        );

        let err = resolver.resolve(&g, &all(&g)).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "A version field is required in package-3's package.json file."
        );
    }

    #[tokio::test]
    async fn test_missing_version_on_private_package_is_skipped() {
        let g = graph(vec![
            Package::new("a", Some("1.0.0")),
            Package::new("tools", None).with_private(true),
        ]);
        let resolver = VersionResolver::new(
            VersionStrategy::Bump(ReleaseType::Patch),
            ResolveOptions::new(VersionMode::Fixed),
        );

        let assignment = resolver.resolve(&g, &all(&g)).await.unwrap();
        assert_eq!(new_versions(&assignment), vec!["a@1.0.1"]);
        assert_eq!(assignment.skipped, vec!["tools"]);
    }

    #[tokio::test]
    async fn test_prerelease_with_graduate_is_rejected() {
        let g = graph(vec![Package::new("a", Some("1.0.0"))]);
        let resolver = VersionResolver::new(
            VersionStrategy::Bump(ReleaseType::Patch),
            ResolveOptions::new(VersionMode::Independent)
                .with_prerelease(PackageSelector::All)
                .with_graduate(PackageSelector::All),
        );

        let err = resolver.resolve(&g, &all(&g)).await.unwrap_err();
        assert!(err.to_string().contains("cannot be combined"));

        let resolver = VersionResolver::new(
            VersionStrategy::Bump(ReleaseType::Premajor),
            ResolveOptions::new(VersionMode::Independent).with_graduate(PackageSelector::All),
        );
        assert!(resolver.resolve(&g, &all(&g)).await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_modifiers_rejected() {
        let g = graph(vec![Package::new("a", Some("1.0.0"))]);
        let bad_preid = VersionResolver::new(
            VersionStrategy::Bump(ReleaseType::Prerelease),
            ResolveOptions::new(VersionMode::Independent).with_preid(Some("no way".to_string())),
        );
        assert!(matches!(
            bad_preid.validate(&g, &all(&g)),
            Err(ValidationError::InvalidPrereleaseId { .. })
        ));

        let bad_meta = VersionResolver::new(
            VersionStrategy::Bump(ReleaseType::Patch),
            ResolveOptions::new(VersionMode::Independent)
                .with_build_metadata(Some("a b".to_string())),
        );
        assert!(matches!(
            bad_meta.validate(&g, &all(&g)),
            Err(ValidationError::InvalidBuildMetadata { .. })
        ));
    }

    #[tokio::test]
    async fn test_graduate_strips_prerelease_for_selected_packages() {
        let g = graph(vec![
            Package::new("a", Some("1.0.0-alpha.2")),
            Package::new("b", Some("2.0.0-beta.0")),
        ]);
        let resolver = VersionResolver::new(
            VersionStrategy::Explicit(v("3.0.0-rc.0")),
            ResolveOptions::new(VersionMode::Independent)
                .with_graduate(PackageSelector::parse("a")),
        );

        let assignment = resolver.resolve(&g, &all(&g)).await.unwrap();
        assert_eq!(new_versions(&assignment), vec!["a@3.0.0", "b@3.0.0-rc.0"]);
        assert!(assignment.modifiers.graduate);
    }

    #[tokio::test]
    async fn test_prompt_independent_asks_per_package() {
        let g = graph(vec![
            Package::new("a", Some("1.0.0")),
            Package::new("b", Some("2.0.0")),
        ]);
        let prompt = Arc::new(MockPrompt {
            // answers are popped from the end
            choices: Mutex::new(vec![
                VersionChoice::Literal(v("5.0.0")),
                VersionChoice::Bump(ReleaseType::Minor),
            ]),
            seen: Mutex::new(Vec::new()),
        });
        let resolver = VersionResolver::new(
            VersionStrategy::Prompt(prompt.clone()),
            ResolveOptions::new(VersionMode::Independent),
        );

        let assignment = resolver.resolve(&g, &all(&g)).await.unwrap();
        assert_eq!(new_versions(&assignment), vec!["a@1.1.0", "b@5.0.0"]);
        assert_eq!(assignment.kind, BumpKind::Prompted);

        let seen = prompt.seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![(Some("a".to_string()), 7), (Some("b".to_string()), 7)]
        );
    }

    #[tokio::test]
    async fn test_prompt_fixed_asks_once() {
        let g = graph(vec![
            Package::new("a", Some("1.0.0")),
            Package::new("b", Some("1.0.0")),
        ]);
        let prompt = Arc::new(MockPrompt {
            choices: Mutex::new(vec![VersionChoice::Bump(ReleaseType::Patch)]),
            seen: Mutex::new(Vec::new()),
        });
        let resolver = VersionResolver::new(
            VersionStrategy::Prompt(prompt.clone()),
            ResolveOptions::new(VersionMode::Fixed).with_lockstep_version(Some(v("1.0.0"))),
        );

        let assignment = resolver.resolve(&g, &all(&g)).await.unwrap();
        assert_eq!(new_versions(&assignment), vec!["a@1.0.1", "b@1.0.1"]);
        assert_eq!(prompt.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_recommended_independent() {
        let g = graph(vec![
            Package::new("a", Some("1.0.0")),
            Package::new("b", Some("2.0.0")),
        ]);
        let recommender = MockRecommender::new(&[("a", "1.1.0"), ("b", "3.0.0")]);
        let resolver = VersionResolver::new(
            recommended(recommender.clone(), PremajorVersionBump::Default),
            ResolveOptions::new(VersionMode::Independent),
        );

        let assignment = resolver.resolve(&g, &all(&g)).await.unwrap();
        assert_eq!(new_versions(&assignment), vec!["a@1.1.0", "b@3.0.0"]);
        assert_eq!(assignment.kind, BumpKind::Recommended);

        let calls = recommender.calls.lock().unwrap();
        assert!(calls.iter().all(|c| c.2 == VersionMode::Independent));
    }

    #[tokio::test]
    async fn test_recommended_force_patch_pre_1_0() {
        let g = graph(vec![Package::new("a", Some("0.1.0"))]);
        let recommender = MockRecommender::new(&[("a", "0.2.0")]);
        let resolver = VersionResolver::new(
            recommended(recommender, PremajorVersionBump::ForcePatch),
            ResolveOptions::new(VersionMode::Independent),
        );

        let assignment = resolver.resolve(&g, &all(&g)).await.unwrap();
        assert_eq!(new_versions(&assignment), vec!["a@0.1.1"]);
    }

    #[tokio::test]
    async fn test_recommended_fixed_takes_highest_from_rebased_versions() {
        let g = graph(vec![
            Package::new("a", Some("1.0.0")),
            Package::new("b", Some("1.0.0"))
                .with_dependency(DependencyType::Dependencies, "a", "^1.0.0"),
        ]);
        let recommender = MockRecommender::new(&[("a", "1.0.1"), ("b", "1.1.0")]);
        let resolver = VersionResolver::new(
            recommended(recommender.clone(), PremajorVersionBump::Default),
            ResolveOptions::new(VersionMode::Fixed).with_lockstep_version(Some(v("1.0.0"))),
        );

        let assignment = resolver.resolve(&g, &all(&g)).await.unwrap();
        assert_eq!(new_versions(&assignment), vec!["a@1.1.0", "b@1.1.0"]);

        let calls = recommender.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|c| c.1 == "1.0.0" && c.2 == VersionMode::Fixed));
    }

    #[tokio::test]
    async fn test_recommended_fixed_never_repeats_released_version() {
        let g = graph(vec![Package::new("a", Some("1.0.0"))]);
        let recommender = MockRecommender::new(&[("a", "1.0.0")]);
        let resolver = VersionResolver::new(
            recommended(recommender, PremajorVersionBump::Default),
            ResolveOptions::new(VersionMode::Fixed).with_lockstep_version(Some(v("1.0.0"))),
        );

        let assignment = resolver.resolve(&g, &all(&g)).await.unwrap();
        assert_eq!(assignment.lockstep_version, Some(v("1.0.1")));
    }

    #[tokio::test]
    async fn test_recommended_prerelease_selector_passes_preid() {
        let g = graph(vec![
            Package::new("a", Some("1.0.0")),
            Package::new("b", Some("1.0.0")),
        ]);
        let recommender = MockRecommender::new(&[("a", "1.0.1-beta.0"), ("b", "1.0.1")]);
        let resolver = VersionResolver::new(
            recommended(recommender.clone(), PremajorVersionBump::Default),
            ResolveOptions::new(VersionMode::Independent)
                .with_preid(Some("beta".to_string()))
                .with_prerelease(PackageSelector::parse("a")),
        );

        resolver.resolve(&g, &all(&g)).await.unwrap();
        let calls = recommender.calls.lock().unwrap();
        assert_eq!(calls[0].3.as_deref(), Some("beta"));
        assert_eq!(calls[1].3, None);
    }

    #[tokio::test]
    async fn test_recommender_failure_propagates() {
        let g = graph(vec![Package::new("a", Some("1.0.0"))]);
        let recommender = MockRecommender::new(&[]);
        let resolver = VersionResolver::new(
            recommended(recommender, PremajorVersionBump::Default),
            ResolveOptions::new(VersionMode::Independent),
        );

        let err = resolver.resolve(&g, &all(&g)).await.unwrap_err();
        assert!(matches!(err, PipelineError::Collaborator(_)));
    }

    #[tokio::test]
    async fn test_invalid_recommendation_names_package() {
        let g = graph(vec![Package::new("a", Some("1.0.0"))]);
        let recommender = MockRecommender::new(&[("a", "next")]);
        let resolver = VersionResolver::new(
            recommended(recommender, PremajorVersionBump::Default),
            ResolveOptions::new(VersionMode::Independent),
        );

        let err = resolver.resolve(&g, &all(&g)).await.unwrap_err();
        assert!(err.to_string().contains("'next' in a"));
    }
}
