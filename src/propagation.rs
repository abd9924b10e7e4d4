//! Propagation driver
//!
//! Runs graph build, update collection, version resolution and range
//! updating in order. Everything that can fail is checked before the
//! in-memory packages are mutated; nothing is written to disk here.

use crate::domain::{
    ManifestRewrite, Package, PackageChange, VersionAssignment, VersionChange, VersionMode,
};
use crate::error::PipelineError;
use crate::graph::ProjectGraph;
use crate::ranges::{apply_rewrites, RangeUpdater};
use crate::update::{CollectOptions, UpdateCollector, UpdateSet};
use crate::version::VersionResolver;
use semver::Version;
use tracing::info;

/// The result of a propagation run
#[derive(Debug)]
pub enum PropagationOutcome {
    /// No package changed and nothing was forced
    NothingChanged,
    /// New versions and manifest rewrites were computed
    Planned(ReleasePlan),
}

/// Everything a release writes, already applied to the in-memory graph
#[derive(Debug)]
pub struct ReleasePlan {
    /// Graph with new versions and specifiers applied
    pub graph: ProjectGraph,
    pub updates: UpdateSet,
    pub assignment: VersionAssignment,
    pub rewrites: Vec<ManifestRewrite>,
    /// Per-package summary, dependencies before dependents
    pub changes: Vec<PackageChange>,
}

impl ReleasePlan {
    /// The version recorded for the root pseudo-package in fixed mode
    pub fn lockstep_version(&self) -> Option<&Version> {
        self.assignment.lockstep_version.as_ref()
    }

    /// Rewrites touching `package`
    pub fn rewrites_for<'a>(&'a self, package: &'a str) -> impl Iterator<Item = &'a ManifestRewrite> {
        self.rewrites.iter().filter(move |r| r.package == package)
    }
}

/// Sequences the versioning pipeline
#[derive(Debug)]
pub struct Propagation {
    collector: UpdateCollector,
    resolver: VersionResolver,
    ranges: RangeUpdater,
}

impl Propagation {
    /// Create a new Propagation; `exact` writes bare versions into dependent manifests
    pub fn new(collect: CollectOptions, resolver: VersionResolver, exact: bool) -> Self {
        Self {
            collector: UpdateCollector::new(collect),
            resolver,
            ranges: RangeUpdater::new(exact),
        }
    }

    /// Run the pipeline over `packages` given the names that changed
    pub async fn run<'a>(
        &self,
        packages: Vec<Package>,
        changed: impl IntoIterator<Item = &'a str>,
    ) -> Result<PropagationOutcome, PipelineError> {
        let mut graph = ProjectGraph::build(packages)?;

        let mut updates = self.collector.collect(&graph, changed);
        if updates.is_empty() {
            info!("no changed packages to version");
            return Ok(PropagationOutcome::NothingChanged);
        }

        let mut assignment = self.resolver.resolve(&graph, &updates).await?;

        if self.crosses_major(&assignment) {
            let widened = self.collector.widen_to_all(&graph);
            if widened.len() > updates.len() {
                info!(packages = widened.len(), "major version change: versioning every package");
                assignment = self.widen(&graph, &widened, assignment)?;
                updates = widened;
            }
        }

        let rewrites = self.ranges.update(&graph, &assignment);

        for change in &assignment.versions {
            if let Some(package) = graph.package_mut(&change.name) {
                package.set_version(&change.new_version);
            }
        }
        apply_rewrites(&mut graph, &rewrites);

        let changes = graph
            .topological_order()
            .into_iter()
            .filter_map(|name| {
                let change = assignment.versions.iter().find(|c| c.name == name)?;
                let package = graph.package(&name)?;
                Some(PackageChange {
                    name: change.name.clone(),
                    location: package.location.clone(),
                    private: package.private,
                    old_version: change.old_version.as_ref().map(Version::to_string),
                    new_version: change.new_version.to_string(),
                })
            })
            .collect();

        Ok(PropagationOutcome::Planned(ReleasePlan {
            graph,
            updates,
            assignment,
            rewrites,
            changes,
        }))
    }

    /// Fixed mode only: whether the lockstep version moves to a new major line
    fn crosses_major(&self, assignment: &VersionAssignment) -> bool {
        if assignment.mode != VersionMode::Fixed {
            return false;
        }
        let Some(next) = &assignment.lockstep_version else {
            return false;
        };
        let previous = self.resolver.options().lockstep_version.clone().or_else(|| {
            assignment
                .versions
                .iter()
                .filter_map(|c| c.old_version.clone())
                .max_by(|a, b| a.cmp_precedence(b))
        });
        previous.is_some_and(|previous| previous.major != next.major)
    }

    /// Extends a fixed-mode assignment to `widened`, reusing the lockstep version
    fn widen(
        &self,
        graph: &ProjectGraph,
        widened: &UpdateSet,
        assignment: VersionAssignment,
    ) -> Result<VersionAssignment, PipelineError> {
        let Some(next) = assignment.lockstep_version.clone() else {
            return Ok(assignment);
        };
        let (versioned, skipped) = self.resolver.validate(graph, widened)?;

        Ok(VersionAssignment {
            versions: versioned
                .into_iter()
                .map(|(name, old)| VersionChange {
                    name,
                    old_version: Some(old),
                    new_version: next.clone(),
                })
                .collect(),
            skipped,
            ..assignment
        })
    }
}
