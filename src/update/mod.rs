//! Update-set collection
//!
//! This module provides:
//! - Package selectors for force-publish, prerelease and graduate policies
//! - The update collector that turns a change set into the set of packages
//!   needing a new version

mod filter;

pub use filter::{CollectOptions, PackageSelector};

use crate::graph::ProjectGraph;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Packages selected for a new version, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSet {
    names: Vec<String>,
}

impl UpdateSet {
    /// Builds a set from names, ordered by their position in `graph`
    fn from_graph(graph: &ProjectGraph, members: HashSet<String>) -> Self {
        let mut names: Vec<String> = members.into_iter().collect();
        names.sort_by_key(|name| graph.position(name).unwrap_or(usize::MAX));
        Self { names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Computes the update set from a change set
#[derive(Debug, Clone)]
pub struct UpdateCollector {
    options: CollectOptions,
}

impl UpdateCollector {
    /// Create a new UpdateCollector with the given options
    pub fn new(options: CollectOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CollectOptions {
        &self.options
    }

    /// Collect the packages needing a new version.
    ///
    /// Changed and forced packages are expanded to every transitive dependent,
    /// so a cycle is fully absorbed once any member is reached. Private
    /// packages are removed last, after expansion.
    pub fn collect<'a>(
        &self,
        graph: &ProjectGraph,
        changed: impl IntoIterator<Item = &'a str>,
    ) -> UpdateSet {
        let mut selected: HashSet<String> = HashSet::new();

        for name in changed {
            if graph.contains(name) {
                selected.insert(name.to_string());
            } else {
                warn!(package = name, "changed package is not part of the workspace");
            }
        }

        for package in graph.packages() {
            if self.options.force_publish.matches(&package.name) {
                debug!(package = %package.name, "forced into update set");
                selected.insert(package.name.clone());
            } else if self.options.graduate.matches(&package.name) && is_prerelease(package) {
                debug!(package = %package.name, "prerelease selected for graduation");
                selected.insert(package.name.clone());
            }
        }

        if selected.is_empty() {
            return UpdateSet::default();
        }

        let mut frontier: Vec<String> = selected.iter().cloned().collect();
        while let Some(name) = frontier.pop() {
            for dependent in graph.dependents(&name) {
                if selected.insert(dependent.to_string()) {
                    frontier.push(dependent.to_string());
                }
            }
        }

        if self.options.widens_to_all() {
            info!("fixed mode: versioning every package");
            selected.extend(graph.names());
        }

        self.finish(graph, selected)
    }

    /// Every package in the workspace, minus excluded private packages
    pub fn widen_to_all(&self, graph: &ProjectGraph) -> UpdateSet {
        self.finish(graph, graph.names().into_iter().collect())
    }

    fn finish(&self, graph: &ProjectGraph, mut selected: HashSet<String>) -> UpdateSet {
        if self.options.exclude_private {
            selected.retain(|name| graph.package(name).is_some_and(|p| !p.private));
        }
        UpdateSet::from_graph(graph, selected)
    }
}

fn is_prerelease(package: &crate::domain::Package) -> bool {
    package
        .semver()
        .ok()
        .flatten()
        .is_some_and(|v| !v.pre.is_empty())
}
