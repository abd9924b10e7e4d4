//! Manifest range updating
//!
//! Decides the new specifier of every local dependency edge whose target
//! received a new version. Only manifests of packages that are themselves
//! being versioned are touched. The original specifier style is preserved:
//! - `file:` paths and `workspace:*`/`^`/`~` aliases are never touched
//! - `workspace:^x.y.z` keeps its protocol and operator
//! - `^`/`~`/exact ranges keep their operator, or become bare in exact mode
//! - other ranges only change when the new version falls outside them

use crate::domain::{
    DependencyType, ManifestRewrite, Specifier, SpecifierKind, VersionAssignment,
};
use crate::graph::ProjectGraph;
use semver::Version;
use tracing::debug;

/// Computes manifest rewrites for a version assignment
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeUpdater {
    exact: bool,
}

impl RangeUpdater {
    /// Create a new RangeUpdater; `exact` writes bare versions instead of ranges
    pub fn new(exact: bool) -> Self {
        Self { exact }
    }

    /// Rewrites for every local edge between two packages in `assignment`,
    /// ordered by dependent discovery order, then manifest order
    pub fn update(&self, graph: &ProjectGraph, assignment: &VersionAssignment) -> Vec<ManifestRewrite> {
        let mut rewrites = Vec::new();

        for dependent in graph.packages() {
            // Excluded and skipped packages keep their manifests as written
            if !assignment.versions.iter().any(|c| c.name == dependent.name) {
                continue;
            }
            for (dependency, edge) in graph.local_dependencies(&dependent.name) {
                let Some(change) = assignment.versions.iter().find(|c| c.name == dependency) else {
                    continue;
                };

                let new_specifier = self.rewrite(
                    &edge.specifier,
                    edge.dependency_type,
                    change.old_version.as_ref(),
                    &change.new_version,
                );

                match new_specifier {
                    Some(new_specifier) if new_specifier != edge.specifier.raw => {
                        rewrites.push(ManifestRewrite {
                            package: dependent.name.clone(),
                            dependency_type: edge.dependency_type,
                            dependency: dependency.to_string(),
                            old_specifier: edge.specifier.raw.clone(),
                            new_specifier,
                        })
                    }
                    _ => debug!(
                        package = %dependent.name,
                        dependency,
                        specifier = %edge.specifier,
                        "specifier left unchanged"
                    ),
                }
            }
        }

        rewrites
    }

    /// The new specifier for one edge, or None when it stays as written
    pub fn rewrite(
        &self,
        specifier: &Specifier,
        dependency_type: DependencyType,
        old_version: Option<&Version>,
        new_version: &Version,
    ) -> Option<String> {
        let new_version_text = new_version.to_string();

        match specifier.kind {
            SpecifierKind::File | SpecifierKind::WorkspaceAlias | SpecifierKind::External => None,
            SpecifierKind::WorkspaceVersion => Some(specifier.format_updated(&new_version_text)),
            _ if dependency_type == DependencyType::PeerDependencies => None,
            // A range the current version never satisfied was pinned on purpose
            _ if old_version.is_some_and(|old| !specifier.satisfied_by(old)) => None,
            _ if self.exact => Some(new_version_text),
            kind if kind.is_operator_version() => Some(specifier.format_updated(&new_version_text)),
            _ if specifier.satisfied_by(new_version) => None,
            _ => Some(format!("^{}", new_version_text)),
        }
    }
}

/// Convenience wrapper around `RangeUpdater::update`
pub fn update_ranges(
    graph: &ProjectGraph,
    assignment: &VersionAssignment,
    exact: bool,
) -> Vec<ManifestRewrite> {
    RangeUpdater::new(exact).update(graph, assignment)
}

/// Applies rewrites onto the in-memory package manifests
pub fn apply_rewrites(graph: &mut ProjectGraph, rewrites: &[ManifestRewrite]) {
    for rewrite in rewrites {
        if let Some(package) = graph.package_mut(&rewrite.package) {
            package.set_specifier(rewrite.dependency_type, &rewrite.dependency, &rewrite.new_specifier);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BumpKind, Modifiers, Package, ReleaseType, VersionChange, VersionMode};
    use crate::parser::parse_specifier;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn rewrite(raw: &str, exact: bool, old: &str, new: &str) -> Option<String> {
        RangeUpdater::new(exact).rewrite(
            &parse_specifier(raw),
            DependencyType::Dependencies,
            Some(&v(old)),
            &v(new),
        )
    }

    #[test]
    fn test_caret_and_tilde_keep_operator() {
        assert_eq!(rewrite("^1.0.0", false, "1.0.0", "2.0.0"), Some("^2.0.0".to_string()));
        assert_eq!(rewrite("~1.0.0", false, "1.0.0", "1.0.1"), Some("~1.0.1".to_string()));
        assert_eq!(rewrite("1.0.0", false, "1.0.0", "1.0.1"), Some("1.0.1".to_string()));
    }

    #[test]
    fn test_exact_mode_writes_bare_version() {
        assert_eq!(rewrite("^1.0.0", true, "1.0.0", "2.0.0"), Some("2.0.0".to_string()));
        assert_eq!(rewrite(">=1.0.0", true, "1.0.0", "2.0.0"), Some("2.0.0".to_string()));
    }

    #[test]
    fn test_relative_file_left_unchanged() {
        assert_eq!(rewrite("file:../package-1", false, "1.0.0", "2.0.0"), None);
        assert_eq!(rewrite("file:../package-1", true, "1.0.0", "2.0.0"), None);
    }

    #[test]
    fn test_workspace_aliases_left_unchanged() {
        for raw in ["workspace:*", "workspace:^", "workspace:~"] {
            assert_eq!(rewrite(raw, false, "1.0.0", "2.0.0"), None, "{}", raw);
            assert_eq!(rewrite(raw, true, "1.0.0", "2.0.0"), None, "{}", raw);
        }
    }

    #[test]
    fn test_workspace_versions_rewritten() {
        assert_eq!(
            rewrite("workspace:^1.0.0", false, "1.0.0", "2.0.0"),
            Some("workspace:^2.0.0".to_string())
        );
        assert_eq!(
            rewrite("workspace:~1.0.0", false, "1.0.0", "2.0.0"),
            Some("workspace:~2.0.0".to_string())
        );
        assert_eq!(
            rewrite("workspace:1.0.0", true, "1.0.0", "2.0.0"),
            Some("workspace:2.0.0".to_string())
        );
    }

    #[test]
    fn test_manual_pin_left_unchanged() {
        // 0.9.0 was pinned on purpose while the package moved on to 1.x
        assert_eq!(rewrite("^0.9.0", false, "1.0.0", "2.0.0"), None);
        assert_eq!(rewrite("0.9.0", true, "1.0.0", "2.0.0"), None);
    }

    #[test]
    fn test_open_range_only_widened_when_needed() {
        assert_eq!(rewrite(">=1.0.0", false, "1.0.0", "2.0.0"), None);
        assert_eq!(rewrite("1.x", false, "1.0.0", "1.1.0"), None);
        assert_eq!(rewrite("1.x", false, "1.0.0", "2.0.0"), Some("^2.0.0".to_string()));
        assert_eq!(
            rewrite(">=1.0.0 <2.0.0", false, "1.0.0", "2.0.0"),
            Some("^2.0.0".to_string())
        );
    }

    #[test]
    fn test_plain_peer_dependency_left_unchanged() {
        let updater = RangeUpdater::new(false);
        assert_eq!(
            updater.rewrite(
                &parse_specifier("^1.0.0"),
                DependencyType::PeerDependencies,
                Some(&v("1.0.0")),
                &v("2.0.0"),
            ),
            None
        );
        assert_eq!(
            updater.rewrite(
                &parse_specifier("workspace:^1.0.0"),
                DependencyType::PeerDependencies,
                Some(&v("1.0.0")),
                &v("2.0.0"),
            ),
            Some("workspace:^2.0.0".to_string())
        );
    }

    #[test]
    fn test_external_left_unchanged() {
        assert_eq!(rewrite("github:org/repo", false, "1.0.0", "2.0.0"), None);
    }

    fn assignment(changes: &[(&str, &str, &str)]) -> VersionAssignment {
        VersionAssignment {
            mode: VersionMode::Independent,
            kind: BumpKind::Release(ReleaseType::Major),
            modifiers: Modifiers::default(),
            lockstep_version: None,
            versions: changes
                .iter()
                .map(|(name, old, new)| VersionChange {
                    name: name.to_string(),
                    old_version: Some(v(old)),
                    new_version: v(new),
                })
                .collect(),
            skipped: vec![],
        }
    }

    #[test]
    fn test_update_ranges_over_graph() {
        let mut graph = ProjectGraph::build(vec![
            Package::new("package-1", Some("1.0.0")),
            Package::new("package-2", Some("1.0.0"))
                .with_dependency(DependencyType::Dependencies, "package-1", "^1.0.0")
                .with_dependency(DependencyType::Dependencies, "lodash", "^4.0.0"),
            Package::new("package-3", Some("1.0.0"))
                .with_dependency(DependencyType::DevDependencies, "package-2", "workspace:*")
                .with_dependency(DependencyType::Dependencies, "package-1", "file:../package-1"),
        ])
        .unwrap();

        let a = assignment(&[
            ("package-1", "1.0.0", "2.0.0"),
            ("package-2", "1.0.0", "2.0.0"),
            ("package-3", "1.0.0", "2.0.0"),
        ]);
        let rewrites = update_ranges(&graph, &a, false);

        assert_eq!(rewrites.len(), 1);
        assert_eq!(rewrites[0].package, "package-2");
        assert_eq!(rewrites[0].dependency, "package-1");
        assert_eq!(rewrites[0].old_specifier, "^1.0.0");
        assert_eq!(rewrites[0].new_specifier, "^2.0.0");

        apply_rewrites(&mut graph, &rewrites);
        let pkg2 = graph.package("package-2").unwrap();
        assert_eq!(pkg2.dependencies[0].specifier.raw, "^2.0.0");
        assert_eq!(pkg2.dependencies[1].specifier.raw, "^4.0.0");
    }

    #[test]
    fn test_update_ranges_skips_targets_without_new_version() {
        let graph = ProjectGraph::build(vec![
            Package::new("a", Some("1.0.0")),
            Package::new("b", Some("1.0.0"))
                .with_dependency(DependencyType::Dependencies, "a", "^1.0.0"),
        ])
        .unwrap();

        let rewrites = update_ranges(&graph, &assignment(&[("b", "1.0.0", "1.0.1")]), false);
        assert!(rewrites.is_empty());
    }

    #[test]
    fn test_update_ranges_exact_mode() {
        let graph = ProjectGraph::build(vec![
            Package::new("a", Some("1.0.0")),
            Package::new("b", Some("1.0.0"))
                .with_dependency(DependencyType::OptionalDependencies, "a", "~1.0.0"),
        ])
        .unwrap();

        let rewrites = update_ranges(
            &graph,
            &assignment(&[("a", "1.0.0", "1.1.0"), ("b", "1.0.0", "1.0.1")]),
            true,
        );
        assert_eq!(rewrites[0].new_specifier, "1.1.0");
        assert_eq!(rewrites[0].dependency_type, DependencyType::OptionalDependencies);
    }

    #[test]
    fn test_update_ranges_skips_dependents_outside_assignment() {
        let graph = ProjectGraph::build(vec![
            Package::new("package-1", Some("1.0.0")),
            Package::new("package-5", Some("1.0.0"))
                .with_private(true)
                .with_dependency(DependencyType::Dependencies, "package-1", "^1.0.0"),
            Package::new("package-6", None)
                .with_private(true)
                .with_dependency(DependencyType::Dependencies, "package-1", "^1.0.0"),
        ])
        .unwrap();

        let rewrites = update_ranges(&graph, &assignment(&[("package-1", "1.0.0", "2.0.0")]), false);
        assert!(rewrites.is_empty());
    }
}
