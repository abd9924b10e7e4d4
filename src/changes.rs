//! Change detection
//!
//! Maps files changed since the last release tag onto workspace packages.
//! - fixed mode: one `{prefix}{version}` tag for the whole workspace
//! - independent mode: one `{name}@{version}` tag per package
//!
//! Without a release tag every package counts as changed. A git failure is
//! logged and also treated as "everything changed".

use crate::domain::{Package, VersionMode};
use crate::git::GitRepository;
use tracing::{debug, warn};

/// Finds the packages changed since their last release
#[derive(Debug, Clone)]
pub struct ChangeDetector {
    git: GitRepository,
    mode: VersionMode,
    tag_prefix: String,
}

impl ChangeDetector {
    pub fn new(git: GitRepository, mode: VersionMode, tag_prefix: impl Into<String>) -> Self {
        Self {
            git,
            mode,
            tag_prefix: tag_prefix.into(),
        }
    }

    /// Names of changed packages, in `packages` order
    pub fn detect(&self, packages: &[Package]) -> Vec<String> {
        match self.mode {
            VersionMode::Fixed => self.detect_fixed(packages),
            VersionMode::Independent => packages
                .iter()
                .filter(|p| self.package_changed(p))
                .map(|p| p.name.clone())
                .collect(),
        }
    }

    fn detect_fixed(&self, packages: &[Package]) -> Vec<String> {
        let pattern = format!("{}*", self.tag_prefix);
        let tag = match self.git.last_tag(&pattern) {
            Ok(Some(tag)) => tag,
            Ok(None) => {
                debug!(pattern, "no release tag found, all packages changed");
                return all_names(packages);
            }
            Err(e) => {
                warn!(error = %e, "change detection failed, assuming all packages changed");
                return all_names(packages);
            }
        };

        let files = match self.git.changed_files(&tag, None) {
            Ok(files) => files,
            Err(e) => {
                warn!(error = %e, "change detection failed, assuming all packages changed");
                return all_names(packages);
            }
        };
        debug!(tag, files = files.len(), "files changed since last release");

        packages
            .iter()
            .filter(|p| {
                let location = relative(p, self.git.root());
                files.iter().any(|f| is_within(f, &location))
            })
            .map(|p| p.name.clone())
            .collect()
    }

    fn package_changed(&self, package: &Package) -> bool {
        let pattern = format!("{}@*", package.name);
        let tag = match self.git.last_tag(&pattern) {
            Ok(Some(tag)) => tag,
            Ok(None) => return true,
            Err(e) => {
                warn!(package = %package.name, error = %e, "change detection failed");
                return true;
            }
        };

        let location = relative(package, self.git.root());
        match self
            .git
            .changed_files(&tag, Some(std::path::Path::new(&location)))
        {
            Ok(files) => !files.is_empty(),
            Err(e) => {
                warn!(package = %package.name, error = %e, "change detection failed");
                true
            }
        }
    }
}

fn all_names(packages: &[Package]) -> Vec<String> {
    packages.iter().map(|p| p.name.clone()).collect()
}

fn relative(package: &Package, root: &std::path::Path) -> String {
    package
        .relative_location(root)
        .to_string_lossy()
        .replace('\\', "/")
}

fn is_within(file: &str, location: &str) -> bool {
    location.is_empty()
        || file
            .strip_prefix(location)
            .is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::tests::MockGit;
    use crate::git::GitOutput;
    use std::sync::Arc;

    fn packages() -> Vec<Package> {
        vec![
            Package::new("a", Some("1.0.0")).with_location("/repo/packages/a"),
            Package::new("ab", Some("1.0.0")).with_location("/repo/packages/ab"),
            Package::new("c", Some("1.0.0")).with_location("/repo/packages/c"),
        ]
    }

    fn detector(mock: MockGit, mode: VersionMode) -> ChangeDetector {
        ChangeDetector::new(
            GitRepository::with_runner("/repo", Arc::new(mock)),
            mode,
            "v",
        )
    }

    #[test]
    fn test_fixed_without_tag_everything_changed() {
        let mock = MockGit::new().respond("describe", GitOutput::failure("No names found"));
        let changed = detector(mock, VersionMode::Fixed).detect(&packages());
        assert_eq!(changed, vec!["a", "ab", "c"]);
    }

    #[test]
    fn test_fixed_maps_files_to_packages() {
        let mock = MockGit::new()
            .respond("describe", GitOutput::success("v1.0.0\n"))
            .respond(
                "diff",
                GitOutput::success("packages/ab/index.js\nREADME.md\npackages/c/lib/x.js\n"),
            );
        let changed = detector(mock, VersionMode::Fixed).detect(&packages());
        assert_eq!(changed, vec!["ab", "c"]);
    }

    #[test]
    fn test_fixed_git_failure_everything_changed() {
        let mock = MockGit::new().respond("describe", GitOutput::success("v1.0.0\n"));
        let changed = detector(mock, VersionMode::Fixed).detect(&packages());
        assert_eq!(changed.len(), 3);
    }

    #[test]
    fn test_independent_per_package_tags() {
        let mock = MockGit::new()
            .respond("describe --tags --abbrev=0 --first-parent --match a@*", GitOutput::success("a@1.0.0"))
            .respond("describe --tags --abbrev=0 --first-parent --match ab@*", GitOutput::success("ab@1.0.0"))
            .respond("describe", GitOutput::failure("No names found"))
            .respond("diff --name-only --relative a@1.0.0", GitOutput::success(""))
            .respond(
                "diff --name-only --relative ab@1.0.0",
                GitOutput::success("packages/ab/index.js\n"),
            );

        let changed = detector(mock, VersionMode::Independent).detect(&packages());
        assert_eq!(changed, vec!["ab", "c"]);
    }

    #[test]
    fn test_is_within() {
        assert!(is_within("packages/a/index.js", "packages/a"));
        assert!(!is_within("packages/ab/index.js", "packages/a"));
        assert!(!is_within("packages/a", "packages/a"));
        assert!(is_within("anything", ""));
    }
}
