//! Git integration for change detection and commit analysis
//!
//! This module provides:
//! - A runner trait so git can be replaced in tests
//! - Release tag lookup, changed files and commit messages since a tag

use crate::error::CollaboratorError;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

/// Output of one git invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitOutput {
    /// Whether the command exited successfully
    pub success: bool,
    /// Standard output from the command
    pub stdout: String,
    /// Standard error from the command
    pub stderr: String,
}

impl GitOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Trait for running git commands
pub trait GitRunner: Send + Sync {
    /// Run git with `args` in `working_dir`
    fn run(&self, args: &[&str], working_dir: &Path) -> std::io::Result<GitOutput>;
}

/// Runs the system `git` binary
#[derive(Debug, Default)]
pub struct SystemGit;

impl GitRunner for SystemGit {
    fn run(&self, args: &[&str], working_dir: &Path) -> std::io::Result<GitOutput> {
        let output = Command::new("git")
            .args(args)
            .current_dir(working_dir)
            .output()?;

        Ok(GitOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// A git repository rooted at the workspace root
#[derive(Clone)]
pub struct GitRepository {
    root: PathBuf,
    runner: Arc<dyn GitRunner>,
}

impl std::fmt::Debug for GitRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepository")
            .field("root", &self.root)
            .finish()
    }
}

impl GitRepository {
    /// Use the system git binary
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_runner(root, Arc::new(SystemGit))
    }

    pub fn with_runner(root: impl Into<PathBuf>, runner: Arc<dyn GitRunner>) -> Self {
        Self {
            root: root.into(),
            runner,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run a git command, failing on a non-zero exit
    pub fn run(&self, args: &[&str]) -> Result<String, CollaboratorError> {
        let output = self.try_run(args)?;
        if output.success {
            Ok(output.stdout)
        } else {
            Err(CollaboratorError::git(command_name(args), output.stderr.trim()))
        }
    }

    fn try_run(&self, args: &[&str]) -> Result<GitOutput, CollaboratorError> {
        self.runner
            .run(args, &self.root)
            .map_err(|e| CollaboratorError::git(command_name(args), e.to_string()))
    }

    /// Whether the root is inside a git work tree
    pub fn is_repository(&self) -> bool {
        self.try_run(&["rev-parse", "--is-inside-work-tree"])
            .is_ok_and(|o| o.success && o.stdout.trim() == "true")
    }

    /// The most recent tag reachable from HEAD matching `pattern`, if any
    pub fn last_tag(&self, pattern: &str) -> Result<Option<String>, CollaboratorError> {
        let output = self.try_run(&[
            "describe",
            "--tags",
            "--abbrev=0",
            "--first-parent",
            "--match",
            pattern,
        ])?;

        // describe exits non-zero when no tag matches
        if !output.success {
            return Ok(None);
        }
        let tag = output.stdout.trim();
        Ok((!tag.is_empty()).then(|| tag.to_string()))
    }

    /// Files changed since `since`, relative to the root, optionally limited to `path`
    pub fn changed_files(
        &self,
        since: &str,
        path: Option<&Path>,
    ) -> Result<Vec<String>, CollaboratorError> {
        let pathspec = pathspec(path);
        let stdout = self.run(&["diff", "--name-only", "--relative", since, "--", &pathspec])?;
        Ok(non_empty_lines(&stdout))
    }

    /// Full commit messages since `since` (or the whole history) touching `path`
    pub fn commit_messages(
        &self,
        since: Option<&str>,
        path: Option<&Path>,
    ) -> Result<Vec<String>, CollaboratorError> {
        let range = since.map(|tag| format!("{}..HEAD", tag));
        let pathspec = pathspec(path);

        let mut args = vec!["log", "--format=%B%x00"];
        if let Some(range) = &range {
            args.push(range);
        }
        args.push("--");
        args.push(&pathspec);

        let stdout = self.run(&args)?;
        Ok(stdout
            .split('\0')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(String::from)
            .collect())
    }
}

fn command_name(args: &[&str]) -> String {
    args.first().copied().unwrap_or_default().to_string()
}

fn pathspec(path: Option<&Path>) -> String {
    match path {
        Some(p) if !p.as_os_str().is_empty() => p.to_string_lossy().replace('\\', "/"),
        _ => ".".to_string(),
    }
}

fn non_empty_lines(s: &str) -> Vec<String> {
    s.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock git runner answering from a fixed table of `args -> output`
    #[derive(Default)]
    pub(crate) struct MockGit {
        responses: Vec<(String, GitOutput)>,
        pub(crate) calls: Mutex<Vec<String>>,
    }

    impl MockGit {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        /// Respond to every command starting with `prefix`
        pub(crate) fn respond(mut self, prefix: &str, output: GitOutput) -> Self {
            self.responses.push((prefix.to_string(), output));
            self
        }
    }

    impl GitRunner for MockGit {
        fn run(&self, args: &[&str], _working_dir: &Path) -> std::io::Result<GitOutput> {
            let command = args.join(" ");
            self.calls.lock().unwrap().push(command.clone());
            Ok(self
                .responses
                .iter()
                .find(|(prefix, _)| command.starts_with(prefix.as_str()))
                .map(|(_, output)| output.clone())
                .unwrap_or_else(|| GitOutput::failure("unexpected command")))
        }
    }

    fn repo(mock: MockGit) -> GitRepository {
        GitRepository::with_runner("/repo", Arc::new(mock))
    }

    #[test]
    fn test_last_tag() {
        let git = repo(MockGit::new().respond("describe", GitOutput::success("v1.0.0\n")));
        assert_eq!(git.last_tag("v*").unwrap(), Some("v1.0.0".to_string()));
    }

    #[test]
    fn test_last_tag_none_when_describe_fails() {
        let git = repo(
            MockGit::new().respond("describe", GitOutput::failure("fatal: No names found")),
        );
        assert_eq!(git.last_tag("v*").unwrap(), None);
    }

    #[test]
    fn test_changed_files() {
        let git = repo(MockGit::new().respond(
            "diff --name-only --relative v1.0.0 -- packages/a",
            GitOutput::success("packages/a/index.js\n\npackages/a/package.json\n"),
        ));
        let files = git
            .changed_files("v1.0.0", Some(Path::new("packages/a")))
            .unwrap();
        assert_eq!(files, vec!["packages/a/index.js", "packages/a/package.json"]);
    }

    #[test]
    fn test_changed_files_failure() {
        let git = repo(MockGit::new());
        let err = git.changed_files("v1.0.0", None).unwrap_err();
        assert!(err.to_string().contains("git diff failed"));
    }

    #[test]
    fn test_commit_messages() {
        let git = repo(MockGit::new().respond(
            "log --format=%B%x00 v1.0.0..HEAD -- .",
            GitOutput::success("feat: add thing\n\nbody\n\0\nfix: bug\n\0\n"),
        ));
        let messages = git.commit_messages(Some("v1.0.0"), None).unwrap();
        assert_eq!(messages, vec!["feat: add thing\n\nbody", "fix: bug"]);
    }

    #[test]
    fn test_commit_messages_whole_history() {
        let mock = MockGit::new().respond("log", GitOutput::success(""));
        let git = GitRepository::with_runner("/repo", Arc::new(mock));
        assert!(git.commit_messages(None, Some(Path::new("packages/a"))).unwrap().is_empty());
    }

    #[test]
    fn test_is_repository() {
        let git = repo(MockGit::new().respond("rev-parse", GitOutput::success("true\n")));
        assert!(git.is_repository());
        assert!(!repo(MockGit::new()).is_repository());
    }
}
