//! Version orchestrator for coordinating the release workflow
//!
//! This module provides:
//! - Workflow coordination: discover → detect changes → propagate → confirm → write
//! - Merging of CLI flags over the project configuration file
//! - Dry-run mode support
//! - Changelog generation for conventional-commit releases

use crate::changelog::FileChangelogWriter;
use crate::changes::ChangeDetector;
use crate::cli::{BumpArg, CliArgs};
use crate::collaborator::{
    ChangelogMode, ChangelogOptions, ChangelogWriter, RecommendOptions, VersionPrompt,
    VersionRecommender,
};
use crate::config::ProjectConfig;
use crate::conventional::ConventionalRecommender;
use crate::domain::{ManifestRewrite, Package, PackageChange, VersionMode};
use crate::error::{AppError, ConfigError};
use crate::git::GitRepository;
use crate::manifest::{load_workspace, ManifestWriter, WriteResult};
use crate::output::{create_formatter, OutputConfig, OutputFormatter};
use crate::progress::Progress;
use crate::prompt::TerminalPrompt;
use crate::propagation::{Propagation, PropagationOutcome, ReleasePlan};
use crate::update::{CollectOptions, PackageSelector};
use crate::version::{ResolveOptions, VersionResolver, VersionStrategy};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const CONFIRM_MESSAGE: &str = "Are you sure you want to create these versions?";

/// Where a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// No package needed a new version
    NothingChanged,
    /// Versions computed, not yet written
    Planned,
    /// The confirmation was declined
    Aborted,
    /// Manifests written (or would be, in dry-run mode)
    Completed,
}

/// Result of running the orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorResult {
    /// Workspace root
    pub root: PathBuf,
    pub mode: VersionMode,
    pub dry_run: bool,
    pub status: RunStatus,
    /// New fixed-mode version
    pub lockstep_version: Option<String>,
    /// Versioned packages, dependencies before dependents
    pub changes: Vec<PackageChange>,
    pub rewrites: Vec<ManifestRewrite>,
    /// Unversioned private packages left alone
    pub skipped: Vec<String>,
    /// Location of every workspace package
    pub locations: BTreeMap<String, PathBuf>,
    /// Write results for each touched manifest
    pub written: Vec<WriteResult>,
    /// Number of changelog files updated
    pub changelogs: usize,
}

impl OrchestratorResult {
    fn new(root: &Path, mode: VersionMode, dry_run: bool) -> Self {
        Self {
            root: root.to_path_buf(),
            mode,
            dry_run,
            status: RunStatus::NothingChanged,
            lockstep_version: None,
            changes: Vec::new(),
            rewrites: Vec::new(),
            skipped: Vec::new(),
            locations: BTreeMap::new(),
            written: Vec::new(),
            changelogs: 0,
        }
    }

    fn planned(root: &Path, dry_run: bool, plan: &ReleasePlan) -> Self {
        Self {
            status: RunStatus::Planned,
            lockstep_version: plan.lockstep_version().map(ToString::to_string),
            changes: plan.changes.clone(),
            rewrites: plan.rewrites.clone(),
            skipped: plan.assignment.skipped.clone(),
            locations: plan
                .graph
                .packages()
                .map(|p| (p.name.clone(), p.location.clone()))
                .collect(),
            ..Self::new(root, plan.assignment.mode, dry_run)
        }
    }

    /// Location of a workspace package
    pub fn location_of(&self, name: &str) -> Option<&Path> {
        self.changes
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.location.as_path())
            .or_else(|| self.locations.get(name).map(PathBuf::as_path))
    }

    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// Orchestrator for coordinating the version workflow
pub struct Orchestrator {
    /// CLI arguments for configuration
    args: CliArgs,
    /// Canonical workspace root
    root: PathBuf,
    config: ProjectConfig,
    git: GitRepository,
    prompt: Arc<dyn VersionPrompt>,
    recommender: Option<Arc<dyn VersionRecommender>>,
    changelog_writer: Option<Arc<dyn ChangelogWriter>>,
}

impl Orchestrator {
    /// Create a new orchestrator with the given CLI arguments
    pub fn new(args: CliArgs) -> Result<Self, AppError> {
        let root = args
            .path
            .canonicalize()
            .map_err(|e| ConfigError::InvalidPath {
                path: args.path.clone(),
                message: e.to_string(),
            })?;
        if !root.is_dir() {
            return Err(ConfigError::InvalidPath {
                path: args.path.clone(),
                message: "not a directory".to_string(),
            }
            .into());
        }

        let config = ProjectConfig::load(&root)?;
        if args.independent && !config.is_independent() {
            return Err(ConfigError::IndependentNotConfigured.into());
        }

        Ok(Self {
            git: GitRepository::new(&root),
            args,
            root,
            config,
            prompt: Arc::new(TerminalPrompt::new()),
            recommender: None,
            changelog_writer: None,
        })
    }

    /// Replace the interactive prompt (builder pattern)
    pub fn with_prompt(mut self, prompt: Arc<dyn VersionPrompt>) -> Self {
        self.prompt = prompt;
        self
    }

    /// Replace the conventional-commit recommender (builder pattern)
    pub fn with_recommender(mut self, recommender: Arc<dyn VersionRecommender>) -> Self {
        self.recommender = Some(recommender);
        self
    }

    /// Replace the changelog writer (builder pattern)
    pub fn with_changelog_writer(mut self, writer: Arc<dyn ChangelogWriter>) -> Self {
        self.changelog_writer = Some(writer);
        self
    }

    /// Replace the git repository used for change detection (builder pattern)
    pub fn with_git(mut self, git: GitRepository) -> Self {
        self.git = git;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Output configuration derived from the CLI flags
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig::from_cli(
            self.args.json,
            self.args.diff,
            self.args.verbose,
            self.args.quiet,
            self.args.dry_run,
        )
    }

    /// Run the version workflow, writing formatted output to `out`
    pub async fn run(&self, out: &mut dyn Write) -> Result<OrchestratorResult, AppError> {
        let formatter = create_formatter(&self.output_config());
        let mut progress = Progress::new(!self.args.quiet && !self.args.json);
        let mode = self.config.mode();
        let dry_run = self.args.dry_run;

        // Step 1: Discover workspace packages
        progress.phase("Discovering packages...");
        let packages = load_workspace(&self.root, self.config.packages.as_deref())?;
        debug!(packages = packages.len(), %mode, "workspace loaded");

        // Step 2: Determine changed packages
        let changed = match self.args.changed_packages() {
            Some(names) => names,
            None => {
                progress.phase("Detecting changes...");
                ChangeDetector::new(self.git.clone(), mode, self.tag_prefix()).detect(&packages)
            }
        };
        debug!(changed = ?changed, "changed packages");

        // Step 3: Compute versions and specifier rewrites. The prompt may take
        // the terminal here, so no indicator is drawn.
        progress.finish_and_clear();
        let propagation = self.propagation(mode)?;
        let outcome = propagation
            .run(packages, changed.iter().map(String::as_str))
            .await?;

        let plan = match outcome {
            PropagationOutcome::NothingChanged => {
                let result = OrchestratorResult::new(&self.root, mode, dry_run);
                Self::emit(formatter.as_ref(), &result, out)?;
                return Ok(result);
            }
            PropagationOutcome::Planned(plan) => plan,
        };

        let mut result = OrchestratorResult::planned(&self.root, dry_run, &plan);
        formatter.format(&result, out)?;
        out.flush()?;

        // Step 4: Confirm
        if !self.args.yes && !dry_run && !self.prompt.confirm(CONFIRM_MESSAGE).await? {
            info!("release aborted");
            result.status = RunStatus::Aborted;
            Self::summarize(formatter.as_ref(), &result, out)?;
            return Ok(result);
        }

        // Step 5: Write manifests
        let writer = ManifestWriter::new(dry_run);
        result.written = writer.write_plan(&plan)?;
        if let Some(written) = self.write_config_version(&writer, &plan)? {
            result.written.push(written);
        }

        // Step 6: Changelogs
        if self.changelogs_enabled() && !dry_run {
            result.changelogs = self.write_changelogs(&plan, &mut progress).await?;
        }

        result.status = RunStatus::Completed;
        Self::summarize(formatter.as_ref(), &result, out)?;
        Ok(result)
    }

    fn emit(
        formatter: &dyn OutputFormatter,
        result: &OrchestratorResult,
        out: &mut dyn Write,
    ) -> Result<(), AppError> {
        formatter.format(result, out)?;
        Self::summarize(formatter, result, out)
    }

    fn summarize(
        formatter: &dyn OutputFormatter,
        result: &OrchestratorResult,
        out: &mut dyn Write,
    ) -> Result<(), AppError> {
        formatter.format_summary(result, out)?;
        out.flush()?;
        Ok(())
    }

    fn mode_options(&self, mode: VersionMode) -> Result<ResolveOptions, ConfigError> {
        let lockstep = match mode {
            VersionMode::Fixed => self.config.lockstep_version()?,
            VersionMode::Independent => None,
        };
        Ok(ResolveOptions::new(mode)
            .with_lockstep_version(lockstep)
            .with_preid(self.preid())
            .with_build_metadata(self.args.build_metadata.clone())
            .with_prerelease(self.args.prerelease_selector())
            .with_graduate(self.args.graduate_selector()))
    }

    fn propagation(&self, mode: VersionMode) -> Result<Propagation, AppError> {
        let collect = CollectOptions::new()
            .with_mode(mode)
            .with_force_publish(self.force_publish())
            .with_graduate(self.args.graduate_selector())
            .with_exclude_private(self.args.no_private || self.config.exclude_private());

        let resolver = VersionResolver::new(self.strategy()?, self.mode_options(mode)?);
        Ok(Propagation::new(collect, resolver, self.exact()))
    }

    /// Select the version strategy: an explicit bump wins over recommendations
    fn strategy(&self) -> Result<VersionStrategy, ConfigError> {
        Ok(match &self.args.bump {
            Some(BumpArg::Release(release)) => VersionStrategy::Bump(*release),
            Some(BumpArg::Explicit(version)) => VersionStrategy::Explicit(version.clone()),
            None if self.conventional_commits() => VersionStrategy::Recommended {
                recommender: self.recommender(),
                options: RecommendOptions::new(&self.root)
                    .with_tag_prefix(self.tag_prefix())
                    .with_changelog_preset(self.changelog_preset())
                    .with_bump_prerelease(self.args.conventional_bump_prerelease),
                premajor: match self.args.premajor_version_bump {
                    Some(policy) => policy,
                    None => self.config.premajor_version_bump()?,
                },
            },
            None => VersionStrategy::Prompt(self.prompt.clone()),
        })
    }

    fn recommender(&self) -> Arc<dyn VersionRecommender> {
        self.recommender
            .clone()
            .unwrap_or_else(|| Arc::new(ConventionalRecommender::new(self.git.clone())))
    }

    fn changelog_writer(&self) -> Arc<dyn ChangelogWriter> {
        self.changelog_writer
            .clone()
            .unwrap_or_else(|| Arc::new(FileChangelogWriter::new(self.git.clone())))
    }

    /// Record the new fixed-mode version in the config file, when it has one
    fn write_config_version(
        &self,
        writer: &ManifestWriter,
        plan: &ReleasePlan,
    ) -> Result<Option<WriteResult>, AppError> {
        if self.config.is_independent() || self.config.version.is_none() {
            return Ok(None);
        }
        let (Some(path), Some(version)) = (&self.config.path, plan.lockstep_version()) else {
            return Ok(None);
        };
        Ok(Some(writer.write_config_version(path, &version.to_string())?))
    }

    async fn write_changelogs(
        &self,
        plan: &ReleasePlan,
        progress: &mut Progress,
    ) -> Result<usize, AppError> {
        let writer = self.changelog_writer();
        let options = ChangelogOptions {
            root_path: self.root.clone(),
            tag_prefix: self.tag_prefix(),
            changelog_preset: self.changelog_preset(),
        };
        let mode = match plan.assignment.mode {
            VersionMode::Fixed => ChangelogMode::Fixed,
            VersionMode::Independent => ChangelogMode::Independent,
        };

        let mut written = 0;
        progress.start(plan.changes.len() as u64, "Updating changelogs");
        for change in &plan.changes {
            if let Some(package) = plan.graph.package(&change.name) {
                writer.update_changelog(package, mode, &options).await?;
                written += 1;
            }
            progress.inc();
        }

        if let Some(version) = plan.lockstep_version() {
            let version = version.to_string();
            let root = Package::new("root", Some(version.as_str())).with_location(&self.root);
            writer
                .update_changelog(&root, ChangelogMode::Root, &options)
                .await?;
            written += 1;
        }
        progress.finish_and_clear();

        Ok(written)
    }

    fn tag_prefix(&self) -> String {
        self.args
            .tag_version_prefix
            .clone()
            .unwrap_or_else(|| self.config.tag_version_prefix().to_string())
    }

    fn preid(&self) -> Option<String> {
        self.args
            .preid
            .clone()
            .or_else(|| self.config.command.version.preid.clone())
    }

    fn changelog_preset(&self) -> Option<String> {
        self.args
            .changelog_preset
            .clone()
            .or_else(|| self.config.command.version.changelog_preset.clone())
    }

    fn force_publish(&self) -> PackageSelector {
        let selector = self.args.force_publish_selector();
        if selector.is_active() {
            selector
        } else {
            self.config.force_publish()
        }
    }

    fn exact(&self) -> bool {
        self.args.exact || self.config.exact()
    }

    fn conventional_commits(&self) -> bool {
        self.args.conventional_commits || self.config.conventional_commits()
    }

    fn changelogs_enabled(&self) -> bool {
        self.conventional_commits() && !self.args.no_changelog && self.config.changelog()
    }
}
