use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use monoweave_core::Changeset;
use monoweave_git::{CommitInfo, TagInfo};
use monoweave_project::{MonoweaveConfig, WorkspaceGraph};
use monoweave_registry::RegistryClient;
use tracing::{debug, info};

use super::changelog_files::{refresh_changelogs, write_changelogs};
use super::changeset::{ChangesetBuilder, highest_strategy};
use super::changeset_file::write_changeset_file;
use super::git_release::{commit_release, create_release_tags, push_release};
use super::hooks::run_release_hooks;
use super::lifecycle::run_lifecycle_scripts;
use super::manifests::{PatchedManifests, patch_manifests, restore_manifests};
use super::registry_tags::latest_tags;
use crate::Result;
use crate::strategies::{explicit_strategies, implicit_strategies, merge_strategies};
use crate::traits::{
    ChangelogWriter, GitProvider, ManifestWriter, ProjectProvider, ReleaseHook, ScriptRunner,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ReleaseInput {
    /// Check changelog files out from upstream before prepending.
    pub refresh_changelogs: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ReleaseOutput {
    pub changeset: Changeset,
    /// Version files consumed by this release.
    pub version_files: Vec<PathBuf>,
    pub changelog_files: Vec<PathBuf>,
    pub changeset_file: Option<PathBuf>,
    pub commit: Option<CommitInfo>,
    pub tags: Vec<TagInfo>,
}

#[derive(Debug)]
pub enum ReleaseOutcome {
    DryRun(ReleaseOutput),
    Executed(ReleaseOutput),
    NothingToRelease,
}

/// Drives a release end to end: strategies, versions, changelogs, manifests,
/// lifecycle scripts, git and hooks.
pub struct ReleaseOperation<P, G, M, C, S> {
    project_provider: P,
    git_provider: Arc<G>,
    manifest_writer: M,
    changelog_writer: Arc<C>,
    script_runner: Arc<S>,
    registry: Arc<dyn RegistryClient>,
    hooks: Vec<Arc<dyn ReleaseHook>>,
}

impl<P, G, M, C, S> ReleaseOperation<P, G, M, C, S>
where
    P: ProjectProvider,
    G: GitProvider + 'static,
    M: ManifestWriter,
    C: ChangelogWriter + 'static,
    S: ScriptRunner + 'static,
{
    pub fn new(
        project_provider: P,
        git_provider: G,
        manifest_writer: M,
        changelog_writer: C,
        script_runner: S,
        registry: Arc<dyn RegistryClient>,
    ) -> Self {
        Self {
            project_provider,
            git_provider: Arc::new(git_provider),
            manifest_writer,
            changelog_writer: Arc::new(changelog_writer),
            script_runner: Arc::new(script_runner),
            registry,
            hooks: Vec::new(),
        }
    }

    /// Registers a hook run after the release is tagged. Hooks run in
    /// registration order.
    #[must_use]
    pub fn with_hook(mut self, hook: Arc<dyn ReleaseHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Computes the changeset without touching anything but the changeset
    /// file output.
    ///
    /// # Errors
    ///
    /// Returns an error if strategies, registry tags or versions cannot be
    /// resolved.
    pub async fn plan(
        &self,
        graph: &dyn WorkspaceGraph,
        config: &MonoweaveConfig,
    ) -> Result<(Changeset, Vec<PathBuf>)> {
        let git = self.git_provider.as_ref();
        let root = graph.root();

        let explicit = explicit_strategies(git, graph, config)?;
        let implicit = implicit_strategies(graph, &explicit.strategies, config.topological_dev);
        debug!(
            "[Strategies] {} explicit, {} implicit",
            explicit.strategies.len(),
            implicit.len()
        );
        let strategies = merge_strategies(explicit.strategies, implicit);
        if strategies.is_empty() {
            return Ok((Changeset::new(), explicit.version_files));
        }

        let tags = latest_tags(Arc::clone(&self.registry), graph, config).await?;

        let remote_url = match git.remote_url(root, &config.git.remote) {
            Ok(url) => url,
            Err(err) => {
                debug!("[Git] No remote url for {}: {err}", config.git.remote);
                None
            }
        };
        let changeset = ChangesetBuilder::new(graph, config, &tags)
            .with_remote_url(remote_url)
            .build(&strategies)?;

        Ok((changeset, explicit.version_files))
    }

    /// # Errors
    ///
    /// Returns the first fatal failure. Manifests patched for the lifecycle
    /// scripts are restored before a script failure is returned unless
    /// versions are persisted.
    pub async fn execute(
        &self,
        config: &MonoweaveConfig,
        input: &ReleaseInput,
        stdout: &mut (dyn Write + Send),
    ) -> Result<ReleaseOutcome> {
        let graph = self
            .project_provider
            .discover(&config.cwd, config.package_group_manifest_field.as_deref())?;
        let root = graph.root().to_path_buf();
        let git = self.git_provider.as_ref();

        let (changeset, version_files) = self.plan(graph.as_ref(), config).await?;

        if changeset.is_empty() {
            write_changeset_file(config, &changeset, stdout)?;
            info!("[Changeset] No packages to release");
            return Ok(ReleaseOutcome::NothingToRelease);
        }
        info!(
            "[Changeset] {} package(s) to release, highest strategy {}",
            changeset.len(),
            highest_strategy(&changeset)
        );

        if input.refresh_changelogs {
            refresh_changelogs(git, &root, config);
        }
        let changelog_files = write_changelogs(
            Arc::clone(&self.changelog_writer),
            graph.as_ref(),
            config,
            &changeset,
        )
        .await?;
        let changeset_file = write_changeset_file(config, &changeset, stdout)?;

        let patched =
            patch_manifests(&self.manifest_writer, graph.as_ref(), config, &changeset)?;
        let lifecycle = run_lifecycle_scripts(
            Arc::clone(&self.script_runner),
            graph.as_ref(),
            config,
            &changeset,
            &config.lifecycle_scripts,
        )
        .await;
        if !config.persist_versions {
            restore_manifests(&self.manifest_writer, &patched)?;
        }
        lifecycle?;

        let commit = if config.auto_commit && !config.dry_run {
            let files = committed_files(config, &patched, &changelog_files);
            Some(commit_release(git, &root, config, &files, &version_files)?)
        } else {
            None
        };

        let tags = if config.git.tag {
            create_release_tags(git, &root, config, &changeset)
        } else {
            Vec::new()
        };
        push_release(git, &root, config)?;

        run_lifecycle_scripts(
            Arc::clone(&self.script_runner),
            graph.as_ref(),
            config,
            &changeset,
            &config.post_release_scripts,
        )
        .await?;

        run_release_hooks(&self.hooks, config, &changeset).await?;

        let output = ReleaseOutput {
            changeset,
            version_files,
            changelog_files,
            changeset_file,
            commit,
            tags,
        };
        Ok(if config.dry_run {
            ReleaseOutcome::DryRun(output)
        } else {
            ReleaseOutcome::Executed(output)
        })
    }
}

fn committed_files(
    config: &MonoweaveConfig,
    patched: &PatchedManifests,
    changelog_files: &[PathBuf],
) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    if config.persist_versions {
        files.extend(patched.paths().cloned());
    }
    files.extend(changelog_files.iter().cloned());
    debug!("[Git] Staging {} file(s)", files.len());
    files
}
