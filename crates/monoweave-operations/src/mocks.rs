use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use monoweave_core::{Changeset, CommitMessage, DistTags, Workspace};
use monoweave_git::{CommitInfo, TagInfo, TaggedCommit};
use monoweave_manifest::ManifestPatch;
use monoweave_project::{InMemoryWorkspaceGraph, MonoweaveConfig, WorkspaceGraph};
use monoweave_registry::{RegistryClient, RegistryError};

use crate::Result;
use crate::error::OperationError;
use crate::traits::{
    ChangelogWriter, GitProvider, HookError, ManifestWriter, ProjectProvider, ReleaseHook,
    ScriptJob, ScriptRunner,
};

pub const ROOT: &str = "/mock/repo";

/// Named, publishable workspace under `packages/<name>`.
///
/// # Panics
///
/// Panics if `version` is not valid semver.
#[must_use]
pub fn workspace(name: &str, version: &str) -> Workspace {
    Workspace {
        name: Some(name.to_string()),
        version: Some(version.parse().expect("valid version")),
        path: Path::new(ROOT).join("packages").join(name),
        ..Workspace::default()
    }
}

#[must_use]
pub fn private_root() -> Workspace {
    Workspace {
        path: PathBuf::from(ROOT),
        private: true,
        ..Workspace::default()
    }
}

/// Graph with an anonymous private root followed by `workspaces`.
#[must_use]
pub fn graph(workspaces: Vec<Workspace>) -> InMemoryWorkspaceGraph {
    let mut all = vec![private_root()];
    all.extend(workspaces);
    InMemoryWorkspaceGraph::new(PathBuf::from(ROOT), all)
}

#[must_use]
pub fn config() -> MonoweaveConfig {
    MonoweaveConfig {
        cwd: PathBuf::from(ROOT),
        ..MonoweaveConfig::default()
    }
}

pub struct MockProjectProvider {
    graph: Arc<InMemoryWorkspaceGraph>,
}

impl MockProjectProvider {
    #[must_use]
    pub fn new(graph: InMemoryWorkspaceGraph) -> Self {
        Self {
            graph: Arc::new(graph),
        }
    }
}

impl ProjectProvider for MockProjectProvider {
    fn discover(
        &self,
        _start_dir: &Path,
        _group_field: Option<&str>,
    ) -> Result<Arc<dyn WorkspaceGraph>> {
        Ok(self.graph.clone())
    }
}

#[derive(Default)]
pub struct MockGitProvider {
    commits: Vec<CommitMessage>,
    diffs: HashMap<String, Vec<PathBuf>>,
    deleted: Vec<PathBuf>,
    tagged: Option<TaggedCommit>,
    head_sha: Option<String>,
    upstream: Option<String>,
    failing_tags: BTreeSet<String>,
    log_ranges: Arc<Mutex<Vec<(String, String)>>>,
    staged: Arc<Mutex<Vec<PathBuf>>>,
    commit_messages: Arc<Mutex<Vec<String>>>,
    tags: Arc<Mutex<Vec<String>>>,
    pushes: Arc<Mutex<Vec<String>>>,
    checkouts: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MockGitProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a commit to the log touching `paths`, relative to the root.
    #[must_use]
    pub fn with_commit(mut self, sha: &str, body: &str, paths: &[&str]) -> Self {
        self.commits.push(CommitMessage::new(sha, body));
        self.diffs
            .insert(sha.to_string(), paths.iter().map(PathBuf::from).collect());
        self
    }

    #[must_use]
    pub fn with_tagged_commit(mut self, sha: &str, tag: Option<&str>) -> Self {
        self.tagged = Some(TaggedCommit {
            sha: sha.to_string(),
            tag: tag.map(str::to_string),
        });
        self
    }

    #[must_use]
    pub fn with_head(mut self, sha: &str) -> Self {
        self.head_sha = Some(sha.to_string());
        self
    }

    #[must_use]
    pub fn with_upstream(mut self, branch: &str) -> Self {
        self.upstream = Some(branch.to_string());
        self
    }

    #[must_use]
    pub fn with_deleted_upstream(mut self, path: &str) -> Self {
        self.deleted.push(PathBuf::from(path));
        self
    }

    #[must_use]
    pub fn with_failing_tag(mut self, tag: &str) -> Self {
        self.failing_tags.insert(tag.to_string());
        self
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn log_ranges(&self) -> Vec<(String, String)> {
        self.log_ranges.lock().expect("lock poisoned").clone()
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn staged(&self) -> Vec<PathBuf> {
        self.staged.lock().expect("lock poisoned").clone()
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn commit_messages(&self) -> Vec<String> {
        self.commit_messages.lock().expect("lock poisoned").clone()
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        self.tags.lock().expect("lock poisoned").clone()
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn pushes(&self) -> Vec<String> {
        self.pushes.lock().expect("lock poisoned").clone()
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn checkouts(&self) -> Vec<Vec<String>> {
        self.checkouts.lock().expect("lock poisoned").clone()
    }
}

impl GitProvider for MockGitProvider {
    fn log(&self, _project_root: &Path, from: &str, to: &str) -> Result<Vec<CommitMessage>> {
        self.log_ranges
            .lock()
            .expect("lock poisoned")
            .push((from.to_string(), to.to_string()));
        Ok(self.commits.clone())
    }

    fn diff_tree(&self, _project_root: &Path, refspec: &str) -> Result<Vec<PathBuf>> {
        Ok(self.diffs.get(refspec).cloned().unwrap_or_default())
    }

    fn deleted_files(
        &self,
        _project_root: &Path,
        _refspec: &str,
        _prefix: &Path,
    ) -> Result<Vec<PathBuf>> {
        Ok(self.deleted.clone())
    }

    fn last_tagged_commit(
        &self,
        _project_root: &Path,
        _include_prerelease: bool,
    ) -> Result<TaggedCommit> {
        Ok(self.tagged.clone().unwrap_or_else(|| TaggedCommit {
            sha: "root-sha".to_string(),
            tag: None,
        }))
    }

    fn resolve_sha(&self, _project_root: &Path, refspec: &str) -> Result<String> {
        Ok(match (&self.head_sha, refspec) {
            (Some(head), "HEAD") => head.clone(),
            _ => refspec.to_string(),
        })
    }

    fn upstream_branch(&self, _project_root: &Path, _remote: &str) -> Result<String> {
        self.upstream
            .clone()
            .ok_or_else(|| monoweave_git::GitError::NoUpstream {
                branch: "main".to_string(),
            })
            .map_err(OperationError::from)
    }

    fn checkout_from_upstream(
        &self,
        _project_root: &Path,
        files: &[String],
        _remote: &str,
    ) -> Result<()> {
        self.checkouts
            .lock()
            .expect("lock poisoned")
            .push(files.to_vec());
        Ok(())
    }

    fn stage_files(&self, _project_root: &Path, paths: &[&Path]) -> Result<()> {
        self.staged
            .lock()
            .expect("lock poisoned")
            .extend(paths.iter().map(|path| path.to_path_buf()));
        Ok(())
    }

    fn commit(&self, _project_root: &Path, message: &str) -> Result<CommitInfo> {
        self.commit_messages
            .lock()
            .expect("lock poisoned")
            .push(message.to_string());
        Ok(CommitInfo {
            sha: "release-sha".to_string(),
            message: message.to_string(),
        })
    }

    fn create_tag(&self, _project_root: &Path, tag_name: &str, _message: &str) -> Result<TagInfo> {
        if self.failing_tags.contains(tag_name) {
            return Err(monoweave_git::GitError::RefNotFound {
                refspec: tag_name.to_string(),
            }
            .into());
        }
        self.tags
            .lock()
            .expect("lock poisoned")
            .push(tag_name.to_string());
        Ok(TagInfo {
            name: tag_name.to_string(),
            target_sha: "release-sha".to_string(),
        })
    }

    fn push(&self, _project_root: &Path, remote: &str, _dry_run: bool) -> Result<()> {
        self.pushes
            .lock()
            .expect("lock poisoned")
            .push(format!("push {remote}"));
        Ok(())
    }

    fn push_tags(&self, _project_root: &Path, remote: &str, _dry_run: bool) -> Result<()> {
        self.pushes
            .lock()
            .expect("lock poisoned")
            .push(format!("push --tags {remote}"));
        Ok(())
    }

    fn remote_url(&self, _project_root: &Path, _remote: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

#[derive(Default)]
pub struct MockManifestWriter {
    patches: Arc<Mutex<Vec<(PathBuf, ManifestPatch)>>>,
    restored: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockManifestWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn patches(&self) -> Vec<(PathBuf, ManifestPatch)> {
        self.patches.lock().expect("lock poisoned").clone()
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn restored(&self) -> Vec<PathBuf> {
        self.restored.lock().expect("lock poisoned").clone()
    }
}

impl ManifestWriter for MockManifestWriter {
    fn read_raw(&self, manifest_path: &Path) -> Result<String> {
        Ok(format!("original:{}", manifest_path.display()))
    }

    fn patch(&self, manifest_path: &Path, patch: &ManifestPatch) -> Result<bool> {
        self.patches
            .lock()
            .expect("lock poisoned")
            .push((manifest_path.to_path_buf(), patch.clone()));
        Ok(true)
    }

    fn restore(&self, manifest_path: &Path, _content: &str) -> Result<()> {
        self.restored
            .lock()
            .expect("lock poisoned")
            .push(manifest_path.to_path_buf());
        Ok(())
    }
}

#[derive(Default)]
pub struct MockChangelogWriter {
    entries: Arc<Mutex<Vec<(PathBuf, String)>>>,
}

impl MockChangelogWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in write order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn entries(&self) -> Vec<(PathBuf, String)> {
        self.entries.lock().expect("lock poisoned").clone()
    }
}

impl ChangelogWriter for MockChangelogWriter {
    fn prepend(&self, path: &Path, entry: &str) -> Result<()> {
        self.entries
            .lock()
            .expect("lock poisoned")
            .push((path.to_path_buf(), entry.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct MockScriptRunner {
    failing: BTreeSet<String>,
    delay: Option<Duration>,
    runs: Arc<Mutex<Vec<String>>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl MockScriptRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_failing(mut self, package: &str) -> Self {
        self.failing.insert(package.to_string());
        self
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// `<package>:<script>` in completion order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn runs(&self) -> Vec<String> {
        self.runs.lock().expect("lock poisoned").clone()
    }

    #[must_use]
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScriptRunner for MockScriptRunner {
    async fn run(&self, job: ScriptJob) -> Result<()> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(current, Ordering::SeqCst);

        match self.delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => tokio::task::yield_now().await,
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&job.package) {
            return Err(OperationError::LifecycleScript {
                package: job.package,
                script: job.script,
                status: "exit status: 1".to_string(),
                stderr: "failed".to_string(),
            });
        }

        self.runs
            .lock()
            .expect("lock poisoned")
            .push(format!("{}:{}", job.package, job.script));
        Ok(())
    }
}

#[derive(Default)]
pub struct MockRegistryClient {
    tags: BTreeMap<String, DistTags>,
}

impl MockRegistryClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_tags(mut self, package: &str, tags: &[(&str, &str)]) -> Self {
        self.tags.insert(
            package.to_string(),
            tags.iter()
                .map(|(tag, version)| ((*tag).to_string(), (*version).to_string()))
                .collect(),
        );
        self
    }
}

#[async_trait]
impl RegistryClient for MockRegistryClient {
    async fn dist_tags(
        &self,
        registry: &str,
        package: &str,
    ) -> std::result::Result<DistTags, RegistryError> {
        self.tags
            .get(package)
            .cloned()
            .ok_or_else(|| RegistryError::Status {
                url: format!("{registry}/-/package/{package}/dist-tags"),
                status: 404,
            })
    }
}

pub struct RecordingHook {
    name: String,
    fail: bool,
    calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingHook {
    #[must_use]
    pub fn new(name: &str, calls: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name: name.to_string(),
            fail: false,
            calls,
        }
    }

    #[must_use]
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl ReleaseHook for RecordingHook {
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_release_available(
        &self,
        _config: &MonoweaveConfig,
        changeset: &Changeset,
    ) -> std::result::Result<(), HookError> {
        self.calls
            .lock()
            .expect("lock poisoned")
            .push(format!("{}:{}", self.name, changeset.len()));
        if self.fail {
            return Err("hook exploded".into());
        }
        Ok(())
    }
}
