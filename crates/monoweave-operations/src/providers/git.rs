use std::path::{Path, PathBuf};

use monoweave_core::CommitMessage;
use monoweave_git::{CommitInfo, GithubRefs, Repository, TagInfo, TaggedCommit};

use crate::Result;
use crate::traits::GitProvider;

pub struct Git2Provider {
    github: GithubRefs,
}

impl Git2Provider {
    /// Reads the GitHub Actions environment once for upstream resolution.
    #[must_use]
    pub fn new() -> Self {
        Self {
            github: GithubRefs::from_env(),
        }
    }

    #[must_use]
    pub fn with_github_refs(github: GithubRefs) -> Self {
        Self { github }
    }
}

/// Rewrites repository-relative paths relative to `project_root`, dropping
/// those outside of it.
fn relative_to_project(
    repo: &Repository,
    project_root: &Path,
    paths: Vec<PathBuf>,
) -> Vec<PathBuf> {
    let project_root =
        dunce::canonicalize(project_root).unwrap_or_else(|_| project_root.to_path_buf());
    let Ok(prefix) = project_root.strip_prefix(repo.root()) else {
        return paths;
    };

    paths
        .into_iter()
        .filter_map(|path| path.strip_prefix(prefix).ok().map(Path::to_path_buf))
        .collect()
}

impl Default for Git2Provider {
    fn default() -> Self {
        Self::new()
    }
}

impl GitProvider for Git2Provider {
    fn log(&self, project_root: &Path, from: &str, to: &str) -> Result<Vec<CommitMessage>> {
        let repo = Repository::open(project_root)?;
        Ok(repo
            .log(from, to)?
            .into_iter()
            .map(|commit| CommitMessage::new(commit.sha, commit.message))
            .collect())
    }

    fn diff_tree(&self, project_root: &Path, refspec: &str) -> Result<Vec<PathBuf>> {
        let repo = Repository::open(project_root)?;
        let paths = repo.diff_tree(refspec)?;
        Ok(relative_to_project(&repo, project_root, paths))
    }

    fn deleted_files(
        &self,
        project_root: &Path,
        refspec: &str,
        prefix: &Path,
    ) -> Result<Vec<PathBuf>> {
        let repo = Repository::open(project_root)?;
        let paths = repo.deleted_files(refspec, prefix)?;
        Ok(relative_to_project(&repo, project_root, paths))
    }

    fn last_tagged_commit(
        &self,
        project_root: &Path,
        include_prerelease: bool,
    ) -> Result<TaggedCommit> {
        let repo = Repository::open(project_root)?;
        Ok(repo.last_tagged_commit(include_prerelease)?)
    }

    fn resolve_sha(&self, project_root: &Path, refspec: &str) -> Result<String> {
        let repo = Repository::open(project_root)?;
        Ok(repo.resolve_sha(refspec)?)
    }

    fn upstream_branch(&self, project_root: &Path, remote: &str) -> Result<String> {
        let repo = Repository::open(project_root)?;
        Ok(repo.upstream_branch(remote, &self.github)?)
    }

    fn checkout_from_upstream(
        &self,
        project_root: &Path,
        files: &[String],
        remote: &str,
    ) -> Result<()> {
        let repo = Repository::open(project_root)?;
        Ok(repo.checkout_from_upstream(files, remote, &self.github)?)
    }

    fn stage_files(&self, project_root: &Path, paths: &[&Path]) -> Result<()> {
        let repo = Repository::open(project_root)?;
        Ok(repo.stage_files(paths)?)
    }

    fn commit(&self, project_root: &Path, message: &str) -> Result<CommitInfo> {
        let repo = Repository::open(project_root)?;
        Ok(repo.commit(message)?)
    }

    fn create_tag(&self, project_root: &Path, tag_name: &str, message: &str) -> Result<TagInfo> {
        let repo = Repository::open(project_root)?;
        Ok(repo.create_tag(tag_name, message)?)
    }

    fn push(&self, project_root: &Path, remote: &str, dry_run: bool) -> Result<()> {
        let repo = Repository::open(project_root)?;
        Ok(repo.push(remote, dry_run)?)
    }

    fn push_tags(&self, project_root: &Path, remote: &str, dry_run: bool) -> Result<()> {
        let repo = Repository::open(project_root)?;
        Ok(repo.push_tags(remote, dry_run)?)
    }

    fn remote_url(&self, project_root: &Path, remote: &str) -> Result<Option<String>> {
        let repo = Repository::open(project_root)?;
        Ok(repo.remote_url(remote)?)
    }
}
