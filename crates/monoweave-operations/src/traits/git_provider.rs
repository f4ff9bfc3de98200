use std::path::{Path, PathBuf};

use monoweave_core::CommitMessage;
use monoweave_git::{CommitInfo, TagInfo, TaggedCommit};

use crate::Result;

pub trait GitProvider: Send + Sync {
    /// Commits in `from..to`, oldest first. Equal revisions yield that one commit.
    ///
    /// # Errors
    ///
    /// Returns an error if either revision cannot be resolved.
    fn log(&self, project_root: &Path, from: &str, to: &str) -> Result<Vec<CommitMessage>>;

    /// Paths touched by one commit, relative to the repository root.
    ///
    /// # Errors
    ///
    /// Returns an error if the revision cannot be resolved.
    fn diff_tree(&self, project_root: &Path, refspec: &str) -> Result<Vec<PathBuf>>;

    /// Paths under `prefix` deleted by the commit at `refspec`.
    ///
    /// # Errors
    ///
    /// Returns an error if the revision cannot be resolved.
    fn deleted_files(&self, project_root: &Path, refspec: &str, prefix: &Path)
    -> Result<Vec<PathBuf>>;

    /// # Errors
    ///
    /// Returns an error if `HEAD` cannot be resolved.
    fn last_tagged_commit(&self, project_root: &Path, include_prerelease: bool)
    -> Result<TaggedCommit>;

    /// # Errors
    ///
    /// Returns an error if the revision does not name a commit.
    fn resolve_sha(&self, project_root: &Path, refspec: &str) -> Result<String>;

    /// # Errors
    ///
    /// Returns an error if no upstream branch can be determined.
    fn upstream_branch(&self, project_root: &Path, remote: &str) -> Result<String>;

    /// # Errors
    ///
    /// Returns an error if the checkout fails.
    fn checkout_from_upstream(&self, project_root: &Path, files: &[String], remote: &str)
    -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if staging any of the files fails.
    fn stage_files(&self, project_root: &Path, paths: &[&Path]) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the commit cannot be created.
    fn commit(&self, project_root: &Path, message: &str) -> Result<CommitInfo>;

    /// # Errors
    ///
    /// Returns an error if the tag cannot be created or already exists.
    fn create_tag(&self, project_root: &Path, tag_name: &str, message: &str) -> Result<TagInfo>;

    /// # Errors
    ///
    /// Returns an error if the push fails.
    fn push(&self, project_root: &Path, remote: &str, dry_run: bool) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the push fails.
    fn push_tags(&self, project_root: &Path, remote: &str, dry_run: bool) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the repository cannot be opened.
    fn remote_url(&self, project_root: &Path, remote: &str) -> Result<Option<String>>;
}
