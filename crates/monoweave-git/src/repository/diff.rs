use std::path::{Path, PathBuf};

use crate::Result;

use super::Repository;

impl Repository {
    /// Files touched by a single commit, relative to the repository root.
    ///
    /// Root commits are diffed against the empty tree. Merge commits yield no
    /// paths, matching `git diff-tree` without `-m`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GitError::RefNotFound`] if the revision cannot be resolved.
    pub fn diff_tree(&self, refspec: &str) -> Result<Vec<PathBuf>> {
        self.collect_diff(refspec, None, false)
    }

    /// Files under `prefix` that the commit at `refspec` deleted.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GitError::RefNotFound`] if the revision cannot be resolved.
    pub fn deleted_files(&self, refspec: &str, prefix: &Path) -> Result<Vec<PathBuf>> {
        let prefix = self.to_relative_path(prefix);
        self.collect_diff(refspec, Some(&prefix), true)
    }

    fn collect_diff(
        &self,
        refspec: &str,
        prefix: Option<&Path>,
        only_deleted: bool,
    ) -> Result<Vec<PathBuf>> {
        let commit = self.resolve_commit(refspec)?;
        if commit.parent_count() > 1 {
            return Ok(Vec::new());
        }

        let tree = commit.tree()?;
        let parent_tree = match commit.parents().next() {
            Some(parent) => Some(parent.tree()?),
            None => None,
        };

        let mut options = git2::DiffOptions::new();
        if let Some(prefix) = prefix.filter(|p| !p.as_os_str().is_empty()) {
            options.pathspec(prefix);
        }

        let diff =
            self.inner
                .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut options))?;

        let mut paths = Vec::new();
        for delta in diff.deltas() {
            if only_deleted && delta.status() != git2::Delta::Deleted {
                continue;
            }
            if let Some(path) = delta.new_file().path().or_else(|| delta.old_file().path()) {
                paths.push(path.to_path_buf());
            }
        }

        Ok(paths)
    }
}
