use crate::{CommitInfo, Result};

use super::Repository;

impl Repository {
    /// Lists commits in `from..to`, oldest first.
    ///
    /// When both revisions resolve to the same commit, that single commit is
    /// returned instead of an empty range. Commits with an empty message are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GitError::RefNotFound`] if either revision cannot be
    /// resolved, or an error if the revision walk fails.
    pub fn log(&self, from: &str, to: &str) -> Result<Vec<CommitInfo>> {
        let from_commit = self.resolve_commit(from)?;
        let to_commit = self.resolve_commit(to)?;

        if from_commit.id() == to_commit.id() {
            return Ok(commit_info(&to_commit).into_iter().collect());
        }

        let mut walk = self.inner.revwalk()?;
        walk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::REVERSE)?;
        walk.push(to_commit.id())?;
        walk.hide(from_commit.id())?;

        let mut commits = Vec::new();
        for oid in walk {
            let commit = self.inner.find_commit(oid?)?;
            if let Some(info) = commit_info(&commit) {
                commits.push(info);
            }
        }

        Ok(commits)
    }
}

fn commit_info(commit: &git2::Commit<'_>) -> Option<CommitInfo> {
    let message = String::from_utf8_lossy(commit.message_bytes())
        .trim_end()
        .to_string();
    if message.is_empty() {
        return None;
    }
    Some(CommitInfo {
        sha: commit.id().to_string(),
        message,
    })
}
