use crate::{GitError, Result};

use super::Repository;

impl Repository {
    /// # Errors
    ///
    /// Returns [`GitError::DetachedHead`] if HEAD is not on a branch.
    pub fn current_branch(&self) -> Result<String> {
        let head = self.inner.head()?;

        if !head.is_branch() {
            return Err(GitError::DetachedHead);
        }

        head.shorthand()
            .map(String::from)
            .ok_or(GitError::DetachedHead)
    }

    /// Short name of the configured upstream of the current branch, e.g. `origin/main`.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::NoUpstream`] if the current branch tracks nothing.
    pub fn tracking_branch(&self) -> Result<String> {
        let branch = self.current_branch()?;
        let upstream = self
            .inner
            .branch_upstream_name(&format!("refs/heads/{branch}"))
            .map_err(|_| GitError::NoUpstream {
                branch: branch.clone(),
            })?;
        let upstream = upstream.as_str().ok_or(GitError::NoUpstream { branch })?;

        Ok(upstream
            .strip_prefix("refs/remotes/")
            .unwrap_or(upstream)
            .to_string())
    }
}
