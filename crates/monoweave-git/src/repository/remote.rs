use std::process::Command;

use crate::{GitError, Repository, Result};

/// GitHub Actions variables that determine the upstream branch in CI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GithubRefs {
    pub action: Option<String>,
    pub event_name: Option<String>,
    pub git_ref: Option<String>,
    pub base_ref: Option<String>,
}

impl GithubRefs {
    #[must_use]
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            action: var("GITHUB_ACTION"),
            event_name: var("GITHUB_EVENT_NAME"),
            git_ref: var("GITHUB_REF"),
            base_ref: var("GITHUB_BASE_REF"),
        }
    }

    fn upstream(&self, remote: &str) -> Option<String> {
        self.action.as_ref()?;
        match self.event_name.as_deref() {
            Some("push") => self.git_ref.clone(),
            Some("pull_request") => self
                .base_ref
                .as_ref()
                .map(|base| format!("{remote}/{base}")),
            _ => None,
        }
    }
}

impl Repository {
    /// # Errors
    ///
    /// Returns an error if the remote lookup fails.
    pub fn remote_url(&self, remote: &str) -> Result<Option<String>> {
        let Ok(remote) = self.inner.find_remote(remote) else {
            return Ok(None);
        };

        Ok(remote.url().map(String::from))
    }

    /// Branch that releases are compared against: the CI-provided ref when
    /// running in GitHub Actions, otherwise the tracking branch.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::NoUpstream`] if neither source names a branch.
    pub fn upstream_branch(&self, remote: &str, github: &GithubRefs) -> Result<String> {
        if let Some(upstream) = github.upstream(remote) {
            return Ok(upstream);
        }
        self.tracking_branch()
    }

    /// # Errors
    ///
    /// Returns [`GitError::Command`] if `git push` fails.
    pub fn push(&self, remote: &str, dry_run: bool) -> Result<()> {
        let mut args = vec!["push", "--no-verify"];
        if dry_run {
            args.push("--dry-run");
        }
        args.push(remote);
        self.run_git(&args).map(drop)
    }

    /// # Errors
    ///
    /// Returns [`GitError::Command`] if `git push --tags` fails.
    pub fn push_tags(&self, remote: &str, dry_run: bool) -> Result<()> {
        let mut args = vec!["push", "--tags"];
        if dry_run {
            args.push("--dry-run");
        }
        args.push(remote);
        self.run_git(&args).map(drop)
    }

    /// Restores `files` (pathspecs) from the upstream branch.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream cannot be determined or checkout fails.
    pub fn checkout_from_upstream(
        &self,
        files: &[String],
        remote: &str,
        github: &GithubRefs,
    ) -> Result<()> {
        let branch = self.upstream_branch(remote, github)?;
        let mut args = vec!["checkout", branch.as_str(), "--"];
        args.extend(files.iter().map(String::as_str));
        self.run_git(&args).map(drop)
    }

    fn run_git(&self, args: &[&str]) -> Result<String> {
        let command = args.join(" ");
        tracing::debug!("[Git] git {command}");

        let output = Command::new("git")
            .args(args)
            .current_dir(self.root())
            .output()
            .map_err(|source| GitError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(GitError::Command {
                command,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
