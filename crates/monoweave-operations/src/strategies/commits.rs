use std::collections::BTreeSet;
use std::path::Path;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use monoweave_core::CommitMessage;
use monoweave_project::{MonoweaveConfig, WorkspaceGraph};
use regex::{Regex, RegexBuilder};
use tracing::{debug, error, warn};

use crate::Result;
use crate::error::OperationError;
use crate::traits::GitProvider;

/// Regexes matched against `sha\nbody` of every commit in range.
#[derive(Debug, Clone, Default)]
pub struct CommitFilter {
    patterns: Vec<Regex>,
}

impl CommitFilter {
    /// # Errors
    ///
    /// Returns `OperationError::CommitIgnorePattern` for an invalid regex.
    pub fn new(patterns: &[String]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .multi_line(true)
                    .build()
                    .map_err(|source| OperationError::CommitIgnorePattern {
                        pattern: pattern.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    #[must_use]
    pub fn is_ignored(&self, commit: &CommitMessage) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let subject = commit.ignore_subject();
        self.patterns.iter().any(|pattern| pattern.is_match(&subject))
    }
}

/// Compiles changeset ignore globs. `*` does not cross directory separators.
///
/// # Errors
///
/// Returns `OperationError::ChangesetIgnorePattern` for an invalid glob.
pub fn changeset_ignore_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|source| OperationError::ChangesetIgnorePattern {
                pattern: pattern.clone(),
                source,
            })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|source| OperationError::ChangesetIgnorePattern {
            pattern: patterns.join(", "),
            source,
        })
}

/// Start and end revisions of the release range, or `None` when the target
/// revision is the last release tag and there is nothing to do.
///
/// # Errors
///
/// Returns an error if either revision cannot be resolved.
pub fn commit_range<G: GitProvider + ?Sized>(
    git: &G,
    project_root: &Path,
    config: &MonoweaveConfig,
) -> Result<Option<(String, String)>> {
    let to = config.git.commit_sha.clone();

    let from = if let Some(base) = &config.git.base_branch {
        base.clone()
    } else {
        let tagged = git.last_tagged_commit(project_root, config.prerelease)?;
        if tagged.tag.is_some() && git.resolve_sha(project_root, &to)? == tagged.sha {
            debug!(
                "[Commits] {} is already tagged, nothing to release",
                tagged.sha
            );
            return Ok(None);
        }
        tagged.sha
    };

    Ok(Some((from, to)))
}

/// Commits in the release range, oldest first, minus those matching a commit
/// ignore pattern.
///
/// # Errors
///
/// Returns an error if the range cannot be resolved or a pattern is invalid.
pub fn harvest_commits<G: GitProvider + ?Sized>(
    git: &G,
    project_root: &Path,
    config: &MonoweaveConfig,
) -> Result<Vec<CommitMessage>> {
    let Some((from, to)) = commit_range(git, project_root, config)? else {
        return Ok(Vec::new());
    };

    let filter = CommitFilter::new(&config.commit_ignore_patterns)?;
    let commits = git.log(project_root, &from, &to)?;

    Ok(commits
        .into_iter()
        .filter(|commit| {
            let ignored = filter.is_ignored(commit);
            if ignored {
                debug!("[Commits] Skipping ignored commit {}", commit.sha);
            }
            !ignored
        })
        .collect())
}

/// Names of the workspaces touched by one commit, sorted and deduplicated.
///
/// Paths matching `ignore` are dropped first. Paths outside every workspace are
/// logged and skipped, as are paths owned by an anonymous private root. A path
/// owned by any other unnamed workspace is logged as an error and skipped.
///
/// # Errors
///
/// Returns an error if the files changed by `sha` cannot be listed.
pub fn modified_packages<G: GitProvider + ?Sized>(
    git: &G,
    graph: &dyn WorkspaceGraph,
    ignore: &GlobSet,
    sha: &str,
) -> Result<Vec<String>> {
    let paths = git.diff_tree(graph.root(), sha)?;
    let top_level_path = graph.top_level().path.clone();

    let mut names = BTreeSet::new();
    for path in paths {
        if ignore.is_match(&path) {
            continue;
        }

        let Some(workspace) = graph.resolve_by_path(&path) else {
            warn!("[Commits] {} is outside every workspace", path.display());
            continue;
        };

        match &workspace.name {
            Some(name) => {
                names.insert(name.clone());
            }
            None if workspace.private && workspace.path == top_level_path => {}
            None => {
                let err = OperationError::UnresolvedPath { path };
                error!("[Commits] Skipping path in {sha}: {err}");
            }
        }
    }

    Ok(names.into_iter().collect())
}
