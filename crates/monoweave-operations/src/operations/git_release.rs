use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use monoweave_core::Changeset;
use monoweave_git::{CommitInfo, TagInfo};
use monoweave_project::MonoweaveConfig;
use tracing::{error, info};

use crate::Result;
use crate::error::OperationError;
use crate::traits::GitProvider;

/// Unique tags of a changeset; group members share one.
#[must_use]
pub fn release_tags(changeset: &Changeset) -> BTreeSet<String> {
    changeset
        .values()
        .filter_map(|record| record.tag.clone())
        .collect()
}

/// Deletes consumed version files, stages everything the release changed and
/// commits it.
///
/// # Errors
///
/// Returns an error if a version file cannot be removed or staging or
/// committing fails.
pub fn commit_release<G: GitProvider + ?Sized>(
    git: &G,
    project_root: &Path,
    config: &MonoweaveConfig,
    files: &[PathBuf],
    version_files: &[PathBuf],
) -> Result<CommitInfo> {
    for file in version_files {
        match std::fs::remove_file(file) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(OperationError::VersionFileWrite {
                    path: file.clone(),
                    source,
                });
            }
        }
    }

    let staged: Vec<&Path> = files
        .iter()
        .chain(version_files)
        .map(PathBuf::as_path)
        .collect();
    git.stage_files(project_root, &staged)?;

    let commit = git.commit(project_root, &config.auto_commit_message)?;
    info!("[Git] Committed {}", commit.sha);
    Ok(commit)
}

/// Creates one annotated tag per unique changeset tag. A tag that cannot be
/// created is logged and skipped. Dry run only logs.
pub fn create_release_tags<G: GitProvider + ?Sized>(
    git: &G,
    project_root: &Path,
    config: &MonoweaveConfig,
    changeset: &Changeset,
) -> Vec<TagInfo> {
    let mut created = Vec::new();
    for tag in release_tags(changeset) {
        if config.dry_run {
            info!("[Dry Run] [Tag] {tag}");
            continue;
        }

        match git.create_tag(project_root, &tag, &tag) {
            Ok(info) => {
                info!("[Tag] {tag}");
                created.push(info);
            }
            Err(err) => error!("[Tag] Failed {tag}: {err}"),
        }
    }
    created
}

/// Pushes the release commit and tags when pushing is enabled.
///
/// # Errors
///
/// Returns an error if a push fails.
pub fn push_release<G: GitProvider + ?Sized>(
    git: &G,
    project_root: &Path,
    config: &MonoweaveConfig,
) -> Result<()> {
    if !config.git.push || config.dry_run {
        return Ok(());
    }

    if config.auto_commit {
        git.push(project_root, &config.git.remote, config.dry_run)?;
    }
    if config.git.tag {
        git.push_tags(project_root, &config.git.remote, config.dry_run)?;
    }
    info!("[Git] Pushed to {}", config.git.remote);
    Ok(())
}
