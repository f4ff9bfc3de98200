use std::path::{Path, PathBuf};
use std::sync::Arc;

use monoweave_core::Changeset;
use monoweave_project::{MonoweaveConfig, WorkspaceGraph};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::Result;
use crate::traits::{ChangelogWriter, GitProvider};

/// Placeholder in the changelog filename replaced by each package directory.
pub const PACKAGE_DIR_TOKEN: &str = "<packageDir>";

/// Destination of every changelog entry of a changeset. Entries are per
/// package with `<packageDir>`, otherwise one aggregated entry sorted by
/// package name.
#[must_use]
pub fn changelog_targets(
    graph: &dyn WorkspaceGraph,
    config: &MonoweaveConfig,
    changeset: &Changeset,
) -> Vec<(PathBuf, String)> {
    let Some(filename) = config.changelog_filename.as_deref() else {
        return Vec::new();
    };

    if filename.contains(PACKAGE_DIR_TOKEN) {
        return changeset
            .iter()
            .filter_map(|(name, record)| {
                let entry = record.changelog.clone().filter(|e| !e.is_empty())?;
                let workspace = graph.workspace_by_name(name)?;
                let path = filename.replace(PACKAGE_DIR_TOKEN, &workspace.path.to_string_lossy());
                Some((config.cwd.join(path), entry))
            })
            .collect();
    }

    let entry = changeset
        .values()
        .filter_map(|record| record.changelog.as_deref())
        .filter(|entry| !entry.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    let entry = entry.trim();
    if entry.is_empty() {
        return Vec::new();
    }
    vec![(config.cwd.join(filename), entry.to_string())]
}

/// Prepends the changelog entries of a changeset, with at most
/// `max_concurrent_writes` files in flight. Returns the files written.
///
/// # Errors
///
/// Returns the first changelog that cannot be read or written.
pub async fn write_changelogs<C: ChangelogWriter + 'static>(
    writer: Arc<C>,
    graph: &dyn WorkspaceGraph,
    config: &MonoweaveConfig,
    changeset: &Changeset,
) -> Result<Vec<PathBuf>> {
    let targets = changelog_targets(graph, config, changeset);

    if config.skip_writes() {
        for (path, _) in &targets {
            info!("[Dry Run] [Changelog] Would update {}", path.display());
        }
        return Ok(Vec::new());
    }

    let permits = match config.max_concurrent_writes {
        0 => Semaphore::MAX_PERMITS,
        limit => limit,
    };
    let semaphore = Arc::new(Semaphore::new(permits));

    let mut tasks = JoinSet::new();
    for (path, entry) in targets {
        let writer = Arc::clone(&writer);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            tokio::task::spawn_blocking(move || {
                writer.prepend(&path, &entry)?;
                info!("[Changelog] Updated {}", path.display());
                Ok::<_, crate::error::OperationError>(path)
            })
            .await?
        });
    }

    let mut written = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        written.push(joined??);
    }
    written.sort();
    Ok(written)
}

/// Checks the changelog files out from the upstream branch so new entries
/// land on top of what is already released. Failures are ignored.
pub fn refresh_changelogs<G: GitProvider + ?Sized>(
    git: &G,
    project_root: &Path,
    config: &MonoweaveConfig,
) {
    if config.dry_run {
        return;
    }
    let Some(filename) = config.changelog_filename.as_deref() else {
        return;
    };

    let glob = filename.replace(PACKAGE_DIR_TOKEN, "**");
    match git.checkout_from_upstream(project_root, &[glob], &config.git.remote) {
        Ok(()) => debug!("[Changelog] Refreshed changelogs from upstream"),
        Err(err) => warn!("[Changelog] Refreshing changelogs failed, ignoring: {err}"),
    }
}
