use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use monoweave_core::{StrategyMap, StrategyType};
use monoweave_parse::parse_deferred_version;
use monoweave_project::{MonoweaveConfig, WorkspaceGraph};
use tracing::debug;

use super::explicit::ExplicitStrategies;
use crate::Result;
use crate::error::OperationError;
use crate::traits::GitProvider;

/// Markdown files directly inside `folder`, sorted. A missing folder has none.
///
/// # Errors
///
/// Returns `OperationError::VersionFileRead` if the folder exists but cannot
/// be listed.
pub fn discover_version_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(OperationError::VersionFileRead {
                path: folder.to_path_buf(),
                source,
            });
        }
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| OperationError::VersionFileRead {
            path: folder.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// File names the upstream tip deleted from the version folder. Any failure
/// to determine them means nothing has been consumed yet.
fn consumed_upstream<G: GitProvider + ?Sized>(
    git: &G,
    project_root: &Path,
    folder: &Path,
    remote: &str,
) -> BTreeSet<PathBuf> {
    let prefix = folder.strip_prefix(project_root).unwrap_or(folder);

    let deleted = git
        .upstream_branch(project_root, remote)
        .and_then(|upstream| git.deleted_files(project_root, &upstream, prefix));

    match deleted {
        Ok(paths) => paths
            .into_iter()
            .filter_map(|path| path.file_name().map(PathBuf::from))
            .collect(),
        Err(err) => {
            debug!("[Manual Version Strategies] Could not inspect upstream: {err}");
            BTreeSet::new()
        }
    }
}

/// Aggregates every pending version file into one strategy map. Strategies
/// merge to the highest, changelog texts are concatenated in file order.
///
/// # Errors
///
/// Fails on unreadable or malformed files, unknown or private packages, and
/// strategy tokens other than `patch`, `minor` and `major`.
pub fn manual_strategies<G: GitProvider + ?Sized>(
    git: &G,
    graph: &dyn WorkspaceGraph,
    config: &MonoweaveConfig,
) -> Result<ExplicitStrategies> {
    let folder = config.version_folder();
    let consumed = consumed_upstream(git, graph.root(), &folder, &config.git.remote);

    let mut strategies = StrategyMap::new();
    let mut version_files = Vec::new();

    for file in discover_version_files(&folder)? {
        if file
            .file_name()
            .is_some_and(|name| consumed.contains(Path::new(name)))
        {
            debug!(
                "[Manual Version Strategies] {} was already released upstream",
                file.display()
            );
            continue;
        }

        let content = std::fs::read_to_string(&file).map_err(|source| {
            OperationError::VersionFileRead {
                path: file.clone(),
                source,
            }
        })?;
        let record = parse_deferred_version(&content).map_err(|source| {
            OperationError::FrontMatter {
                path: file.clone(),
                source,
            }
        })?;

        for (name, token) in &record.strategies {
            let Some(workspace) = graph.workspace_by_name(name) else {
                return Err(OperationError::UnknownPackage {
                    name: name.clone(),
                    file: file.clone(),
                });
            };
            if workspace.private {
                return Err(OperationError::PrivatePackage {
                    name: name.clone(),
                    file: file.clone(),
                });
            }

            let Some(token) = token.as_deref() else {
                continue;
            };
            let strategy = StrategyType::from_manual_token(token).map_err(|_| {
                OperationError::InvalidStrategy {
                    name: name.clone(),
                    strategy: token.trim().to_string(),
                    file: file.clone(),
                }
            })?;
            let Some(strategy) = strategy else {
                continue;
            };

            let entry = strategies.entry(name.clone()).or_default();
            entry.strategy_type = entry.strategy_type.merge(strategy);
            let changelog = match entry.changelog.take() {
                Some(previous) if !previous.is_empty() => {
                    format!("{previous}\n\n{}", record.changelog)
                }
                _ => record.changelog.clone(),
            };
            entry.changelog = Some(changelog.trim().to_string());
        }

        version_files.push(file);
    }

    Ok(ExplicitStrategies {
        strategies,
        version_files,
    })
}
