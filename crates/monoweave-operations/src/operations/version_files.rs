use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use monoweave_core::{DeferredVersionRecord, LATEST_TAG, RegistryTagSet};
use monoweave_parse::{deferred_version_file_name, serialize_deferred_version};
use monoweave_project::{MonoweaveConfig, WorkspaceGraph};
use monoweave_registry::RegistryClient;
use tracing::info;

use super::registry_tags::latest_tags;
use crate::Result;
use crate::error::OperationError;
use crate::strategies::{changeset_ignore_set, harvest_commits, modified_packages};
use crate::traits::GitProvider;

/// A package offered for a manual release with its published version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageCandidate {
    pub name: String,
    pub current_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualCandidates {
    /// Touched since the last release.
    pub suggested: Vec<PackageCandidate>,
    /// Every other publishable package.
    pub remaining: Vec<PackageCandidate>,
    pub version_folder: PathBuf,
}

/// # Errors
///
/// Returns `OperationError::ManualModeRequired` unless conventional
/// changelogs are disabled.
pub fn ensure_manual_mode(config: &MonoweaveConfig) -> Result<()> {
    if config.changelog_mode.is_manual() {
        Ok(())
    } else {
        Err(OperationError::ManualModeRequired)
    }
}

fn candidate(name: &str, tags: &RegistryTagSet) -> PackageCandidate {
    PackageCandidate {
        name: name.to_string(),
        current_version: tags.get(name).and_then(|t| t.get(LATEST_TAG)).cloned(),
    }
}

/// Splits publishable packages into those touched since the last release and
/// the rest.
///
/// # Errors
///
/// Returns an error if history or the registry cannot be read.
pub async fn manual_candidates<G: GitProvider + ?Sized>(
    git: &G,
    client: Arc<dyn RegistryClient>,
    graph: &dyn WorkspaceGraph,
    config: &MonoweaveConfig,
) -> Result<ManualCandidates> {
    let tags = latest_tags(client, graph, config).await?;
    let ignore = changeset_ignore_set(&config.changeset_ignore_patterns)?;

    let mut touched = BTreeSet::new();
    for commit in harvest_commits(git, graph.root(), config)? {
        for name in modified_packages(git, graph, &ignore, &commit.sha)? {
            if graph
                .workspace_by_name(&name)
                .is_some_and(|ws| ws.is_publishable())
            {
                touched.insert(name);
            }
        }
    }

    let suggested = touched.iter().map(|name| candidate(name, &tags)).collect();
    let remaining = graph
        .workspaces()
        .iter()
        .filter(|ws| ws.is_publishable())
        .filter_map(|ws| ws.name.as_deref())
        .filter(|name| !touched.contains(*name))
        .map(|name| candidate(name, &tags))
        .collect();

    Ok(ManualCandidates {
        suggested,
        remaining,
        version_folder: config.version_folder(),
    })
}

/// Writes `record` to `<version folder>/<hash>.md`, creating the folder.
///
/// # Errors
///
/// Returns `OperationError::VersionFileWrite` if the file cannot be written.
pub fn write_version_file(
    config: &MonoweaveConfig,
    record: &DeferredVersionRecord,
) -> Result<PathBuf> {
    let folder = config.version_folder();
    let content = serialize_deferred_version(record);
    let path = folder.join(deferred_version_file_name(&content));

    std::fs::create_dir_all(&folder).map_err(|source| OperationError::VersionFileWrite {
        path: folder.clone(),
        source,
    })?;
    std::fs::write(&path, content).map_err(|source| OperationError::VersionFileWrite {
        path: path.clone(),
        source,
    })?;

    info!("[Version] Written to: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use monoweave_changelog::ChangelogMode;
    use monoweave_parse::parse_deferred_version;

    use super::*;
    use crate::mocks::{self, MockGitProvider, MockRegistryClient};

    #[test]
    fn version_command_needs_manual_mode() {
        let mut config = mocks::config();
        assert!(matches!(
            ensure_manual_mode(&config),
            Err(OperationError::ManualModeRequired)
        ));

        config.changelog_mode = ChangelogMode::Manual;
        assert!(ensure_manual_mode(&config).is_ok());
    }

    #[tokio::test]
    async fn touched_packages_are_suggested() -> anyhow::Result<()> {
        let mut internal = mocks::workspace("internal", "1.0.0");
        internal.private = true;
        let graph = mocks::graph(vec![
            mocks::workspace("pkg-a", "1.0.0"),
            mocks::workspace("pkg-b", "1.0.0"),
            internal,
        ]);
        let git = MockGitProvider::new().with_commit(
            "c1",
            "work",
            &["packages/pkg-b/index.js", "packages/internal/index.js"],
        );
        let client = MockRegistryClient::new().with_tags("pkg-b", &[("latest", "1.4.0")]);

        let candidates =
            manual_candidates(&git, Arc::new(client), &graph, &mocks::config()).await?;

        assert_eq!(
            candidates.suggested,
            vec![PackageCandidate {
                name: "pkg-b".to_string(),
                current_version: Some("1.4.0".to_string()),
            }]
        );
        assert_eq!(
            candidates.remaining,
            vec![PackageCandidate {
                name: "pkg-a".to_string(),
                current_version: Some("1.0.0".to_string()),
            }]
        );
        assert_eq!(
            candidates.version_folder,
            PathBuf::from(mocks::ROOT).join(".monoweave")
        );
        Ok(())
    }

    #[test]
    fn version_file_is_content_addressed() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let mut config = mocks::config();
        config.cwd = dir.path().to_path_buf();
        let record = DeferredVersionRecord {
            strategies: IndexMap::from([("pkg-a".to_string(), Some("minor".to_string()))]),
            changelog: "Some exciting feature.\n".to_string(),
        };

        let path = write_version_file(&config, &record)?;

        assert!(path.starts_with(dir.path().join(".monoweave")));
        let file_name = path.file_name().and_then(|n| n.to_str()).expect("file name");
        assert_eq!(file_name.len(), "12345678.md".len());
        assert_eq!(parse_deferred_version(&std::fs::read_to_string(&path)?)?, record);
        Ok(())
    }
}
