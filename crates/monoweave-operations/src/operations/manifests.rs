use std::collections::BTreeMap;
use std::path::PathBuf;

use monoweave_core::Changeset;
use monoweave_manifest::ManifestPatch;
use monoweave_project::{MonoweaveConfig, WorkspaceGraph};
use monoweave_version::{coerce_peer_version, parse_version_or_default};
use semver::Version;
use tracing::{debug, info};

use crate::Result;
use crate::traits::ManifestWriter;

/// Manifests touched by a release and their content before patching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchedManifests {
    pub originals: Vec<(PathBuf, String)>,
}

impl PatchedManifests {
    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.originals.iter().map(|(path, _)| path)
    }
}

/// Patches built for every workspace that releases or depends on a release.
///
/// # Errors
///
/// Returns `OperationError::VersionCalculation` if a changeset version is not
/// valid semver.
pub fn manifest_patches(
    graph: &dyn WorkspaceGraph,
    config: &MonoweaveConfig,
    changeset: &Changeset,
) -> Result<Vec<(PathBuf, ManifestPatch)>> {
    let versions: BTreeMap<&str, Version> = changeset
        .iter()
        .map(|(name, record)| {
            parse_version_or_default(Some(&record.version)).map(|version| (name.as_str(), version))
        })
        .collect::<std::result::Result<_, _>>()?;
    let coerce = config.version_strategy.coerce_implicit_peer_dependency;

    let mut patches = Vec::new();
    for workspace in graph.workspaces() {
        let own = workspace
            .name
            .as_deref()
            .and_then(|name| versions.get(name))
            .cloned();

        let released = |deps: &BTreeMap<String, String>| {
            deps.keys()
                .filter_map(|dep| versions.get(dep.as_str()).map(|v| (dep.clone(), v.clone())))
                .collect::<BTreeMap<_, _>>()
        };

        let patch = ManifestPatch {
            version: own,
            dependencies: released(&workspace.dependencies),
            peer_dependencies: released(&workspace.peer_dependencies)
                .into_iter()
                .map(|(dep, version)| (dep, coerce_peer_version(&version, coerce)))
                .collect(),
        };
        if !patch.is_empty() {
            patches.push((workspace.manifest_path(), patch));
        }
    }

    Ok(patches)
}

/// Writes new versions and dependency ranges to disk, returning the content
/// each changed manifest had before.
///
/// # Errors
///
/// Returns an error if a manifest cannot be read, parsed, or written.
pub fn patch_manifests<M: ManifestWriter + ?Sized>(
    writer: &M,
    graph: &dyn WorkspaceGraph,
    config: &MonoweaveConfig,
    changeset: &Changeset,
) -> Result<PatchedManifests> {
    let patches = manifest_patches(graph, config, changeset)?;

    if config.skip_writes() {
        for (path, _) in &patches {
            info!("[Dry Run] [Manifest] Would update {}", path.display());
        }
        return Ok(PatchedManifests::default());
    }

    let mut patched = PatchedManifests::default();
    for (path, patch) in patches {
        let original = writer.read_raw(&path)?;
        if writer.patch(&path, &patch)? {
            debug!("[Manifest] Updated {}", path.display());
            patched.originals.push((path, original));
        }
    }

    Ok(patched)
}

/// # Errors
///
/// Returns an error if a manifest cannot be written.
pub fn restore_manifests<M: ManifestWriter + ?Sized>(
    writer: &M,
    patched: &PatchedManifests,
) -> Result<()> {
    for (path, original) in &patched.originals {
        writer.restore(path, original)?;
        debug!("[Manifest] Restored {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use monoweave_core::{ChangesetRecord, StrategyType};

    use super::*;
    use crate::mocks::{self, MockManifestWriter};

    fn record(version: &str) -> ChangesetRecord {
        ChangesetRecord {
            version: version.to_string(),
            previous_version: None,
            changelog: None,
            tag: None,
            strategy: Some(StrategyType::Minor),
            group: String::new(),
        }
    }

    fn setup() -> (monoweave_project::InMemoryWorkspaceGraph, Changeset) {
        let a = mocks::workspace("pkg-a", "2.3.0");
        let mut b = mocks::workspace("pkg-b", "1.0.0");
        b.dependencies.insert("pkg-a".to_string(), "^2.3.0".to_string());
        let mut c = mocks::workspace("pkg-c", "1.0.0");
        c.peer_dependencies.insert("pkg-a".to_string(), "^2.0.0".to_string());
        c.dev_dependencies.insert("pkg-a".to_string(), "^2.0.0".to_string());
        let d = mocks::workspace("pkg-d", "1.0.0");

        let changeset = Changeset::from([("pkg-a".to_string(), record("2.4.5"))]);
        (mocks::graph(vec![a, b, c, d]), changeset)
    }

    #[test]
    fn patches_cover_versions_dependencies_and_peers() -> anyhow::Result<()> {
        let (graph, changeset) = setup();
        let mut config = mocks::config();
        config.version_strategy.coerce_implicit_peer_dependency = StrategyType::Minor;

        let patches = manifest_patches(&graph, &config, &changeset)?;
        assert_eq!(patches.len(), 3);

        let (path, own) = &patches[0];
        assert!(path.ends_with("packages/pkg-a/package.json"));
        assert_eq!(own.version, Some(Version::new(2, 4, 5)));

        assert_eq!(patches[1].1.dependencies["pkg-a"], Version::new(2, 4, 5));
        assert!(patches[1].1.version.is_none());

        let peer = &patches[2].1;
        assert_eq!(peer.peer_dependencies["pkg-a"], Version::new(2, 4, 0));
        assert!(peer.dependencies.is_empty());
        Ok(())
    }

    #[test]
    fn dry_run_writes_nothing() -> anyhow::Result<()> {
        let (graph, changeset) = setup();
        let mut config = mocks::config();
        config.dry_run = true;
        let writer = MockManifestWriter::new();

        let patched = patch_manifests(&writer, &graph, &config, &changeset)?;

        assert!(patched.originals.is_empty());
        assert!(writer.patches().is_empty());
        Ok(())
    }

    #[test]
    fn forced_dry_run_writes_and_restores() -> anyhow::Result<()> {
        let (graph, changeset) = setup();
        let mut config = mocks::config();
        config.dry_run = true;
        config.force_write_change_files = true;
        let writer = MockManifestWriter::new();

        let patched = patch_manifests(&writer, &graph, &config, &changeset)?;
        assert_eq!(writer.patches().len(), 3);
        assert_eq!(patched.paths().count(), 3);

        restore_manifests(&writer, &patched)?;
        assert_eq!(writer.restored().len(), 3);
        Ok(())
    }
}
