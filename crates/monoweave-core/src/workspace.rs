use std::collections::BTreeMap;
use std::path::PathBuf;

use semver::Version;

/// Range prefix marking an intra-monorepo dependency on disk.
pub const WORKSPACE_PROTOCOL: &str = "workspace:";

/// Returns `range` without a leading `workspace:` marker.
#[must_use]
pub fn strip_workspace_protocol(range: &str) -> &str {
    range.strip_prefix(WORKSPACE_PROTOCOL).unwrap_or(range)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKind {
    Regular,
    Dev,
    Peer,
}

impl DependencyKind {
    /// Manifest field holding dependencies of this kind.
    #[must_use]
    pub fn manifest_field(self) -> &'static str {
        match self {
            Self::Regular => "dependencies",
            Self::Dev => "devDependencies",
            Self::Peer => "peerDependencies",
        }
    }
}

/// One package of the monorepo as seen by the release engine.
///
/// Dependency ranges never carry the `workspace:` protocol prefix.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Workspace {
    pub name: Option<String>,
    pub version: Option<Version>,
    pub private: bool,
    /// Absolute directory containing the manifest.
    pub path: PathBuf,
    pub dependencies: BTreeMap<String, String>,
    pub dev_dependencies: BTreeMap<String, String>,
    pub peer_dependencies: BTreeMap<String, String>,
    pub scripts: BTreeMap<String, String>,
    /// Value of the configured group manifest field, if any.
    pub group: Option<String>,
    pub repository: Option<String>,
    pub author: Option<String>,
}

impl Workspace {
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.path.join("package.json")
    }

    /// Named and not private.
    #[must_use]
    pub fn is_publishable(&self) -> bool {
        !self.private && self.name.is_some()
    }

    #[must_use]
    pub fn dependencies_of_kind(&self, kind: DependencyKind) -> &BTreeMap<String, String> {
        match kind {
            DependencyKind::Regular => &self.dependencies,
            DependencyKind::Dev => &self.dev_dependencies,
            DependencyKind::Peer => &self.peer_dependencies,
        }
    }

    /// Returns true if this workspace depends on `name` through a regular or
    /// peer edge, or through a dev edge when `include_dev` is set.
    #[must_use]
    pub fn depends_on(&self, name: &str, include_dev: bool) -> bool {
        self.dependencies.contains_key(name)
            || self.peer_dependencies.contains_key(name)
            || (include_dev && self.dev_dependencies.contains_key(name))
    }
}
