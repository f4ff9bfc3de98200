use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use monoweave_core::{Workspace, strip_workspace_protocol};

use crate::error::ProjectError;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PackageJson {
    pub(crate) name: Option<String>,
    pub(crate) version: Option<String>,
    #[serde(default)]
    pub(crate) private: bool,
    pub(crate) workspaces: Option<WorkspacesField>,
    #[serde(default)]
    pub(crate) dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub(crate) dev_dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub(crate) peer_dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub(crate) scripts: BTreeMap<String, String>,
    pub(crate) repository: Option<RepositoryField>,
    pub(crate) author: Option<AuthorField>,
    #[serde(flatten)]
    pub(crate) extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum WorkspacesField {
    Patterns(Vec<String>),
    Config {
        #[serde(default)]
        packages: Vec<String>,
    },
}

impl WorkspacesField {
    pub(crate) fn patterns(&self) -> &[String] {
        match self {
            Self::Patterns(patterns) | Self::Config { packages: patterns } => patterns,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RepositoryField {
    Url(String),
    Object { url: String },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum AuthorField {
    Name(String),
    Object { name: String },
}

pub(crate) fn read_package_json(path: &Path) -> Result<PackageJson, ProjectError> {
    let content = std::fs::read_to_string(path).map_err(|source| ProjectError::ManifestRead {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| ProjectError::ManifestParse {
        path: path.to_path_buf(),
        source,
    })
}

fn strip_ranges(ranges: BTreeMap<String, String>) -> BTreeMap<String, String> {
    ranges
        .into_iter()
        .map(|(name, range)| {
            let stripped = strip_workspace_protocol(&range).to_string();
            (name, stripped)
        })
        .collect()
}

impl PackageJson {
    /// Converts the manifest in `dir` into the in-memory workspace model.
    pub(crate) fn into_workspace(
        self,
        dir: &Path,
        group_field: Option<&str>,
    ) -> Result<Workspace, ProjectError> {
        let version = match self.version {
            Some(raw) => Some(raw.parse().map_err(|source| ProjectError::InvalidVersion {
                path: dir.join("package.json"),
                version: raw.clone(),
                source,
            })?),
            None => None,
        };

        let group = group_field
            .and_then(|field| self.extra.get(field))
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);

        Ok(Workspace {
            name: self.name,
            version,
            private: self.private,
            path: dir.to_path_buf(),
            dependencies: strip_ranges(self.dependencies),
            dev_dependencies: strip_ranges(self.dev_dependencies),
            peer_dependencies: strip_ranges(self.peer_dependencies),
            scripts: self.scripts,
            group,
            repository: self.repository.map(|repo| match repo {
                RepositoryField::Url(url) | RepositoryField::Object { url } => url,
            }),
            author: self.author.map(|author| match author {
                AuthorField::Name(name) | AuthorField::Object { name } => name,
            }),
        })
    }
}
