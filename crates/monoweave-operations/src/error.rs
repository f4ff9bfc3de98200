use std::path::PathBuf;

use thiserror::Error;

use crate::traits::HookError;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    Core(#[from] monoweave_core::CoreError),

    #[error(transparent)]
    Git(#[from] monoweave_git::GitError),

    #[error(transparent)]
    Project(#[from] monoweave_project::ProjectError),

    #[error(transparent)]
    Manifest(#[from] monoweave_manifest::ManifestError),

    #[error(transparent)]
    Changelog(#[from] monoweave_changelog::ChangelogError),

    #[error("version calculation failed")]
    VersionCalculation(#[from] monoweave_version::VersionError),

    #[error("registry lookup failed")]
    Registry(#[from] monoweave_registry::RegistryError),

    #[error("no workspace found at '{0}'")]
    NoWorkspace(PathBuf),

    #[error("'{path}' does not belong to a named workspace; the workspace graph may be corrupted")]
    UnresolvedPath { path: PathBuf },

    #[error("invalid version file '{file}': unknown workspace '{name}'")]
    UnknownPackage { name: String, file: PathBuf },

    #[error("invalid version file '{file}': workspace '{name}' is private")]
    PrivatePackage { name: String, file: PathBuf },

    #[error("invalid version file '{file}': workspace '{name}' has invalid strategy '{strategy}'")]
    InvalidStrategy {
        name: String,
        strategy: String,
        file: PathBuf,
    },

    #[error("invalid version file '{path}'")]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: monoweave_parse::FormatError,
    },

    #[error("failed to read version file '{path}'")]
    VersionFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write version file '{path}'")]
    VersionFileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid commit ignore pattern '{pattern}'")]
    CommitIgnorePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid changeset ignore pattern '{pattern}'")]
    ChangesetIgnorePattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("failed to serialize the changeset")]
    ChangesetSerialize(#[source] serde_json::Error),

    #[error("failed to write changeset file '{path}'")]
    ChangesetWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn script '{script}' for '{package}'")]
    ScriptSpawn {
        package: String,
        script: String,
        #[source]
        source: std::io::Error,
    },

    #[error("script '{script}' for '{package}' failed with {status}: {stderr}")]
    LifecycleScript {
        package: String,
        script: String,
        status: String,
        stderr: String,
    },

    #[error("lifecycle task failed")]
    Task(#[from] tokio::task::JoinError),

    #[error("release hook '{hook}' failed")]
    Hook {
        hook: String,
        #[source]
        source: HookError,
    },

    #[error("the version command requires conventional changelogs to be disabled")]
    ManualModeRequired,

    #[error("IO error")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OperationError>;
