mod config;
mod error;
mod graph;
mod groups;
mod manifest;
mod presets;
mod project;

pub use config::{
    ConfigFile, ConventionalSetting, DEFAULT_AUTO_COMMIT_MESSAGE, DEFAULT_CONFIG_FILE,
    DEFAULT_LIFECYCLE_SCRIPTS, DEFAULT_POST_RELEASE_SCRIPTS, DEFAULT_VERSION_FOLDER, GitConfig,
    GitConfigFile, MonoweaveConfig, PackageGroupConfig, PackageGroupFile, VersionStrategyConfig,
    VersionStrategyFile, parse_config_file, read_config,
};
pub use error::ProjectError;
pub use graph::{InMemoryWorkspaceGraph, WorkspaceGraph};
pub use groups::{group_key, workspace_groups};
pub use presets::{legacy, load_preset, manual, recommended};
pub use project::{MonorepoProject, discover_project};

pub type Result<T> = std::result::Result<T, ProjectError>;
