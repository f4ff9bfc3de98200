use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use monoweave_changelog::{ChangelogMode, ConventionalRules};
use monoweave_core::{RegistryMode, StrategyType};

use crate::error::ProjectError;
use crate::presets::load_preset;

pub const DEFAULT_CONFIG_FILE: &str = "monoweave.toml";
pub const DEFAULT_VERSION_FOLDER: &str = ".monoweave";
pub const DEFAULT_AUTO_COMMIT_MESSAGE: &str = "chore: release [skip ci]";
pub const DEFAULT_LIFECYCLE_SCRIPTS: [&str; 4] = ["prepublish", "prepublishOnly", "prepack", "postpack"];
pub const DEFAULT_POST_RELEASE_SCRIPTS: [&str; 1] = ["postpublish"];

/// `conventional-changelog-config`: `false` selects manual mode, `true` the
/// stock conventional rules, a table custom rules.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ConventionalSetting {
    Enabled(bool),
    Rules(ConventionalRules),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct GitConfigFile {
    pub base_branch: Option<String>,
    pub commit_sha: Option<String>,
    pub remote: Option<String>,
    pub push: Option<bool>,
    pub tag: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PackageGroupFile {
    pub registry_mode: Option<RegistryMode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct VersionStrategyFile {
    pub coerce_implicit_peer_dependency: Option<StrategyType>,
    pub minimum_strategy: Option<StrategyType>,
    pub version_folder: Option<String>,
}

/// One configuration layer. Every field is optional so layers can be stacked
/// with [`ConfigFile::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigFile {
    pub preset: Option<String>,
    pub registry_url: Option<String>,
    pub registry_mode: Option<RegistryMode>,
    pub no_registry: Option<bool>,
    pub dry_run: Option<bool>,
    pub git: Option<GitConfigFile>,
    pub conventional_changelog_config: Option<ConventionalSetting>,
    pub changeset_filename: Option<String>,
    pub changelog_filename: Option<String>,
    pub changeset_ignore_patterns: Option<Vec<String>>,
    pub commit_ignore_patterns: Option<Vec<String>>,
    pub force_write_change_files: Option<bool>,
    pub persist_versions: Option<bool>,
    pub auto_commit: Option<bool>,
    pub auto_commit_message: Option<String>,
    pub topological: Option<bool>,
    pub topological_dev: Option<bool>,
    pub jobs: Option<usize>,
    pub max_concurrent_reads: Option<usize>,
    pub max_concurrent_writes: Option<usize>,
    pub prerelease: Option<bool>,
    pub prerelease_id: Option<String>,
    pub prerelease_npm_tag: Option<String>,
    pub package_group_manifest_field: Option<String>,
    pub package_groups: Option<BTreeMap<String, PackageGroupFile>>,
    pub version_strategy: Option<VersionStrategyFile>,
    pub lifecycle_scripts: Option<Vec<String>>,
    pub post_release_scripts: Option<Vec<String>>,
}

fn merge_nested<T>(base: Option<T>, top: Option<T>, merge: impl FnOnce(T, T) -> T) -> Option<T> {
    match (base, top) {
        (Some(base), Some(top)) => Some(merge(base, top)),
        (base, top) => top.or(base),
    }
}

impl GitConfigFile {
    fn merge(self, top: Self) -> Self {
        Self {
            base_branch: top.base_branch.or(self.base_branch),
            commit_sha: top.commit_sha.or(self.commit_sha),
            remote: top.remote.or(self.remote),
            push: top.push.or(self.push),
            tag: top.tag.or(self.tag),
        }
    }
}

impl VersionStrategyFile {
    fn merge(self, top: Self) -> Self {
        Self {
            coerce_implicit_peer_dependency: top
                .coerce_implicit_peer_dependency
                .or(self.coerce_implicit_peer_dependency),
            minimum_strategy: top.minimum_strategy.or(self.minimum_strategy),
            version_folder: top.version_folder.or(self.version_folder),
        }
    }
}

impl ConfigFile {
    /// Layers `top` over `self`: set values in `top` win, nested tables merge
    /// key by key, lists are replaced wholesale.
    #[must_use]
    pub fn merge(self, top: Self) -> Self {
        let package_groups = merge_nested(self.package_groups, top.package_groups, |mut base, top| {
            for (key, group) in top {
                let merged = match base.remove(&key) {
                    Some(existing) => PackageGroupFile {
                        registry_mode: group.registry_mode.or(existing.registry_mode),
                    },
                    None => group,
                };
                base.insert(key, merged);
            }
            base
        });

        Self {
            preset: top.preset.or(self.preset),
            registry_url: top.registry_url.or(self.registry_url),
            registry_mode: top.registry_mode.or(self.registry_mode),
            no_registry: top.no_registry.or(self.no_registry),
            dry_run: top.dry_run.or(self.dry_run),
            git: merge_nested(self.git, top.git, GitConfigFile::merge),
            conventional_changelog_config: top
                .conventional_changelog_config
                .or(self.conventional_changelog_config),
            changeset_filename: top.changeset_filename.or(self.changeset_filename),
            changelog_filename: top.changelog_filename.or(self.changelog_filename),
            changeset_ignore_patterns: top
                .changeset_ignore_patterns
                .or(self.changeset_ignore_patterns),
            commit_ignore_patterns: top.commit_ignore_patterns.or(self.commit_ignore_patterns),
            force_write_change_files: top
                .force_write_change_files
                .or(self.force_write_change_files),
            persist_versions: top.persist_versions.or(self.persist_versions),
            auto_commit: top.auto_commit.or(self.auto_commit),
            auto_commit_message: top.auto_commit_message.or(self.auto_commit_message),
            topological: top.topological.or(self.topological),
            topological_dev: top.topological_dev.or(self.topological_dev),
            jobs: top.jobs.or(self.jobs),
            max_concurrent_reads: top.max_concurrent_reads.or(self.max_concurrent_reads),
            max_concurrent_writes: top.max_concurrent_writes.or(self.max_concurrent_writes),
            prerelease: top.prerelease.or(self.prerelease),
            prerelease_id: top.prerelease_id.or(self.prerelease_id),
            prerelease_npm_tag: top.prerelease_npm_tag.or(self.prerelease_npm_tag),
            package_group_manifest_field: top
                .package_group_manifest_field
                .or(self.package_group_manifest_field),
            package_groups,
            version_strategy: merge_nested(
                self.version_strategy,
                top.version_strategy,
                VersionStrategyFile::merge,
            ),
            lifecycle_scripts: top.lifecycle_scripts.or(self.lifecycle_scripts),
            post_release_scripts: top.post_release_scripts.or(self.post_release_scripts),
        }
    }
}

/// # Errors
///
/// Returns `ProjectError::ConfigRead` or `ProjectError::ConfigParse` if the
/// file cannot be read or contains unknown or mistyped keys.
pub fn parse_config_file(path: &Path) -> Result<ConfigFile, ProjectError> {
    let content = std::fs::read_to_string(path).map_err(|source| ProjectError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ProjectError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads the config file (explicit path, or `monoweave.toml` in `root` when
/// present) and layers it over its preset. `preset` overrides the file's own
/// `preset` key.
///
/// # Errors
///
/// Returns `ProjectError` if the file or the preset cannot be loaded.
pub fn read_config(
    root: &Path,
    explicit: Option<&Path>,
    preset: Option<&str>,
) -> Result<ConfigFile, ProjectError> {
    let path = match explicit {
        Some(path) if path.is_absolute() => Some(path.to_path_buf()),
        Some(path) => Some(root.join(path)),
        None => Some(root.join(DEFAULT_CONFIG_FILE)).filter(|path| path.exists()),
    };

    let file = match &path {
        Some(path) => {
            debug!("Reading configuration from {}", path.display());
            parse_config_file(path)?
        }
        None => ConfigFile::default(),
    };

    let preset_name = preset.map(str::to_string).or_else(|| file.preset.clone());
    match preset_name {
        Some(name) => Ok(load_preset(&name, root)?.merge(file)),
        None => Ok(file),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitConfig {
    /// Fixed commit range start; unset means the last release tag.
    pub base_branch: Option<String>,
    pub commit_sha: String,
    pub remote: String,
    pub push: bool,
    pub tag: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PackageGroupConfig {
    pub registry_mode: Option<RegistryMode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionStrategyConfig {
    /// Boundary peer dependency ranges are rounded down to.
    pub coerce_implicit_peer_dependency: StrategyType,
    pub minimum_strategy: Option<StrategyType>,
    pub version_folder: PathBuf,
}

/// Fully resolved, run-scoped configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonoweaveConfig {
    pub cwd: PathBuf,
    pub dry_run: bool,
    pub registry_url: Option<String>,
    pub registry_mode: RegistryMode,
    pub git: GitConfig,
    pub changelog_mode: ChangelogMode,
    pub changeset_filename: Option<String>,
    pub changelog_filename: Option<String>,
    pub changeset_ignore_patterns: Vec<String>,
    pub commit_ignore_patterns: Vec<String>,
    pub force_write_change_files: bool,
    pub persist_versions: bool,
    pub auto_commit: bool,
    pub auto_commit_message: String,
    pub topological: bool,
    pub topological_dev: bool,
    /// Lifecycle job limit; 0 is unbounded.
    pub jobs: usize,
    pub max_concurrent_reads: usize,
    pub max_concurrent_writes: usize,
    pub prerelease: bool,
    pub prerelease_id: String,
    pub prerelease_npm_tag: String,
    pub package_group_manifest_field: Option<String>,
    pub package_groups: BTreeMap<String, PackageGroupConfig>,
    pub version_strategy: VersionStrategyConfig,
    pub lifecycle_scripts: Vec<String>,
    pub post_release_scripts: Vec<String>,
}

impl MonoweaveConfig {
    /// Applies built-in defaults to a merged configuration layer.
    #[must_use]
    pub fn resolve(cwd: PathBuf, file: ConfigFile) -> Self {
        let git = file.git.unwrap_or_default();
        let version_strategy = file.version_strategy.unwrap_or_default();

        let registry_mode = if file.no_registry == Some(true) {
            RegistryMode::Manifest
        } else {
            file.registry_mode.unwrap_or_default()
        };

        let changelog_mode = match file.conventional_changelog_config {
            None => ChangelogMode::Default,
            Some(ConventionalSetting::Enabled(false)) => ChangelogMode::Manual,
            Some(ConventionalSetting::Enabled(true)) => {
                ChangelogMode::Conventional(ConventionalRules::default())
            }
            Some(ConventionalSetting::Rules(rules)) => ChangelogMode::Conventional(rules),
        };

        let owned_names = |names: &[&str]| -> Vec<String> {
            names.iter().map(|name| (*name).to_string()).collect()
        };

        Self {
            cwd,
            dry_run: file.dry_run.unwrap_or(false),
            registry_url: file.registry_url,
            registry_mode,
            git: GitConfig {
                base_branch: git.base_branch,
                commit_sha: git.commit_sha.unwrap_or_else(|| "HEAD".to_string()),
                remote: git.remote.unwrap_or_else(|| "origin".to_string()),
                push: git.push.unwrap_or(true),
                tag: git.tag.unwrap_or(true),
            },
            changelog_mode,
            changeset_filename: file.changeset_filename,
            changelog_filename: file.changelog_filename,
            changeset_ignore_patterns: file.changeset_ignore_patterns.unwrap_or_default(),
            commit_ignore_patterns: file.commit_ignore_patterns.unwrap_or_default(),
            force_write_change_files: file.force_write_change_files.unwrap_or(false),
            persist_versions: file.persist_versions.unwrap_or(false),
            auto_commit: file.auto_commit.unwrap_or(false),
            auto_commit_message: file
                .auto_commit_message
                .unwrap_or_else(|| DEFAULT_AUTO_COMMIT_MESSAGE.to_string()),
            topological: file.topological.unwrap_or(false),
            topological_dev: file.topological_dev.unwrap_or(false),
            jobs: file.jobs.unwrap_or(1),
            max_concurrent_reads: file.max_concurrent_reads.unwrap_or(0),
            max_concurrent_writes: file.max_concurrent_writes.unwrap_or(0),
            prerelease: file.prerelease.unwrap_or(false),
            prerelease_id: file.prerelease_id.unwrap_or_else(|| "rc".to_string()),
            prerelease_npm_tag: file.prerelease_npm_tag.unwrap_or_else(|| "next".to_string()),
            package_group_manifest_field: file.package_group_manifest_field,
            package_groups: file
                .package_groups
                .unwrap_or_default()
                .into_iter()
                .map(|(key, group)| {
                    (
                        key,
                        PackageGroupConfig {
                            registry_mode: group.registry_mode,
                        },
                    )
                })
                .collect(),
            version_strategy: VersionStrategyConfig {
                coerce_implicit_peer_dependency: version_strategy
                    .coerce_implicit_peer_dependency
                    .unwrap_or(StrategyType::Patch),
                minimum_strategy: version_strategy.minimum_strategy,
                version_folder: PathBuf::from(
                    version_strategy
                        .version_folder
                        .unwrap_or_else(|| DEFAULT_VERSION_FOLDER.to_string()),
                ),
            },
            lifecycle_scripts: file
                .lifecycle_scripts
                .unwrap_or_else(|| owned_names(&DEFAULT_LIFECYCLE_SCRIPTS)),
            post_release_scripts: file
                .post_release_scripts
                .unwrap_or_else(|| owned_names(&DEFAULT_POST_RELEASE_SCRIPTS)),
        }
    }

    /// Registry mode for a workspace in `group`, honouring per-group overrides.
    #[must_use]
    pub fn registry_mode_for_group(&self, group: &str) -> RegistryMode {
        self.package_groups
            .get(group)
            .and_then(|group| group.registry_mode)
            .unwrap_or(self.registry_mode)
    }

    /// Dry run without the force-write override.
    #[must_use]
    pub fn skip_writes(&self) -> bool {
        self.dry_run && !self.force_write_change_files
    }

    #[must_use]
    pub fn version_folder(&self) -> PathBuf {
        self.cwd.join(&self.version_strategy.version_folder)
    }
}

impl Default for MonoweaveConfig {
    fn default() -> Self {
        Self::resolve(PathBuf::from("."), ConfigFile::default())
    }
}
