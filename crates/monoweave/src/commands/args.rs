use std::path::PathBuf;

use clap::Args;
use monoweave_core::{RegistryMode, StrategyType};
use monoweave_project::{ConfigFile, GitConfigFile, VersionStrategyFile};

use crate::logging::LogFormat;

#[derive(Args, Debug, Clone)]
pub(crate) struct GlobalArgs {
    /// Directory to start project discovery from (default: current directory)
    #[arg(long = "cwd", short = 'C', global = true, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Configuration file, relative to the project root (default: monoweave.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Built-in preset (recommended, manual, legacy) or a preset file
    #[arg(long, global = true, value_name = "NAME")]
    pub preset: Option<String>,

    /// Log level or filter directive
    #[arg(
        long,
        global = true,
        env = "MONOWEAVE_LOG_LEVEL",
        default_value = "info",
        value_name = "LEVEL"
    )]
    pub log_level: String,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Flags that override configuration file values.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct ConfigArgs {
    /// Log what would be written, committed and tagged without doing it
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, value_name = "URL")]
    pub registry_url: Option<String>,

    #[arg(long, value_name = "MODE")]
    pub registry_mode: Option<RegistryMode>,

    /// Read current versions from manifests instead of the registry
    #[arg(long)]
    pub no_registry: bool,

    /// Start of the commit range (default: last release tag)
    #[arg(long, value_name = "REF")]
    pub git_base_branch: Option<String>,

    /// End of the commit range (default: HEAD)
    #[arg(long, value_name = "REF")]
    pub git_commit_sha: Option<String>,

    #[arg(long, value_name = "NAME")]
    pub git_remote: Option<String>,

    #[arg(long)]
    pub no_git_push: bool,

    #[arg(long)]
    pub no_git_tag: bool,

    /// Where to write the changeset JSON; `-` for stdout
    #[arg(long, value_name = "PATH")]
    pub changeset_filename: Option<String>,

    /// Changelog path; may contain <packageDir>
    #[arg(long, value_name = "PATH")]
    pub changelog_filename: Option<String>,

    /// Glob of changed files that never trigger a release (repeatable)
    #[arg(long = "changeset-ignore-pattern", value_name = "GLOB")]
    pub changeset_ignore_patterns: Vec<String>,

    /// Regex of commits to skip (repeatable)
    #[arg(long = "commit-ignore-pattern", value_name = "REGEX")]
    pub commit_ignore_patterns: Vec<String>,

    /// Write changelogs and the changeset file even in dry run
    #[arg(long)]
    pub force_write_change_files: bool,

    /// Keep patched manifests after lifecycle scripts
    #[arg(long)]
    pub persist_versions: bool,

    #[arg(long)]
    pub auto_commit: bool,

    #[arg(long, value_name = "MESSAGE")]
    pub auto_commit_message: Option<String>,

    /// Run lifecycle scripts in dependency order
    #[arg(long)]
    pub topological: bool,

    /// Treat dev dependencies as edges for ordering and propagation
    #[arg(long)]
    pub topological_dev: bool,

    /// Packages running scripts at once; 0 is unbounded
    #[arg(long, value_name = "N")]
    pub jobs: Option<usize>,

    #[arg(long, value_name = "N")]
    pub max_concurrent_reads: Option<usize>,

    #[arg(long, value_name = "N")]
    pub max_concurrent_writes: Option<usize>,

    #[arg(long)]
    pub prerelease: bool,

    #[arg(long, value_name = "ID")]
    pub prerelease_id: Option<String>,

    #[arg(long, value_name = "TAG")]
    pub prerelease_npm_tag: Option<String>,

    #[arg(long, value_name = "FIELD")]
    pub package_group_manifest_field: Option<String>,

    /// Floor applied to every commit-derived strategy
    #[arg(long, value_name = "STRATEGY")]
    pub minimum_strategy: Option<StrategyType>,
}

fn flag(set: bool) -> Option<bool> {
    set.then_some(true)
}

fn list(values: &[String]) -> Option<Vec<String>> {
    (!values.is_empty()).then(|| values.to_vec())
}

impl ConfigArgs {
    /// The topmost configuration layer. Unset flags leave lower layers alone.
    pub fn to_layer(&self) -> ConfigFile {
        ConfigFile {
            registry_url: self.registry_url.clone(),
            registry_mode: self.registry_mode,
            no_registry: flag(self.no_registry),
            dry_run: flag(self.dry_run),
            git: Some(GitConfigFile {
                base_branch: self.git_base_branch.clone(),
                commit_sha: self.git_commit_sha.clone(),
                remote: self.git_remote.clone(),
                push: self.no_git_push.then_some(false),
                tag: self.no_git_tag.then_some(false),
            }),
            changeset_filename: self.changeset_filename.clone(),
            changelog_filename: self.changelog_filename.clone(),
            changeset_ignore_patterns: list(&self.changeset_ignore_patterns),
            commit_ignore_patterns: list(&self.commit_ignore_patterns),
            force_write_change_files: flag(self.force_write_change_files),
            persist_versions: flag(self.persist_versions),
            auto_commit: flag(self.auto_commit),
            auto_commit_message: self.auto_commit_message.clone(),
            topological: flag(self.topological),
            topological_dev: flag(self.topological_dev),
            jobs: self.jobs,
            max_concurrent_reads: self.max_concurrent_reads,
            max_concurrent_writes: self.max_concurrent_writes,
            prerelease: flag(self.prerelease),
            prerelease_id: self.prerelease_id.clone(),
            prerelease_npm_tag: self.prerelease_npm_tag.clone(),
            package_group_manifest_field: self.package_group_manifest_field.clone(),
            version_strategy: self.minimum_strategy.map(|strategy| VersionStrategyFile {
                minimum_strategy: Some(strategy),
                ..VersionStrategyFile::default()
            }),
            ..ConfigFile::default()
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub(crate) struct ReleaseArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Check changelog files out from the upstream branch before prepending
    #[arg(long)]
    pub refresh_changelogs: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub(crate) struct VersionArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Strategy for one package as <package>=<strategy> (repeatable); prompts when omitted
    #[arg(long = "strategy", short = 's', value_name = "PACKAGE=STRATEGY")]
    pub strategies: Vec<String>,

    /// Changelog text for the version file
    #[arg(long, short = 'm', value_name = "TEXT")]
    pub message: Option<String>,
}
