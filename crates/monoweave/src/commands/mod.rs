mod args;
mod release;
mod version;

use std::path::Path;

use clap::Subcommand;
use monoweave_project::{MonoweaveConfig, discover_project, read_config};
use tracing::debug;

pub(crate) use args::{ConfigArgs, GlobalArgs, ReleaseArgs, VersionArgs};

use crate::error::{CliError, Result};

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Compute versions, write changelogs and tag the release (default)
    Release(ReleaseArgs),
    /// Record a deferred version file for the next release (manual mode)
    Version(VersionArgs),
}

impl Commands {
    pub(crate) fn execute(self, global: &GlobalArgs, start_path: &Path) -> Result<()> {
        match self {
            Self::Release(args) => release::run(&args, global, start_path),
            Self::Version(args) => version::run(&args, global, start_path),
        }
    }
}

/// Layers defaults, preset, config file and flags, rooted at the project
/// enclosing `start_path`.
pub(crate) fn load_config(
    global: &GlobalArgs,
    args: &ConfigArgs,
    start_path: &Path,
) -> Result<MonoweaveConfig> {
    let root = discover_project(start_path, None)?.root;
    let file = read_config(
        &root,
        global.config_file.as_deref(),
        global.preset.as_deref(),
    )?
    .merge(args.to_layer());

    debug!("Project root: {}", root.display());
    Ok(MonoweaveConfig::resolve(root, file))
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)
}
