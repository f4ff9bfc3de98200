mod commands;
mod environment;
mod error;
mod interaction;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use crate::commands::{Commands, GlobalArgs, ReleaseArgs};
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "monoweave")]
#[command(version = env!("MONOWEAVE_VERSION"))]
#[command(about = "Version and release package.json monorepos", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Arguments for the default `release` command
    #[command(flatten)]
    release: ReleaseArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(&cli.global.log_level, cli.global.log_format) {
        print_error(&e);
        return ExitCode::FAILURE;
    }

    let start_path = match resolve_start_path(cli.global.cwd.clone()) {
        Ok(path) => path,
        Err(e) => {
            print_error(&e);
            return ExitCode::FAILURE;
        }
    };

    let command = cli.command.unwrap_or(Commands::Release(cli.release));
    if let Err(e) = command.execute(&cli.global, &start_path) {
        print_error(&e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn resolve_start_path(path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    let current = std::env::current_dir().map_err(CliError::CurrentDir)?;
    Ok(match path {
        Some(p) if p.is_absolute() => p,
        Some(p) => current.join(p),
        None => current,
    })
}

fn print_error(error: &CliError) {
    eprintln!("error: {error}");

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("caused by: {cause}");
        source = std::error::Error::source(cause);
    }
}
