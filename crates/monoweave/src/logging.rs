use std::io;

use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::{CliError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable single-line output
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

const CRATES: [&str; 8] = [
    "monoweave",
    "monoweave_operations",
    "monoweave_git",
    "monoweave_registry",
    "monoweave_project",
    "monoweave_changelog",
    "monoweave_manifest",
    "monoweave_version",
];

/// Bare levels apply to monoweave crates only; anything else is taken as a
/// full filter directive.
fn filter_directive(level: &str) -> String {
    let lower = level.to_ascii_lowercase();
    match lower.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" | "off" => {
            let mut directive = String::from("warn");
            for krate in CRATES {
                directive.push_str(&format!(",{krate}={lower}"));
            }
            directive
        }
        _ => level.to_string(),
    }
}

/// Installs the global subscriber. Logs always go to stderr.
///
/// # Errors
///
/// Returns an error for an unparsable level or if a subscriber is already
/// installed.
pub fn init(level: &str, format: LogFormat) -> Result<()> {
    let directive = filter_directive(level);
    let filter = EnvFilter::try_new(&directive).map_err(|source| CliError::LogFilter {
        filter: level.to_string(),
        source,
    })?;
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(io::stderr)
                    .with_target(false),
            )
            .try_init()?,
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(io::stderr),
            )
            .try_init()?,
    }
    Ok(())
}
