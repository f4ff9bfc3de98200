use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::ChangelogError;

/// Line after which new entries are inserted.
pub const MARKER: &str = "<!-- MONOWEAVE:BELOW -->";
/// Older spelling of [`MARKER`], upgraded in place when found.
pub const LEGACY_MARKER: &str = "<!-- MONODEPLOY:BELOW -->";

/// A changelog file held as lines, with entries spliced in below the marker.
#[derive(Debug, Clone)]
pub struct Changelog {
    path: PathBuf,
    lines: Vec<String>,
}

impl Changelog {
    /// Reads `path`, starting from a fresh skeleton when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `ChangelogError::Read` if the file exists but cannot be read.
    pub fn open(path: &Path) -> Result<Self, ChangelogError> {
        let lines = match std::fs::read_to_string(path) {
            Ok(content) => content.split('\n').map(str::to_string).collect(),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("[Changelog] Changelog {} does not exist, creating.", path.display());
                vec!["# Changelog".to_string(), String::new(), MARKER.to_string()]
            }
            Err(source) => {
                return Err(ChangelogError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            lines,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn content(&self) -> String {
        self.lines.join("\n")
    }

    /// Inserts `entry` directly after the marker line, upgrading a legacy
    /// marker to the current spelling.
    ///
    /// # Errors
    ///
    /// Returns `ChangelogError::MissingMarker` if neither marker is present.
    pub fn prepend(&mut self, entry: &str) -> Result<(), ChangelogError> {
        let offset = self
            .lines
            .iter()
            .position(|line| {
                let trimmed = line.trim();
                trimmed == MARKER || trimmed == LEGACY_MARKER
            })
            .ok_or_else(|| ChangelogError::MissingMarker {
                path: self.path.clone(),
                marker: MARKER,
            })?;

        if self.lines[offset].contains(LEGACY_MARKER) {
            warn!("[Changelog] Upgrading '{LEGACY_MARKER}' to '{MARKER}'");
            self.lines[offset] = self.lines[offset].replace(LEGACY_MARKER, MARKER);
        }

        self.lines.insert(offset + 1, format!("\n{entry}\n"));
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ChangelogError::Write` if the file cannot be written.
    pub fn write(&self) -> Result<(), ChangelogError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ChangelogError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        std::fs::write(&self.path, self.content()).map_err(|source| ChangelogError::Write {
            path: self.path.clone(),
            source,
        })
    }
}
