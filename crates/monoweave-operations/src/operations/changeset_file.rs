use std::io::Write;
use std::path::PathBuf;

use monoweave_core::Changeset;
use monoweave_project::MonoweaveConfig;
use tracing::{debug, info};

use crate::Result;
use crate::error::OperationError;

/// Filename that sends the changeset to standard output.
pub const STDOUT_FILENAME: &str = "-";

/// # Errors
///
/// Returns `OperationError::ChangesetSerialize` if the changeset cannot be
/// serialized.
pub fn serialize_changeset(changeset: &Changeset) -> Result<String> {
    serde_json::to_string_pretty(changeset).map_err(OperationError::ChangesetSerialize)
}

/// Writes the changeset as pretty JSON to the configured file, to `stdout`
/// for `-`, or only to the debug log when no file is configured. Runs in dry
/// run too, so the plan can be inspected. Returns the file written, if any.
///
/// # Errors
///
/// Returns an error if the changeset cannot be serialized or written.
pub fn write_changeset_file(
    config: &MonoweaveConfig,
    changeset: &Changeset,
    stdout: &mut dyn Write,
) -> Result<Option<PathBuf>> {
    let serialized = serialize_changeset(changeset)?;

    let Some(filename) = config.changeset_filename.as_deref() else {
        debug!("[Changeset] Data\n{serialized}");
        return Ok(None);
    };

    if filename == STDOUT_FILENAME {
        writeln!(stdout, "{serialized}")?;
        stdout.flush()?;
        return Ok(None);
    }

    let path = config.cwd.join(filename);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| OperationError::ChangesetWrite {
            path: path.clone(),
            source,
        })?;
    }
    std::fs::write(&path, serialized).map_err(|source| OperationError::ChangesetWrite {
        path: path.clone(),
        source,
    })?;
    info!("[Changeset] Written to: {}", path.display());

    Ok(Some(path))
}
