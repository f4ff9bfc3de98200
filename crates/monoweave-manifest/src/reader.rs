use std::path::Path;

use semver::Version;
use serde_json::{Map, Value};

use crate::error::ManifestError;

/// Raw manifest text, used to restore a manifest after a temporary patch.
///
/// # Errors
///
/// Returns `ManifestError::Read` if the file cannot be read.
pub fn read_raw(path: &Path) -> Result<String, ManifestError> {
    std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses a manifest keeping key order.
///
/// # Errors
///
/// Returns `ManifestError::Read` if the file cannot be read,
/// `ManifestError::Parse` if the JSON is malformed, or
/// `ManifestError::NotAnObject` if the top level is not an object.
pub fn read_document(path: &Path) -> Result<Map<String, Value>, ManifestError> {
    let content = read_raw(path)?;

    let value: Value = serde_json::from_str(&content).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ManifestError::NotAnObject {
            path: path.to_path_buf(),
        }),
    }
}

/// # Errors
///
/// Returns an error if the manifest cannot be read, or
/// `ManifestError::InvalidVersion` if the version is not valid semver.
pub fn read_version(path: &Path) -> Result<Option<Version>, ManifestError> {
    let doc = read_document(path)?;

    let Some(raw) = doc.get("version").and_then(Value::as_str) else {
        return Ok(None);
    };

    Version::parse(raw)
        .map(Some)
        .map_err(|source| ManifestError::InvalidVersion {
            path: path.to_path_buf(),
            version: raw.to_string(),
            source,
        })
}
