use std::collections::BTreeMap;
use std::path::Path;

use semver::Version;
use serde_json::{Map, Value};

use monoweave_core::WORKSPACE_PROTOCOL;

use crate::error::ManifestError;
use crate::reader::read_document;

const RANGE_MODIFIERS: [&str; 3] = [">=", "^", "~"];
const DEFAULT_MODIFIER: &str = "^";

/// Changes applied to a single manifest in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestPatch {
    /// New `version` field, if the package itself is released.
    pub version: Option<Version>,
    /// Versions for entries of `dependencies`.
    pub dependencies: BTreeMap<String, Version>,
    /// Versions for entries of `peerDependencies`, already coerced.
    pub peer_dependencies: BTreeMap<String, Version>,
}

impl ManifestPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.version.is_none() && self.dependencies.is_empty() && self.peer_dependencies.is_empty()
    }
}

/// Serializes with two-space indentation and a trailing newline.
///
/// # Errors
///
/// Returns `ManifestError::Write` if the file cannot be written.
pub fn write_document(path: &Path, doc: &Map<String, Value>) -> Result<(), ManifestError> {
    let mut content = serde_json::to_string_pretty(doc).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    content.push('\n');

    std::fs::write(path, content).map_err(|source| ManifestError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// # Errors
///
/// Returns an error if the manifest cannot be read, parsed, or written.
pub fn write_version(path: &Path, version: &Version) -> Result<(), ManifestError> {
    let mut doc = read_document(path)?;
    doc.insert("version".to_string(), Value::String(version.to_string()));
    write_document(path, &doc)
}

/// Writes previously captured manifest text back verbatim.
///
/// # Errors
///
/// Returns `ManifestError::Write` if the file cannot be written.
pub fn restore_raw(path: &Path, content: &str) -> Result<(), ManifestError> {
    std::fs::write(path, content).map_err(|source| ManifestError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Points an existing dependency range at `version`, keeping its
/// `workspace:` prefix and its `^`, `~` or `>=` modifier. Wildcards and
/// exact pins become caret ranges.
#[must_use]
pub fn rewrite_range(existing: &str, version: &Version) -> String {
    let (protocol, range) = match existing.strip_prefix(WORKSPACE_PROTOCOL) {
        Some(rest) => (WORKSPACE_PROTOCOL, rest),
        None => ("", existing),
    };

    let modifier = RANGE_MODIFIERS
        .iter()
        .find(|modifier| range.starts_with(**modifier))
        .copied()
        .unwrap_or(DEFAULT_MODIFIER);

    format!("{protocol}{modifier}{version}")
}

fn patch_section(
    doc: &mut Map<String, Value>,
    section: &str,
    versions: &BTreeMap<String, Version>,
) -> bool {
    let Some(Value::Object(entries)) = doc.get_mut(section) else {
        return false;
    };

    let mut changed = false;
    for (name, version) in versions {
        let Some(Value::String(range)) = entries.get_mut(name) else {
            continue;
        };

        let rewritten = rewrite_range(range, version);
        if *range != rewritten {
            *range = rewritten;
            changed = true;
        }
    }

    changed
}

/// Applies `patch` to the manifest at `path`. `devDependencies` are never
/// touched. Returns whether anything was written.
///
/// # Errors
///
/// Returns an error if the manifest cannot be read, parsed, or written.
pub fn patch_manifest(path: &Path, patch: &ManifestPatch) -> Result<bool, ManifestError> {
    let mut doc = read_document(path)?;
    let mut changed = false;

    if let Some(version) = &patch.version {
        let new_value = Value::String(version.to_string());
        if doc.get("version") != Some(&new_value) {
            doc.insert("version".to_string(), new_value);
            changed = true;
        }
    }

    changed |= patch_section(&mut doc, "dependencies", &patch.dependencies);
    changed |= patch_section(&mut doc, "peerDependencies", &patch.peer_dependencies);

    if changed {
        write_document(path, &doc)?;
    }

    Ok(changed)
}
