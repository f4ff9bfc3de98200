use std::path::Path;

use crate::config::{ConfigFile, ConventionalSetting, GitConfigFile, parse_config_file};
use crate::error::ProjectError;

const SKIP_CI_PATTERN: &str = r"\[skip-ci\]";
const PER_PACKAGE_CHANGELOG: &str = "<packageDir>/CHANGELOG.md";

fn strings(values: &[&str]) -> Option<Vec<String>> {
    Some(values.iter().map(|value| (*value).to_string()).collect())
}

/// Conventional commits, per-package changelogs, test files ignored.
#[must_use]
pub fn recommended() -> ConfigFile {
    ConfigFile {
        commit_ignore_patterns: strings(&[SKIP_CI_PATTERN]),
        changeset_ignore_patterns: strings(&["**/__tests__", "**/*.test.*", "**/*.snap"]),
        changelog_filename: Some(PER_PACKAGE_CHANGELOG.to_string()),
        ..ConfigFile::default()
    }
}

/// Deferred version files instead of commit classification.
#[must_use]
pub fn manual() -> ConfigFile {
    ConfigFile {
        changelog_filename: Some(PER_PACKAGE_CHANGELOG.to_string()),
        conventional_changelog_config: Some(ConventionalSetting::Enabled(false)),
        ..ConfigFile::default()
    }
}

/// Nothing is persisted, committed or pushed.
#[must_use]
pub fn legacy() -> ConfigFile {
    ConfigFile {
        persist_versions: Some(false),
        auto_commit: Some(false),
        git: Some(GitConfigFile {
            push: Some(false),
            ..GitConfigFile::default()
        }),
        commit_ignore_patterns: strings(&[SKIP_CI_PATTERN]),
        changeset_ignore_patterns: strings(&["**/__tests__", "**/*.test.*"]),
        ..ConfigFile::default()
    }
}

/// Resolves a preset by name (`recommended`, `manual`, `legacy`, optionally
/// prefixed with `monoweave/preset-`), or as a TOML file relative to `root`.
///
/// # Errors
///
/// Returns `ProjectError::UnknownPreset` if the name is neither built in nor
/// an existing file, or a config error if the file cannot be parsed.
pub fn load_preset(name: &str, root: &Path) -> Result<ConfigFile, ProjectError> {
    let builtin = name.strip_prefix("monoweave/preset-").unwrap_or(name);
    match builtin {
        "recommended" => Ok(recommended()),
        "manual" => Ok(manual()),
        "legacy" => Ok(legacy()),
        _ => {
            let path = root.join(name);
            if path.is_file() {
                parse_config_file(&path)
            } else {
                Err(ProjectError::UnknownPreset(name.to_string()))
            }
        }
    }
}
