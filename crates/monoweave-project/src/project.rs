use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use tracing::debug;

use monoweave_core::Workspace;

use crate::error::ProjectError;
use crate::manifest::{PackageJson, read_package_json};

const MANIFEST_FILE: &str = "package.json";
const SKIPPED_DIRS: [&str; 2] = ["node_modules", ".git"];

/// The monorepo root and every workspace it declares, top-level first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonorepoProject {
    pub root: PathBuf,
    pub workspaces: Vec<Workspace>,
}

/// Walks up from `start_dir` to the nearest `package.json` declaring
/// `workspaces`, falling back to the nearest `package.json` of any kind,
/// then loads every matching workspace.
///
/// # Errors
///
/// Returns `ProjectError::NotFound` if no manifest exists above `start_dir`,
/// or a manifest/glob error if a workspace cannot be loaded.
pub fn discover_project(
    start_dir: &Path,
    group_field: Option<&str>,
) -> Result<MonorepoProject, ProjectError> {
    let start_dir = start_dir
        .canonicalize()
        .map_err(|source| ProjectError::ManifestRead {
            path: start_dir.to_path_buf(),
            source,
        })?;

    let (root, manifest) = find_project_root(&start_dir)?;
    let patterns = manifest
        .workspaces
        .as_ref()
        .map(|field| field.patterns().to_vec())
        .unwrap_or_default();

    let mut workspaces = vec![manifest.into_workspace(&root, group_field)?];

    for dir in expand_workspace_patterns(&root, &patterns)? {
        let manifest = read_package_json(&dir.join(MANIFEST_FILE))?;
        workspaces.push(manifest.into_workspace(&dir, group_field)?);
    }

    debug!(
        "Discovered {} workspace(s) under {}",
        workspaces.len(),
        root.display()
    );

    Ok(MonorepoProject { root, workspaces })
}

fn find_project_root(start_dir: &Path) -> Result<(PathBuf, PackageJson), ProjectError> {
    let mut current = start_dir.to_path_buf();
    let mut fallback: Option<(PathBuf, PackageJson)> = None;

    loop {
        let manifest_path = current.join(MANIFEST_FILE);

        if manifest_path.exists() {
            let manifest = read_package_json(&manifest_path)?;

            if manifest.workspaces.is_some() {
                return Ok((current, manifest));
            }

            if fallback.is_none() {
                fallback = Some((current.clone(), manifest));
            }
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => {
                return fallback.ok_or_else(|| ProjectError::NotFound {
                    start_dir: start_dir.to_path_buf(),
                });
            }
        }
    }
}

fn compile(pattern: &str) -> Result<GlobMatcher, ProjectError> {
    let normalized = pattern.trim_start_matches("./").trim_end_matches('/');
    Ok(GlobBuilder::new(normalized)
        .literal_separator(true)
        .build()
        .map_err(|source| ProjectError::GlobPattern {
            pattern: pattern.to_string(),
            source,
        })?
        .compile_matcher())
}

/// Directories under `root` matching the workspace patterns and holding a
/// manifest. Patterns starting with `!` exclude.
fn expand_workspace_patterns(
    root: &Path,
    patterns: &[String],
) -> Result<Vec<PathBuf>, ProjectError> {
    let mut includes = Vec::new();
    let mut excludes = Vec::new();
    for pattern in patterns {
        match pattern.strip_prefix('!') {
            Some(excluded) => excludes.push(compile(excluded)?),
            None => includes.push(compile(pattern)?),
        }
    }

    if includes.is_empty() {
        return Ok(Vec::new());
    }

    let mut dirs = Vec::new();
    collect_matching_dirs(root, root, &includes, &excludes, &mut dirs)?;
    dirs.sort();
    dirs.dedup();

    Ok(dirs)
}

fn collect_matching_dirs(
    base: &Path,
    current: &Path,
    includes: &[GlobMatcher],
    excludes: &[GlobMatcher],
    results: &mut Vec<PathBuf>,
) -> Result<(), ProjectError> {
    for entry in std::fs::read_dir(current)? {
        let path = entry?.path();

        if !path.is_dir() {
            continue;
        }
        if path
            .file_name()
            .is_some_and(|name| SKIPPED_DIRS.iter().any(|skipped| name == *skipped))
        {
            continue;
        }

        let relative = path.strip_prefix(base).unwrap_or(&path);

        if excludes.iter().any(|ex| ex.is_match(relative)) {
            continue;
        }

        if includes.iter().any(|glob| glob.is_match(relative)) && path.join(MANIFEST_FILE).exists()
        {
            results.push(path.clone());
        }

        collect_matching_dirs(base, &path, includes, excludes, results)?;
    }

    Ok(())
}
