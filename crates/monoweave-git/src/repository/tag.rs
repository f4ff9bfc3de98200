use std::collections::HashMap;

use crate::{Result, TagInfo, TaggedCommit};

use super::Repository;

/// Whether `name` looks like `<package>@<major>.<minor>.<patch>[-pre][+build]`.
///
/// Prerelease tags only match when `include_prerelease` is set.
#[must_use]
pub fn is_release_tag(name: &str, include_prerelease: bool) -> bool {
    let Some((package, version)) = name.rsplit_once('@') else {
        return false;
    };
    if package.is_empty() {
        return false;
    }

    let version = version.split_once('+').map_or(version, |(core, _)| core);
    let (core, prerelease) = match version.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (version, None),
    };

    let parts: Vec<&str> = core.split('.').collect();
    let numeric = parts.len() == 3
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));

    numeric && (include_prerelease || prerelease.is_none())
}

impl Repository {
    /// # Errors
    ///
    /// Returns an error if the tag cannot be created or already exists.
    pub fn create_tag(&self, name: &str, message: &str) -> Result<TagInfo> {
        let head = self.inner.head()?.peel_to_commit()?;
        let sig = self.inner.signature()?;

        self.inner
            .tag(name, head.as_object(), &sig, message, false)?;

        Ok(TagInfo {
            name: name.to_string(),
            target_sha: head.id().to_string(),
        })
    }

    #[must_use]
    pub fn tag_exists(&self, name: &str) -> bool {
        self.inner
            .find_reference(&format!("refs/tags/{name}"))
            .is_ok()
    }

    /// Finds the nearest commit reachable from `HEAD` that carries a release tag.
    ///
    /// Falls back to `HEAD` with a warning when no release tag is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if `HEAD` cannot be resolved or the history walk fails.
    pub fn last_tagged_commit(&self, include_prerelease: bool) -> Result<TaggedCommit> {
        let mut tagged: HashMap<git2::Oid, String> = HashMap::new();
        let names = self.inner.tag_names(None)?;
        for name in names.iter().flatten() {
            if !is_release_tag(name, include_prerelease) {
                continue;
            }
            let Ok(reference) = self.inner.find_reference(&format!("refs/tags/{name}")) else {
                continue;
            };
            let Ok(commit) = reference.peel_to_commit() else {
                continue;
            };
            tagged
                .entry(commit.id())
                .and_modify(|existing| {
                    if name > existing.as_str() {
                        *existing = name.to_string();
                    }
                })
                .or_insert_with(|| name.to_string());
        }

        let head = self.inner.head()?.peel_to_commit()?;

        if !tagged.is_empty() {
            let mut walk = self.inner.revwalk()?;
            walk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)?;
            walk.push(head.id())?;
            for oid in walk {
                let oid = oid?;
                if let Some(tag) = tagged.remove(&oid) {
                    return Ok(TaggedCommit {
                        sha: oid.to_string(),
                        tag: Some(tag),
                    });
                }
            }
        }

        tracing::warn!("[Git] Fetching most recent tag failed, falling back to HEAD");
        Ok(TaggedCommit {
            sha: head.id().to_string(),
            tag: None,
        })
    }
}
