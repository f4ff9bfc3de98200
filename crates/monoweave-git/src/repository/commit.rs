use std::path::Path;

use crate::{CommitInfo, GitError, Result};

use super::Repository;

impl Repository {
    /// Syncs the index entries of `paths` with the working tree.
    ///
    /// Files that no longer exist, such as consumed version files, are
    /// removed from the index.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be updated or written.
    pub fn stage_files(&self, paths: &[&Path]) -> Result<()> {
        let mut index = self.inner.index()?;

        for relative in paths.iter().map(|path| self.to_relative_path(path)) {
            if self.root().join(&relative).is_file() {
                index.add_path(&relative)?;
            } else if index.get_path(&relative, 0).is_some() {
                index.remove_path(&relative)?;
            }
        }

        index.write()?;
        Ok(())
    }

    /// Records the index as a new commit on `HEAD`, using the configured
    /// git identity. An unborn `HEAD` produces a root commit.
    ///
    /// # Errors
    ///
    /// Returns an error if no identity is configured or the commit cannot be
    /// written.
    pub fn commit(&self, message: &str) -> Result<CommitInfo> {
        let signature = self.inner.signature()?;
        let tree_id = self.inner.index()?.write_tree()?;
        let tree = self.inner.find_tree(tree_id)?;

        let parent = match self.inner.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(err) if err.code() == git2::ErrorCode::UnbornBranch => None,
            Err(err) => return Err(GitError::from(err)),
        };
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let oid = self.inner.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parents,
        )?;

        Ok(CommitInfo {
            sha: oid.to_string(),
            message: message.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::super::tests::{commit_files, setup_test_repo};

    #[test]
    fn release_commit_contains_patched_manifests() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;
        fs::create_dir_all(dir.path().join("packages/a"))?;
        fs::write(
            dir.path().join("packages/a/package.json"),
            r#"{"name":"a","version":"1.0.1"}"#,
        )?;
        fs::write(dir.path().join("CHANGELOG.md"), "# Changelog\n")?;

        let manifest = dir.path().join("packages/a/package.json");
        repo.stage_files(&[manifest.as_path(), Path::new("CHANGELOG.md")])?;
        let info = repo.commit("chore: release [skip ci]")?;

        let head = repo.inner.head()?.peel_to_commit()?;
        assert_eq!(head.id().to_string(), info.sha);
        assert_eq!(head.message(), Some("chore: release [skip ci]"));
        let tree = head.tree()?;
        assert!(tree.get_path(Path::new("packages/a/package.json")).is_ok());
        assert!(tree.get_path(Path::new("CHANGELOG.md")).is_ok());
        Ok(())
    }

    #[test]
    fn consumed_version_file_is_removed_from_the_tree() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;
        commit_files(
            &dir,
            &repo,
            &[(".monoweave/1a2b3c4d.md", "---\n\"a\": minor\n---\n")],
            "chore: add version file",
        )?;

        fs::remove_file(dir.path().join(".monoweave/1a2b3c4d.md"))?;
        repo.stage_files(&[Path::new(".monoweave/1a2b3c4d.md")])?;
        repo.commit("chore: release")?;

        let tree = repo.inner.head()?.peel_to_commit()?.tree()?;
        assert!(tree.get_path(Path::new(".monoweave/1a2b3c4d.md")).is_err());
        Ok(())
    }

    #[test]
    fn missing_untracked_path_is_ignored() -> anyhow::Result<()> {
        let (_dir, repo) = setup_test_repo()?;

        repo.stage_files(&[Path::new("never-existed.md")])?;

        assert!(repo.inner.index()?.is_empty());
        Ok(())
    }
}
