#![allow(dead_code)]

use std::fs;
use std::path::Path;

use git2::{Repository, Signature};
use tempfile::TempDir;

/// Yarn-style monorepo with `pkg-a` and `pkg-b` (depending on `pkg-a`),
/// committed and tagged at their current versions.
pub fn tagged_monorepo() -> (TempDir, Repository) {
    let dir = TempDir::new().expect("failed to create temp dir");
    write(
        dir.path(),
        "package.json",
        r#"{ "name": "root", "private": true, "workspaces": ["packages/*"] }"#,
    );
    write(
        dir.path(),
        "packages/pkg-a/package.json",
        r#"{ "name": "pkg-a", "version": "1.0.0" }"#,
    );
    write(
        dir.path(),
        "packages/pkg-b/package.json",
        r#"{ "name": "pkg-b", "version": "2.0.0", "dependencies": { "pkg-a": "^1.0.0" } }"#,
    );

    let repo = Repository::init(dir.path()).expect("failed to init repo");
    {
        let mut config = repo.config().expect("repo config");
        config.set_str("user.name", "Release Bot").expect("user.name");
        config
            .set_str("user.email", "release@example.com")
            .expect("user.email");
    }
    let sha = commit_all(&repo, "chore: initial");
    {
        let commit = repo.find_commit(sha).expect("initial commit");
        for tag in ["pkg-a@1.0.0", "pkg-b@2.0.0"] {
            repo.tag_lightweight(tag, commit.as_object(), false)
                .expect("failed to tag");
        }
    }

    (dir, repo)
}

pub fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create dirs");
    }
    fs::write(path, content).expect("failed to write file");
}

pub fn commit_all(repo: &Repository, message: &str) -> git2::Oid {
    let mut index = repo.index().expect("index");
    index
        .add_all(["*"], git2::IndexAddOption::DEFAULT, None)
        .expect("add all");
    index.write().expect("write index");
    let tree = repo
        .find_tree(index.write_tree().expect("write tree"))
        .expect("tree");
    let signature = Signature::now("Release Bot", "release@example.com").expect("signature");
    let parents: Vec<git2::Commit<'_>> = repo
        .head()
        .ok()
        .and_then(|head| head.peel_to_commit().ok())
        .into_iter()
        .collect();
    let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();

    repo.commit(
        Some("HEAD"),
        &signature,
        &signature,
        message,
        &tree,
        &parent_refs,
    )
    .expect("commit")
}
