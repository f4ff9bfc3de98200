use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use git2::{Repository, Signature};
use monoweave_core::{Changeset, DistTags};
use monoweave_operations::OperationError;
use monoweave_operations::operations::{ReleaseInput, ReleaseOperation, ReleaseOutcome};
use monoweave_operations::providers::{
    FileSystemChangelogWriter, FileSystemManifestWriter, FileSystemProjectProvider, Git2Provider,
    ProcessScriptRunner,
};
use monoweave_operations::traits::{HookError, ReleaseHook};
use monoweave_project::MonoweaveConfig;
use monoweave_registry::{RegistryClient, RegistryError};
use tempfile::TempDir;

struct StaticRegistry {
    tags: BTreeMap<String, DistTags>,
}

impl StaticRegistry {
    fn latest(entries: &[(&str, &str)]) -> Self {
        Self {
            tags: entries
                .iter()
                .map(|(name, version)| {
                    (
                        (*name).to_string(),
                        DistTags::from([("latest".to_string(), (*version).to_string())]),
                    )
                })
                .collect(),
        }
    }
}

#[async_trait]
impl RegistryClient for StaticRegistry {
    async fn dist_tags(&self, registry: &str, package: &str) -> Result<DistTags, RegistryError> {
        self.tags
            .get(package)
            .cloned()
            .ok_or_else(|| RegistryError::Status {
                url: format!("{registry}/{package}"),
                status: 404,
            })
    }
}

struct NamesHook {
    seen: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl ReleaseHook for NamesHook {
    fn name(&self) -> &str {
        "names"
    }

    async fn on_release_available(
        &self,
        _config: &MonoweaveConfig,
        changeset: &Changeset,
    ) -> Result<(), HookError> {
        self.seen
            .lock()
            .expect("lock poisoned")
            .extend(changeset.keys().cloned());
        Ok(())
    }
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
    fs::write(path, content).expect("write file");
}

fn commit_all(repo: &Repository, message: &str) -> git2::Oid {
    let mut index = repo.index().expect("index");
    index
        .add_all(["*"], git2::IndexAddOption::DEFAULT, None)
        .expect("add all");
    index.write().expect("write index");
    let tree = repo
        .find_tree(index.write_tree().expect("write tree"))
        .expect("tree");
    let signature = Signature::now("Release Bot", "release@example.com").expect("signature");
    let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
    repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
        .expect("commit")
}

/// Two packages tagged at their published versions, then a fix to `pkg-a`.
fn project(prepack: &str) -> (TempDir, Repository) {
    let dir = TempDir::new().expect("temp dir");
    write(
        dir.path(),
        "package.json",
        r#"{ "name": "root", "private": true, "workspaces": ["packages/*"] }"#,
    );
    write(
        dir.path(),
        "packages/pkg-a/package.json",
        &format!(r#"{{ "name": "pkg-a", "version": "1.0.0", "scripts": {{ "prepack": "{prepack}" }} }}"#),
    );
    write(
        dir.path(),
        "packages/pkg-b/package.json",
        r#"{ "name": "pkg-b", "version": "2.0.0", "dependencies": { "pkg-a": "workspace:^1.0.0" } }"#,
    );

    let repo = Repository::init(dir.path()).expect("init");
    {
        let mut config = repo.config().expect("config");
        config.set_str("user.name", "Release Bot").expect("user.name");
        config
            .set_str("user.email", "release@example.com")
            .expect("user.email");
    }
    let initial = commit_all(&repo, "chore: initial");
    {
        let commit = repo.find_commit(initial).expect("initial commit");
        repo.tag_lightweight("pkg-a@1.0.0", commit.as_object(), false)
            .expect("tag");
    }

    write(dir.path(), "packages/pkg-a/index.js", "export {};\n");
    commit_all(&repo, "fix: guard against empty input");
    (dir, repo)
}

fn config(root: &Path) -> MonoweaveConfig {
    let mut config = MonoweaveConfig {
        cwd: root.canonicalize().expect("canonical root"),
        changelog_filename: Some("<packageDir>/CHANGELOG.md".to_string()),
        auto_commit: true,
        ..MonoweaveConfig::default()
    };
    config.git.push = false;
    config
}

fn operation() -> ReleaseOperation<
    FileSystemProjectProvider,
    Git2Provider,
    FileSystemManifestWriter,
    FileSystemChangelogWriter,
    ProcessScriptRunner,
> {
    ReleaseOperation::new(
        FileSystemProjectProvider::new(),
        Git2Provider::new(),
        FileSystemManifestWriter::new(),
        FileSystemChangelogWriter::new(),
        ProcessScriptRunner::new(),
        Arc::new(StaticRegistry::latest(&[("pkg-a", "1.0.0"), ("pkg-b", "2.0.0")])),
    )
}

fn manifest_version(root: &Path, package: &str) -> String {
    let path: PathBuf = root.join("packages").join(package).join("package.json");
    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(path).expect("read manifest")).expect("json");
    manifest["version"].as_str().expect("version").to_string()
}

#[tokio::test]
async fn release_runs_scripts_against_patched_manifests() -> anyhow::Result<()> {
    let (dir, repo) = project("grep -q 1.0.1 package.json && echo ok > packed.txt");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let operation = operation().with_hook(Arc::new(NamesHook {
        seen: Arc::clone(&seen),
    }));
    let mut stdout = Vec::new();

    let outcome = operation
        .execute(&config(dir.path()), &ReleaseInput::default(), &mut stdout)
        .await?;

    let ReleaseOutcome::Executed(output) = outcome else {
        panic!("expected an executed release");
    };
    assert_eq!(output.changeset["pkg-a"].version, "1.0.1");
    assert_eq!(output.changeset["pkg-b"].version, "2.0.1");

    assert!(dir.path().join("packages/pkg-a/packed.txt").is_file());
    assert_eq!(manifest_version(dir.path(), "pkg-a"), "1.0.0");

    let changelog = fs::read_to_string(dir.path().join("packages/pkg-a/CHANGELOG.md"))?;
    assert!(changelog.contains("guard against empty input"));
    assert!(!dir.path().join("packages/pkg-b/CHANGELOG.md").exists());

    let head = repo.head()?.peel_to_commit()?;
    assert_eq!(head.message(), Some("chore: release [skip ci]"));
    let tags: Vec<&str> = output.tags.iter().map(|tag| tag.name.as_str()).collect();
    assert_eq!(tags, vec!["pkg-a@1.0.1", "pkg-b@2.0.1"]);
    assert!(repo.find_reference("refs/tags/pkg-b@2.0.1").is_ok());

    assert_eq!(*seen.lock().expect("lock poisoned"), vec!["pkg-a", "pkg-b"]);
    Ok(())
}

#[tokio::test]
async fn failing_script_restores_manifests_and_skips_tags() -> anyhow::Result<()> {
    let (dir, repo) = project("exit 3");
    let mut stdout = Vec::new();

    let result = operation()
        .execute(&config(dir.path()), &ReleaseInput::default(), &mut stdout)
        .await;

    assert!(matches!(
        result,
        Err(OperationError::LifecycleScript { package, script, .. })
            if package == "pkg-a" && script == "prepack"
    ));
    assert_eq!(manifest_version(dir.path(), "pkg-a"), "1.0.0");
    assert_eq!(manifest_version(dir.path(), "pkg-b"), "2.0.0");
    assert!(repo.find_reference("refs/tags/pkg-a@1.0.1").is_err());
    let head = repo.head()?.peel_to_commit()?;
    assert_eq!(head.message(), Some("fix: guard against empty input"));
    Ok(())
}
