use std::path::PathBuf;

use monoweave_core::{StrategyMap, StrategyType};
use monoweave_project::{MonoweaveConfig, WorkspaceGraph};
use tracing::{debug, warn};

use super::commits::{changeset_ignore_set, harvest_commits, modified_packages};
use super::manual::manual_strategies;
use crate::Result;
use crate::traits::GitProvider;

/// Strategies declared by commits or version files, plus the version files
/// that declared them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplicitStrategies {
    pub strategies: StrategyMap,
    pub version_files: Vec<PathBuf>,
}

/// Resolves explicit strategies from version files in manual mode, from
/// commit messages otherwise.
///
/// # Errors
///
/// Returns an error if history cannot be read, a path cannot be attributed
/// to a workspace, or a version file is invalid.
pub fn explicit_strategies<G: GitProvider + ?Sized>(
    git: &G,
    graph: &dyn WorkspaceGraph,
    config: &MonoweaveConfig,
) -> Result<ExplicitStrategies> {
    if config.changelog_mode.is_manual() {
        return manual_strategies(git, graph, config);
    }

    Ok(ExplicitStrategies {
        strategies: conventional_strategies(git, graph, config)?,
        version_files: Vec::new(),
    })
}

/// Classifies each commit in range and applies the result to every package
/// it touched.
///
/// # Errors
///
/// Returns an error if history cannot be read or a path cannot be attributed
/// to a workspace.
pub fn conventional_strategies<G: GitProvider + ?Sized>(
    git: &G,
    graph: &dyn WorkspaceGraph,
    config: &MonoweaveConfig,
) -> Result<StrategyMap> {
    let ignore = changeset_ignore_set(&config.changeset_ignore_patterns)?;
    let commits = harvest_commits(git, graph.root(), config)?;

    let mut strategies = StrategyMap::new();
    for commit in commits {
        let classified = config.changelog_mode.classify(&commit.body);
        let strategy = if classified.is_none() {
            config
                .version_strategy
                .minimum_strategy
                .unwrap_or(StrategyType::None)
        } else {
            classified
        };

        if strategy.is_none() {
            debug!(
                "[Explicit Version Strategies] {} does not imply a version bump",
                commit.sha
            );
            continue;
        }

        let packages = modified_packages(git, graph, &ignore, &commit.sha)?;
        if packages.is_empty() {
            warn!(
                "[Explicit Version Strategies] The commit \"{}\" indicates a version bump, however no modified packages were detected. This typically implies a user error.",
                commit.sha
            );
            continue;
        }

        for name in packages {
            let entry = strategies.entry(name).or_default();
            entry.strategy_type = entry.strategy_type.merge(strategy);
            entry.commits.insert(0, commit.clone());
        }
    }

    Ok(strategies)
}

#[cfg(test)]
mod tests {
    use monoweave_changelog::ChangelogMode;
    use monoweave_core::CommitMessage;

    use super::*;
    use crate::mocks::{self, MockGitProvider};

    fn graph() -> monoweave_project::InMemoryWorkspaceGraph {
        mocks::graph(vec![
            mocks::workspace("pkg-a", "1.0.0"),
            mocks::workspace("pkg-b", "1.0.0"),
        ])
    }

    #[test]
    fn commits_merge_to_highest_strategy_newest_first() -> anyhow::Result<()> {
        let git = MockGitProvider::new()
            .with_commit("c1", "fix: bug", &["packages/pkg-a/a.js"])
            .with_commit("c2", "feat: thing", &["packages/pkg-a/b.js", "packages/pkg-b/b.js"])
            .with_commit("c3", "fix: other", &["packages/pkg-a/c.js"]);

        let strategies = conventional_strategies(&git, &graph(), &mocks::config())?;

        let a = &strategies["pkg-a"];
        assert_eq!(a.strategy_type, StrategyType::Minor);
        let shas: Vec<&str> = a.commits.iter().map(|c| c.sha.as_str()).collect();
        assert_eq!(shas, vec!["c3", "c2", "c1"]);

        assert_eq!(strategies["pkg-b"].strategy_type, StrategyType::Minor);
        assert_eq!(
            strategies["pkg-b"].commits,
            vec![CommitMessage::new("c2", "feat: thing")]
        );
        Ok(())
    }

    #[test]
    fn non_bumping_commits_are_skipped() -> anyhow::Result<()> {
        let git = MockGitProvider::new()
            .with_commit("c1", "chore: tidy", &["packages/pkg-a/a.js"]);

        let strategies = conventional_strategies(&git, &graph(), &mocks::config())?;
        assert!(strategies.is_empty());
        Ok(())
    }

    #[test]
    fn minimum_strategy_is_the_floor() -> anyhow::Result<()> {
        let git = MockGitProvider::new()
            .with_commit("c1", "chore: tidy", &["packages/pkg-a/a.js"]);
        let mut config = mocks::config();
        config.version_strategy.minimum_strategy = Some(StrategyType::Patch);

        let strategies = conventional_strategies(&git, &graph(), &config)?;
        assert_eq!(strategies["pkg-a"].strategy_type, StrategyType::Patch);
        assert!(!strategies.contains_key("pkg-b"));
        Ok(())
    }

    #[test]
    fn breaking_change_is_major() -> anyhow::Result<()> {
        let git = MockGitProvider::new().with_commit(
            "c1",
            "feat: new api\n\nBREAKING CHANGE: removed old api",
            &["packages/pkg-b/index.js"],
        );
        let mut config = mocks::config();
        config.changelog_mode = ChangelogMode::Conventional(Default::default());

        let strategies = conventional_strategies(&git, &graph(), &config)?;
        assert_eq!(strategies["pkg-b"].strategy_type, StrategyType::Major);
        Ok(())
    }

    #[test]
    fn bump_without_packages_is_not_an_error() -> anyhow::Result<()> {
        let git = MockGitProvider::new().with_commit("c1", "feat: docs site", &["README.md"]);

        let strategies = conventional_strategies(&git, &graph(), &mocks::config())?;
        assert!(strategies.is_empty());
        Ok(())
    }

    #[test]
    fn ignored_commits_never_count() -> anyhow::Result<()> {
        let git = MockGitProvider::new()
            .with_commit("c1", "feat: x [skip-ci]", &["packages/pkg-a/a.js"]);
        let mut config = mocks::config();
        config.commit_ignore_patterns = vec![r"\[skip-ci\]".to_string()];

        let explicit = explicit_strategies(&git, &graph(), &config)?;
        assert!(explicit.strategies.is_empty());
        assert!(explicit.version_files.is_empty());
        Ok(())
    }
}
