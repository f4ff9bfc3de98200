use std::collections::BTreeMap;

use monoweave_changelog::{RepositoryInfo, TemplateContext, generate_entry, manual_entry};
use monoweave_core::{
    Changeset, ChangesetRecord, LATEST_TAG, RegistryTagSet, StrategyMap, StrategyType,
    VersionStrategy, Workspace,
};
use monoweave_project::{MonoweaveConfig, WorkspaceGraph, group_key, workspace_groups};
use monoweave_version::{PrereleaseOptions, next_version, parse_version_or_default};
use semver::Version;
use tracing::debug;

use crate::Result;

/// One package on its way into the changeset.
struct Pending<'a> {
    workspace: &'a Workspace,
    strategy: VersionStrategy,
    group: String,
    previous_version: Option<String>,
    version: Version,
}

/// Turns merged strategies into changeset records: concrete versions, shared
/// group tags and changelog entries.
pub struct ChangesetBuilder<'a> {
    graph: &'a dyn WorkspaceGraph,
    config: &'a MonoweaveConfig,
    tags: &'a RegistryTagSet,
    remote_url: Option<String>,
}

impl<'a> ChangesetBuilder<'a> {
    #[must_use]
    pub fn new(
        graph: &'a dyn WorkspaceGraph,
        config: &'a MonoweaveConfig,
        tags: &'a RegistryTagSet,
    ) -> Self {
        Self {
            graph,
            config,
            tags,
            remote_url: None,
        }
    }

    /// Repository used for changelog links when no manifest declares one.
    #[must_use]
    pub fn with_remote_url(mut self, remote_url: Option<String>) -> Self {
        self.remote_url = remote_url;
        self
    }

    /// # Errors
    ///
    /// Returns `OperationError::VersionCalculation` if a published version is
    /// not valid semver or the prerelease identifier is invalid.
    pub fn build(&self, strategies: &StrategyMap) -> Result<Changeset> {
        let selected = self.with_groups(strategies);

        let mut pending = Vec::with_capacity(selected.len());
        for (name, (strategy, group)) in selected {
            let Some(workspace) = self.graph.workspace_by_name(&name) else {
                continue;
            };
            let (latest, previous_version) = self.previous_version(&name, workspace)?;
            let prerelease = self.prerelease_options(&name);
            let options = prerelease
                .as_ref()
                .map(|(identifier, current)| PrereleaseOptions {
                    identifier,
                    current: current.as_ref(),
                });
            let version = next_version(&latest, strategy.strategy_type, options)?;
            pending.push(Pending {
                workspace,
                strategy,
                group,
                previous_version,
                version,
            });
        }

        let mut group_versions: BTreeMap<&str, Version> = BTreeMap::new();
        for item in &pending {
            let shared = group_versions
                .entry(item.group.as_str())
                .or_insert_with(|| item.version.clone());
            if item.version > *shared {
                *shared = item.version.clone();
            }
        }

        let mut changeset = Changeset::new();
        for item in &pending {
            let Some(name) = item.workspace.name.as_deref() else {
                continue;
            };
            let version = group_versions
                .get(item.group.as_str())
                .unwrap_or(&item.version)
                .to_string();

            let changelog = self.changelog(name, &version, item);
            debug!("[Changeset] {name}: {version} ({})", item.strategy.strategy_type);

            changeset.insert(
                name.to_string(),
                ChangesetRecord {
                    tag: Some(format!("{}@{version}", item.group)),
                    version,
                    previous_version: item.previous_version.clone(),
                    changelog,
                    strategy: Some(item.strategy.strategy_type),
                    group: item.group.clone(),
                },
            );
        }

        Ok(changeset)
    }

    /// Publishable packages with a bump, widened to every publishable member
    /// of their groups. Members share the highest strategy of the group.
    fn with_groups(&self, strategies: &StrategyMap) -> BTreeMap<String, (VersionStrategy, String)> {
        let mut selected: BTreeMap<String, (VersionStrategy, String)> = BTreeMap::new();

        for (name, strategy) in strategies {
            if strategy.strategy_type.is_none() {
                continue;
            }
            let Some(workspace) = self.graph.workspace_by_name(name) else {
                debug!("[Changeset] Skipping unknown package {name}");
                continue;
            };
            if !workspace.is_publishable() {
                debug!("[Changeset] Skipping private package {name}");
                continue;
            }
            let group = group_key(workspace).unwrap_or(name).to_string();
            selected.insert(name.clone(), (strategy.clone(), group));
        }

        for (key, members) in workspace_groups(self.graph) {
            let group_strategy = members
                .iter()
                .filter_map(|member| selected.get(member))
                .map(|(strategy, _)| strategy.strategy_type)
                .max();
            let Some(group_strategy) = group_strategy else {
                continue;
            };

            for member in members {
                let entry = selected.entry(member).or_insert_with(|| {
                    (
                        VersionStrategy {
                            strategy_type: group_strategy,
                            ..VersionStrategy::default()
                        },
                        key.clone(),
                    )
                });
                entry.0.strategy_type = group_strategy;
            }
        }

        selected
    }

    /// Baseline to bump from, and the previous version to report.
    fn previous_version(
        &self,
        name: &str,
        workspace: &Workspace,
    ) -> Result<(Version, Option<String>)> {
        let published = self
            .tags
            .get(name)
            .and_then(|tags| tags.get(LATEST_TAG))
            .cloned();
        let previous = published.or_else(|| workspace.version.as_ref().map(Version::to_string));
        let latest = parse_version_or_default(previous.as_deref())?;
        Ok((latest, previous))
    }

    fn prerelease_options(&self, name: &str) -> Option<(&str, Option<Version>)> {
        if !self.config.prerelease {
            return None;
        }
        let current = self
            .tags
            .get(name)
            .and_then(|tags| tags.get(&self.config.prerelease_npm_tag))
            .and_then(|raw| match Version::parse(raw) {
                Ok(version) => Some(version),
                Err(err) => {
                    debug!("[Changeset] Ignoring invalid prerelease tag {raw} of {name}: {err}");
                    None
                }
            });
        Some((self.config.prerelease_id.as_str(), current))
    }

    fn repository(&self, workspace: &Workspace) -> Option<RepositoryInfo> {
        let value = workspace
            .repository
            .clone()
            .or_else(|| self.graph.top_level().repository.clone())
            .or_else(|| self.remote_url.clone())?;
        match RepositoryInfo::parse(&value) {
            Ok(info) => Some(info),
            Err(err) => {
                debug!("[Changeset] No repository links: {err}");
                None
            }
        }
    }

    fn changelog(&self, name: &str, version: &str, item: &Pending<'_>) -> Option<String> {
        if self.config.changelog_mode.is_manual() {
            if let Some(text) = item.strategy.changelog.as_deref().filter(|t| !t.is_empty()) {
                return Some(manual_entry(name, version, text));
            }
        }

        let repository = self.repository(item.workspace);
        let context = TemplateContext::new(
            name,
            version,
            item.previous_version.as_deref(),
            repository.as_ref(),
            item.workspace.author.as_deref(),
        );
        generate_entry(
            &self.config.changelog_mode,
            &item.strategy.commits,
            &context,
        )
    }
}

/// Highest strategy in a changeset, for summaries.
#[must_use]
pub fn highest_strategy(changeset: &Changeset) -> StrategyType {
    changeset
        .values()
        .filter_map(|record| record.strategy)
        .max()
        .unwrap_or_default()
}
