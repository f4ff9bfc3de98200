use indexmap::IndexMap;
use serde::Deserialize;

use monoweave_core::StrategyType;

use crate::conventional::{classify_conventional, classify_default};

/// Commit type rules used when a conventional changelog config is supplied.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct ConventionalRules {
    /// Commit type to bump strategy. Unlisted types bump nothing.
    pub types: IndexMap<String, StrategyType>,
    /// Commit type to changelog section title, in rendering order.
    pub sections: IndexMap<String, String>,
    /// Strategy for commits flagged as breaking.
    pub breaking: StrategyType,
}

impl Default for ConventionalRules {
    fn default() -> Self {
        let types = [
            ("feat", StrategyType::Minor),
            ("fix", StrategyType::Patch),
            ("perf", StrategyType::Patch),
        ]
        .into_iter()
        .map(|(ty, strategy)| (ty.to_string(), strategy))
        .collect();

        let sections = [
            ("feat", "Features"),
            ("fix", "Bug Fixes"),
            ("perf", "Performance Improvements"),
            ("revert", "Reverts"),
        ]
        .into_iter()
        .map(|(ty, title)| (ty.to_string(), title.to_string()))
        .collect();

        Self {
            types,
            sections,
            breaking: StrategyType::Major,
        }
    }
}

/// How commits are classified and how changelog text is produced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChangelogMode {
    /// Built-in classifier and the plain changelog writer.
    #[default]
    Default,
    /// Conventional commit rules and the sectioned writer.
    Conventional(ConventionalRules),
    /// Strategies come from deferred version files instead of commits.
    Manual,
}

impl ChangelogMode {
    #[must_use]
    pub fn is_manual(&self) -> bool {
        matches!(self, Self::Manual)
    }

    /// Severity implied by a single commit body. Manual mode never derives
    /// strategies from commits.
    #[must_use]
    pub fn classify(&self, body: &str) -> StrategyType {
        match self {
            Self::Default => classify_default(body),
            Self::Conventional(rules) => classify_conventional(rules, body),
            Self::Manual => StrategyType::None,
        }
    }
}
