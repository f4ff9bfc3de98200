use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Severity of a version bump. Variants are declared in ascending order so
/// that `Ord` matches `none < patch < minor < major`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum StrategyType {
    #[default]
    None,
    Patch,
    Minor,
    Major,
}

impl StrategyType {
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        self.max(other)
    }

    #[must_use]
    pub fn is_none(self) -> bool {
        self == Self::None
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Patch => "patch",
            Self::Minor => "minor",
            Self::Major => "major",
        }
    }

    /// Parses a strategy token as written in a deferred version file.
    ///
    /// Empty tokens yield `Ok(None)`. Only `patch`, `minor` and `major` are
    /// accepted otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidStrategy`] for any other non-empty token.
    pub fn from_manual_token(token: &str) -> Result<Option<Self>, CoreError> {
        match token.trim() {
            "" => Ok(None),
            "patch" => Ok(Some(Self::Patch)),
            "minor" => Ok(Some(Self::Minor)),
            "major" => Ok(Some(Self::Major)),
            other => Err(CoreError::InvalidStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for StrategyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "patch" => Ok(Self::Patch),
            "minor" => Ok(Self::Minor),
            "major" => Ok(Self::Major),
            _ => Err(CoreError::InvalidStrategy(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitMessage {
    pub sha: String,
    pub body: String,
}

impl CommitMessage {
    #[must_use]
    pub fn new(sha: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            sha: sha.into(),
            body: body.into(),
        }
    }

    /// Text matched against commit ignore patterns: the sha, a newline, then the body.
    #[must_use]
    pub fn ignore_subject(&self) -> String {
        format!("{}\n{}", self.sha, self.body)
    }
}

/// Resolved bump decision for one package.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VersionStrategy {
    pub strategy_type: StrategyType,
    /// Contributing commits, most recent first.
    pub commits: Vec<CommitMessage>,
    /// Manual changelog text aggregated from deferred version files.
    pub changelog: Option<String>,
}

impl VersionStrategy {
    #[must_use]
    pub fn implicit() -> Self {
        Self {
            strategy_type: StrategyType::Patch,
            commits: Vec::new(),
            changelog: None,
        }
    }
}

pub type StrategyMap = BTreeMap<String, VersionStrategy>;

/// Dist-tag name to version string, as published in the registry.
pub type DistTags = BTreeMap<String, String>;

/// Package name to its dist-tags.
pub type RegistryTagSet = BTreeMap<String, DistTags>;

pub const LATEST_TAG: &str = "latest";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RegistryMode {
    #[default]
    Npm,
    Manifest,
}

impl FromStr for RegistryMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "npm" => Ok(Self::Npm),
            "manifest" => Ok(Self::Manifest),
            other => Err(CoreError::InvalidRegistryMode(other.to_string())),
        }
    }
}

/// Final release decision for one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangesetRecord {
    pub version: String,
    pub previous_version: Option<String>,
    pub changelog: Option<String>,
    pub tag: Option<String>,
    pub strategy: Option<StrategyType>,
    pub group: String,
}

pub type Changeset = BTreeMap<String, ChangesetRecord>;

/// One manually authored version file.
///
/// Strategy tokens are kept verbatim so that validation can report the
/// offending value; see [`StrategyType::from_manual_token`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeferredVersionRecord {
    pub strategies: IndexMap<String, Option<String>>,
    pub changelog: String,
}
