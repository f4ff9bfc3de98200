use monoweave_core::StrategyType;
use semver::{BuildMetadata, Prerelease, Version};

use crate::{Result, VersionError};

/// Increment kinds, following the npm `semver.inc` release types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    Major,
    Minor,
    Patch,
    PreMajor,
    PreMinor,
    PrePatch,
    Prerelease,
}

impl Release {
    /// Maps a strategy to its release type, or `None` for [`StrategyType::None`].
    #[must_use]
    pub fn from_strategy(strategy: StrategyType, prerelease: bool) -> Option<Self> {
        match (strategy, prerelease) {
            (StrategyType::None, _) => None,
            (StrategyType::Major, false) => Some(Self::Major),
            (StrategyType::Minor, false) => Some(Self::Minor),
            (StrategyType::Patch, false) => Some(Self::Patch),
            (StrategyType::Major, true) => Some(Self::PreMajor),
            (StrategyType::Minor, true) => Some(Self::PreMinor),
            (StrategyType::Patch, true) => Some(Self::PrePatch),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Identifier {
    Numeric(u64),
    Alpha(String),
}

impl Identifier {
    fn parse(part: &str) -> Self {
        part.parse::<u64>()
            .map_or_else(|_| Self::Alpha(part.to_string()), Self::Numeric)
    }

    fn render(&self) -> String {
        match self {
            Self::Numeric(n) => n.to_string(),
            Self::Alpha(s) => s.clone(),
        }
    }
}

struct Parts {
    major: u64,
    minor: u64,
    patch: u64,
    pre: Vec<Identifier>,
}

impl Parts {
    fn from_version(version: &Version) -> Self {
        let pre = if version.pre.is_empty() {
            Vec::new()
        } else {
            version.pre.as_str().split('.').map(Identifier::parse).collect()
        };
        Self {
            major: version.major,
            minor: version.minor,
            patch: version.patch,
            pre,
        }
    }

    fn into_version(self) -> Result<Version> {
        let pre = if self.pre.is_empty() {
            Prerelease::EMPTY
        } else {
            let rendered = self
                .pre
                .iter()
                .map(Identifier::render)
                .collect::<Vec<_>>()
                .join(".");
            Prerelease::new(&rendered).map_err(|source| VersionError::InvalidPrerelease {
                identifier: rendered,
                source,
            })?
        };

        Ok(Version {
            major: self.major,
            minor: self.minor,
            patch: self.patch,
            pre,
            build: BuildMetadata::EMPTY,
        })
    }

    fn bump_major(&mut self) {
        if self.minor != 0 || self.patch != 0 || self.pre.is_empty() {
            self.major += 1;
        }
        self.minor = 0;
        self.patch = 0;
        self.pre.clear();
    }

    fn bump_minor(&mut self) {
        if self.patch != 0 || self.pre.is_empty() {
            self.minor += 1;
        }
        self.patch = 0;
        self.pre.clear();
    }

    fn bump_patch(&mut self) {
        if self.pre.is_empty() {
            self.patch += 1;
        }
        self.pre.clear();
    }

    fn bump_pre(&mut self, identifier: Option<&str>) {
        if self.pre.is_empty() {
            self.pre.push(Identifier::Numeric(0));
        } else if let Some(last) = self
            .pre
            .iter_mut()
            .rev()
            .find_map(|part| match part {
                Identifier::Numeric(n) => Some(n),
                Identifier::Alpha(_) => None,
            })
        {
            *last += 1;
        } else {
            self.pre.push(Identifier::Numeric(0));
        }

        let Some(identifier) = identifier else {
            return;
        };
        let fresh = vec![
            Identifier::Alpha(identifier.to_string()),
            Identifier::Numeric(0),
        ];
        let same_identifier =
            matches!(self.pre.first(), Some(first) if first.render() == identifier);
        if !same_identifier || !matches!(self.pre.get(1), Some(Identifier::Numeric(_))) {
            self.pre = fresh;
        }
    }
}

/// Increments `version` the way npm's `semver.inc(version, release, identifier)` does.
///
/// Build metadata is always dropped.
///
/// # Errors
///
/// Returns [`VersionError::InvalidPrerelease`] if `identifier` cannot form a
/// valid prerelease.
pub fn increment(version: &Version, release: Release, identifier: Option<&str>) -> Result<Version> {
    let mut parts = Parts::from_version(version);

    match release {
        Release::Major => parts.bump_major(),
        Release::Minor => parts.bump_minor(),
        Release::Patch => parts.bump_patch(),
        Release::PreMajor => {
            parts.pre.clear();
            parts.patch = 0;
            parts.minor = 0;
            parts.major += 1;
            parts.bump_pre(identifier);
        }
        Release::PreMinor => {
            parts.pre.clear();
            parts.patch = 0;
            parts.minor += 1;
            parts.bump_pre(identifier);
        }
        Release::PrePatch => {
            parts.pre.clear();
            parts.bump_patch();
            parts.bump_pre(identifier);
        }
        Release::Prerelease => {
            if parts.pre.is_empty() {
                parts.bump_patch();
            }
            parts.bump_pre(identifier);
        }
    }

    parts.into_version()
}
