use monoweave_core::StrategyType;
use semver::Version;

use crate::increment::{Release, increment};
use crate::{Result, VersionError};

/// Prerelease settings for one package.
#[derive(Debug, Clone, Copy)]
pub struct PrereleaseOptions<'a> {
    pub identifier: &'a str,
    /// Version currently published under the prerelease dist-tag, if any.
    pub current: Option<&'a Version>,
}

/// Computes the next version for a package whose last stable release is `latest`.
///
/// In prerelease mode the candidate is the `pre*` increment of `latest`. If the
/// published prerelease is already at or past that candidate, its counter is
/// bumped instead, so successive prerelease runs yield `-id.0`, `-id.1`, ...
/// Because `latest` only tracks stable releases, a later stable run squashes all
/// intermediate prereleases into a single bump from the pre-prerelease baseline.
///
/// # Errors
///
/// Returns an error if the prerelease identifier is not a valid semver identifier.
pub fn next_version(
    latest: &Version,
    strategy: StrategyType,
    prerelease: Option<PrereleaseOptions<'_>>,
) -> Result<Version> {
    let Some(release) = Release::from_strategy(strategy, prerelease.is_some()) else {
        return Ok(latest.clone());
    };

    let Some(options) = prerelease else {
        return increment(latest, release, None);
    };

    let candidate = increment(latest, release, Some(options.identifier))?;
    match options.current {
        Some(current) if *current >= candidate => {
            increment(current, Release::Prerelease, Some(options.identifier))
        }
        _ => Ok(candidate),
    }
}

/// Parses `value`, falling back to `0.0.0` when it is absent.
///
/// # Errors
///
/// Returns [`VersionError::InvalidVersion`] if `value` is present but not valid semver.
pub fn parse_version_or_default(value: Option<&str>) -> Result<Version> {
    match value {
        None => Ok(Version::new(0, 0, 0)),
        Some(raw) => Version::parse(raw.trim()).map_err(|source| VersionError::InvalidVersion {
            value: raw.to_string(),
            source,
        }),
    }
}
