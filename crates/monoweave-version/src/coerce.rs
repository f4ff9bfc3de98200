use monoweave_core::StrategyType;
use semver::{BuildMetadata, Prerelease, Version};

/// Rounds `version` down to the boundary implied by `strategy`, for use in
/// peer-dependency ranges.
///
/// `minor` clears the patch component and `major` clears minor and patch.
/// Versions are never rounded across the `0.0.x` boundary for `minor` or the
/// `0.x` boundary for `major`, and prerelease versions are left untouched.
#[must_use]
pub fn coerce_peer_version(version: &Version, strategy: StrategyType) -> Version {
    if !version.pre.is_empty() {
        return version.clone();
    }

    let (minor, patch) = match strategy {
        StrategyType::None | StrategyType::Patch => return version.clone(),
        StrategyType::Minor if version.major == 0 && version.minor == 0 => {
            return version.clone();
        }
        StrategyType::Minor => (version.minor, 0),
        StrategyType::Major if version.major == 0 => return version.clone(),
        StrategyType::Major => (0, 0),
    };

    Version {
        major: version.major,
        minor,
        patch,
        pre: Prerelease::EMPTY,
        build: BuildMetadata::EMPTY,
    }
}
