mod coerce;
mod error;
mod increment;
mod resolve;

pub use coerce::coerce_peer_version;
pub use error::VersionError;
pub use increment::{Release, increment};
pub use resolve::{PrereleaseOptions, next_version, parse_version_or_default};

pub type Result<T> = std::result::Result<T, VersionError>;
