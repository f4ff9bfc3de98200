mod client;
mod error;
mod fetch;

pub use client::{DEFAULT_REGISTRY_URL, HttpRegistryClient, RegistryClient, dist_tags_url};
pub use error::RegistryError;
pub use fetch::{FetchOptions, TagRequest, fetch_latest_tags};

pub type Result<T> = std::result::Result<T, RegistryError>;
