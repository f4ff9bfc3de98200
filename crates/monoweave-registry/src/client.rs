use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use monoweave_core::DistTags;

use crate::error::RegistryError;

pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

const USER_AGENT: &str = concat!("monoweave/", env!("CARGO_PKG_VERSION"));

/// Read access to an npm compatible registry.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// All dist-tags published for `package`.
    async fn dist_tags(&self, registry: &str, package: &str) -> Result<DistTags, RegistryError>;
}

/// `{registry}/-/package/{name}/dist-tags`, with the scope separator encoded.
#[must_use]
pub fn dist_tags_url(registry: &str, package: &str) -> String {
    format!(
        "{}/-/package/{}/dist-tags",
        registry.trim_end_matches('/'),
        package.replace('/', "%2f")
    )
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TagValue {
    Single(String),
    List(Vec<String>),
}

impl TagValue {
    fn into_version(self) -> Option<String> {
        match self {
            Self::Single(version) => Some(version),
            Self::List(versions) => versions.into_iter().next(),
        }
    }
}

pub struct HttpRegistryClient {
    client: Client,
}

impl HttpRegistryClient {
    /// # Errors
    ///
    /// Returns `RegistryError::Client` if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, RegistryError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(RegistryError::Client)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RegistryClient for HttpRegistryClient {
    async fn dist_tags(&self, registry: &str, package: &str) -> Result<DistTags, RegistryError> {
        let url = dist_tags_url(registry, package);
        debug!(%url, "[Registry] Fetching dist-tags");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|source| RegistryError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let tags: BTreeMap<String, TagValue> =
            response
                .json()
                .await
                .map_err(|source| RegistryError::InvalidResponse {
                    url: url.clone(),
                    source,
                })?;

        Ok(tags
            .into_iter()
            .filter_map(|(tag, value)| value.into_version().map(|version| (tag, version)))
            .collect())
    }
}
