use std::sync::Arc;

use semver::Version;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

use monoweave_core::{DistTags, LATEST_TAG, RegistryMode, RegistryTagSet};

use crate::client::RegistryClient;
use crate::error::RegistryError;

/// One publishable package whose tags should be looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRequest {
    pub name: String,
    pub manifest_version: Option<Version>,
    pub registry_mode: RegistryMode,
}

impl TagRequest {
    fn fallback_tags(&self) -> DistTags {
        let latest = self
            .manifest_version
            .as_ref()
            .map_or_else(|| Version::new(0, 0, 0).to_string(), Version::to_string);
        DistTags::from([(LATEST_TAG.to_string(), latest)])
    }
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub registry_url: String,
    /// Concurrent lookups; 0 is unbounded.
    pub max_concurrent_reads: usize,
}

async fn fetch_one(
    client: Arc<dyn RegistryClient>,
    registry: Arc<str>,
    request: TagRequest,
) -> Result<(String, DistTags), RegistryError> {
    if request.registry_mode == RegistryMode::Manifest {
        debug!(
            "[Registry] {} uses manifest mode, skipping lookup",
            request.name
        );
        let tags = request.fallback_tags();
        return Ok((request.name, tags));
    }

    match client.dist_tags(&registry, &request.name).await {
        Ok(mut tags) => {
            if !tags.contains_key(LATEST_TAG) {
                tags.extend(request.fallback_tags());
            }
            Ok((request.name, tags))
        }
        Err(error) if error.is_not_found() => {
            info!(
                "[Registry] {} is not published yet, using its manifest version",
                request.name
            );
            let tags = request.fallback_tags();
            Ok((request.name, tags))
        }
        Err(error) => Err(error),
    }
}

/// Fetches the dist-tags of every requested package with at most
/// `max_concurrent_reads` lookups in flight. Unpublished packages fall back
/// to their manifest version, or `0.0.0`.
///
/// # Errors
///
/// Returns the first registry failure that is not a "not found" response.
/// Remaining lookups are cancelled.
pub async fn fetch_latest_tags(
    client: Arc<dyn RegistryClient>,
    requests: Vec<TagRequest>,
    options: &FetchOptions,
) -> Result<RegistryTagSet, RegistryError> {
    let permits = match options.max_concurrent_reads {
        0 => Semaphore::MAX_PERMITS,
        limit => limit,
    };
    let semaphore = Arc::new(Semaphore::new(permits));
    let registry: Arc<str> = Arc::from(options.registry_url.as_str());

    let mut tasks = JoinSet::new();
    for request in requests {
        let client = Arc::clone(&client);
        let registry = Arc::clone(&registry);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            fetch_one(client, registry, request).await
        });
    }

    let mut tags = RegistryTagSet::new();
    while let Some(joined) = tasks.join_next().await {
        let (name, package_tags) = joined??;
        tags.insert(name, package_tags);
    }

    debug!("[Registry] Fetched tags for {} package(s)", tags.len());
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct StubRegistry {
        tags: BTreeMap<String, DistTags>,
        status: BTreeMap<String, u16>,
        requested: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl StubRegistry {
        fn with_tags(mut self, name: &str, tags: &[(&str, &str)]) -> Self {
            self.tags.insert(
                name.to_string(),
                tags.iter()
                    .map(|(tag, version)| ((*tag).to_string(), (*version).to_string()))
                    .collect(),
            );
            self
        }

        fn with_status(mut self, name: &str, status: u16) -> Self {
            self.status.insert(name.to_string(), status);
            self
        }
    }

    #[async_trait]
    impl RegistryClient for StubRegistry {
        async fn dist_tags(
            &self,
            registry: &str,
            package: &str,
        ) -> Result<DistTags, RegistryError> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(current, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            self.requested
                .lock()
                .expect("lock")
                .push(package.to_string());

            if let Some(status) = self.status.get(package) {
                return Err(RegistryError::Status {
                    url: format!("{registry}/-/package/{package}/dist-tags"),
                    status: *status,
                });
            }
            Ok(self.tags.get(package).cloned().unwrap_or_default())
        }
    }

    fn request(name: &str, manifest_version: Option<&str>) -> TagRequest {
        TagRequest {
            name: name.to_string(),
            manifest_version: manifest_version.map(|v| Version::parse(v).expect("valid")),
            registry_mode: RegistryMode::Npm,
        }
    }

    fn options(registry_url: &str, max_concurrent_reads: usize) -> FetchOptions {
        FetchOptions {
            registry_url: registry_url.to_string(),
            max_concurrent_reads,
        }
    }

    fn latest<'a>(tags: &'a RegistryTagSet, name: &str) -> Option<&'a str> {
        tags.get(name)
            .and_then(|tags| tags.get(LATEST_TAG))
            .map(String::as_str)
    }

    #[tokio::test]
    async fn published_and_unpublished_packages() -> anyhow::Result<()> {
        let stub = StubRegistry::default()
            .with_tags("pkg-1", &[("latest", "0.0.1")])
            .with_tags("pkg-2", &[("latest", "0.1.0"), ("next", "4.5.0")])
            .with_status("pkg-3", 404);

        let tags = fetch_latest_tags(
            Arc::new(stub),
            vec![
                request("pkg-1", None),
                request("pkg-2", None),
                request("pkg-3", Some("1.2.0")),
                request("pkg-4", None),
            ],
            &options("https://registry.npmjs.org", 0),
        )
        .await?;

        assert_eq!(latest(&tags, "pkg-1"), Some("0.0.1"));
        assert_eq!(
            tags.get("pkg-2").and_then(|t| t.get("next")).map(String::as_str),
            Some("4.5.0")
        );
        assert_eq!(latest(&tags, "pkg-3"), Some("1.2.0"));
        assert_eq!(latest(&tags, "pkg-4"), Some("0.0.0"));
        Ok(())
    }

    #[tokio::test]
    async fn server_errors_bubble_up() {
        let stub = StubRegistry::default().with_status("pkg-1", 500);

        let result = fetch_latest_tags(
            Arc::new(stub),
            vec![request("pkg-1", None)],
            &options("https://registry.npmjs.org", 0),
        )
        .await;

        assert!(matches!(
            result,
            Err(RegistryError::Status { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn proxy_server_error_is_treated_as_missing() -> anyhow::Result<()> {
        let stub = StubRegistry::default().with_status("pkg-1", 500);

        let tags = fetch_latest_tags(
            Arc::new(stub),
            vec![request("pkg-1", None)],
            &options("https://corp.jfrog.io/artifactory/api/npm/npm", 0),
        )
        .await?;

        assert_eq!(latest(&tags, "pkg-1"), Some("0.0.0"));
        Ok(())
    }

    #[tokio::test]
    async fn manifest_mode_skips_the_network() -> anyhow::Result<()> {
        let stub = Arc::new(StubRegistry::default().with_tags("pkg-1", &[("latest", "9.9.9")]));
        let mut manifest_request = request("pkg-1", Some("1.0.0"));
        manifest_request.registry_mode = RegistryMode::Manifest;

        let client: Arc<dyn RegistryClient> = stub.clone();
        let tags = fetch_latest_tags(
            client,
            vec![manifest_request],
            &options("https://registry.npmjs.org", 0),
        )
        .await?;

        assert_eq!(latest(&tags, "pkg-1"), Some("1.0.0"));
        assert!(stub.requested.lock().expect("lock").is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn concurrency_is_bounded() -> anyhow::Result<()> {
        let stub = Arc::new(StubRegistry::default());
        let requests = (0..8).map(|i| request(&format!("pkg-{i}"), None)).collect();

        let client: Arc<dyn RegistryClient> = stub.clone();
        let tags = fetch_latest_tags(
            client,
            requests,
            &options("https://registry.npmjs.org", 2),
        )
        .await?;

        assert_eq!(tags.len(), 8);
        assert!(stub.peak.load(Ordering::SeqCst) <= 2);
        Ok(())
    }
}
