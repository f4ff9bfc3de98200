use std::sync::Arc;

use monoweave_core::RegistryTagSet;
use monoweave_project::{MonoweaveConfig, WorkspaceGraph, group_key};
use monoweave_registry::{
    DEFAULT_REGISTRY_URL, FetchOptions, RegistryClient, TagRequest, fetch_latest_tags,
};

use crate::Result;

/// Registry lookups for every publishable workspace, honouring per-group
/// registry modes.
#[must_use]
pub fn tag_requests(graph: &dyn WorkspaceGraph, config: &MonoweaveConfig) -> Vec<TagRequest> {
    graph
        .workspaces()
        .iter()
        .filter(|ws| ws.is_publishable())
        .filter_map(|ws| {
            let name = ws.name.clone()?;
            let group = group_key(ws).unwrap_or(&name);
            Some(TagRequest {
                registry_mode: config.registry_mode_for_group(group),
                manifest_version: ws.version.clone(),
                name,
            })
        })
        .collect()
}

/// Dist-tags of every publishable workspace.
///
/// # Errors
///
/// Returns `OperationError::Registry` for registry failures other than a
/// missing package.
pub async fn latest_tags(
    client: Arc<dyn RegistryClient>,
    graph: &dyn WorkspaceGraph,
    config: &MonoweaveConfig,
) -> Result<RegistryTagSet> {
    let options = FetchOptions {
        registry_url: config
            .registry_url
            .clone()
            .unwrap_or_else(|| DEFAULT_REGISTRY_URL.to_string()),
        max_concurrent_reads: config.max_concurrent_reads,
    };

    let tags = fetch_latest_tags(client, tag_requests(graph, config), &options).await?;
    Ok(tags)
}
