use std::sync::Arc;

use monoweave_core::Changeset;
use monoweave_project::MonoweaveConfig;
use tracing::{debug, info};

use crate::Result;
use crate::error::OperationError;
use crate::traits::ReleaseHook;

/// Calls every hook in registration order, stopping at the first failure.
///
/// # Errors
///
/// Returns `OperationError::Hook` naming the hook that failed.
pub async fn run_release_hooks(
    hooks: &[Arc<dyn ReleaseHook>],
    config: &MonoweaveConfig,
    changeset: &Changeset,
) -> Result<()> {
    for hook in hooks {
        debug!("[Hooks] Running {}", hook.name());
        hook.on_release_available(config, changeset)
            .await
            .map_err(|source| OperationError::Hook {
                hook: hook.name().to_string(),
                source,
            })?;
    }
    if !hooks.is_empty() {
        info!("[Hooks] Ran {} release hook(s)", hooks.len());
    }
    Ok(())
}
