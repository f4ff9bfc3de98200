use async_trait::async_trait;

use monoweave_core::Changeset;
use monoweave_project::MonoweaveConfig;

pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Side effects run once a release has been tagged, in registration order.
#[async_trait]
pub trait ReleaseHook: Send + Sync {
    fn name(&self) -> &str;

    /// # Errors
    ///
    /// Any error aborts the remaining hooks and fails the release.
    async fn on_release_available(
        &self,
        config: &MonoweaveConfig,
        changeset: &Changeset,
    ) -> Result<(), HookError>;
}
