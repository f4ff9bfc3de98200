use std::path::PathBuf;

use async_trait::async_trait;

use crate::Result;

/// One lifecycle script of one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptJob {
    pub package: String,
    pub directory: PathBuf,
    pub script: String,
    pub command: String,
}

#[async_trait]
pub trait ScriptRunner: Send + Sync {
    /// # Errors
    ///
    /// Returns `OperationError::LifecycleScript` if the script exits with a
    /// non-zero status.
    async fn run(&self, job: ScriptJob) -> Result<()>;
}
