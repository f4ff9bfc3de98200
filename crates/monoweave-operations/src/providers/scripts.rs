use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::Result;
use crate::error::OperationError;
use crate::traits::{ScriptJob, ScriptRunner};

const DEFAULT_SHELL: &str = "sh";

/// Runs manifest scripts through `sh -c` inside the package directory.
pub struct ProcessScriptRunner {
    shell: String,
}

impl ProcessScriptRunner {
    #[must_use]
    pub fn new() -> Self {
        Self {
            shell: DEFAULT_SHELL.to_string(),
        }
    }

    #[must_use]
    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for ProcessScriptRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScriptRunner for ProcessScriptRunner {
    async fn run(&self, job: ScriptJob) -> Result<()> {
        info!("[Lifecycle] {} {}", job.package, job.script);
        debug!(command = %job.command, dir = %job.directory.display(), "[Lifecycle] Spawning");

        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(&job.command)
            .current_dir(&job.directory)
            .env("npm_lifecycle_event", &job.script)
            .env("npm_package_name", &job.package)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| OperationError::ScriptSpawn {
                package: job.package.clone(),
                script: job.script.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            debug!("[Lifecycle] {} {}: {}", job.package, job.script, stdout.trim());
        }

        if !output.status.success() {
            return Err(OperationError::LifecycleScript {
                package: job.package,
                script: job.script,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}
