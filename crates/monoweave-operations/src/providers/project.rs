use std::path::Path;
use std::sync::Arc;

use monoweave_project::{InMemoryWorkspaceGraph, ProjectError, WorkspaceGraph, discover_project};

use crate::Result;
use crate::error::OperationError;
use crate::traits::ProjectProvider;

pub struct FileSystemProjectProvider;

impl FileSystemProjectProvider {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileSystemProjectProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectProvider for FileSystemProjectProvider {
    fn discover(
        &self,
        start_dir: &Path,
        group_field: Option<&str>,
    ) -> Result<Arc<dyn WorkspaceGraph>> {
        let project = discover_project(start_dir, group_field).map_err(|err| match err {
            ProjectError::NotFound { start_dir } => OperationError::NoWorkspace(start_dir),
            other => other.into(),
        })?;
        Ok(Arc::new(InMemoryWorkspaceGraph::from(project)))
    }
}
