use std::path::Path;
use std::sync::Arc;

use monoweave_project::WorkspaceGraph;

use crate::Result;

pub trait ProjectProvider: Send + Sync {
    /// Loads the workspace graph of the monorepo enclosing `start_dir`.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::NoWorkspace` if no project can be found from
    /// the given path.
    fn discover(&self, start_dir: &Path, group_field: Option<&str>)
    -> Result<Arc<dyn WorkspaceGraph>>;
}
