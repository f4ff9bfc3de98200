use std::path::Path;

use monoweave_manifest::ManifestPatch;

use crate::Result;

pub trait ManifestWriter: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be read.
    fn read_raw(&self, manifest_path: &Path) -> Result<String>;

    /// Returns whether the manifest changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be read, parsed, or written.
    fn patch(&self, manifest_path: &Path, patch: &ManifestPatch) -> Result<bool>;

    /// # Errors
    ///
    /// Returns an error if the manifest cannot be written.
    fn restore(&self, manifest_path: &Path, content: &str) -> Result<()>;
}
