use std::path::Path;

use crate::Result;

pub trait ChangelogWriter: Send + Sync {
    /// Splices `entry` into the changelog at `path` below its marker,
    /// creating the file if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the changelog cannot be read or written, or has no
    /// marker.
    fn prepend(&self, path: &Path, entry: &str) -> Result<()>;
}
