use std::path::Path;

use monoweave_changelog::Changelog;

use crate::Result;
use crate::traits::ChangelogWriter;

pub struct FileSystemChangelogWriter;

impl FileSystemChangelogWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileSystemChangelogWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangelogWriter for FileSystemChangelogWriter {
    fn prepend(&self, path: &Path, entry: &str) -> Result<()> {
        let mut changelog = Changelog::open(path)?;
        changelog.prepend(entry)?;
        changelog.write()?;
        Ok(())
    }
}
