use std::path::Path;

use monoweave_manifest::ManifestPatch;

use crate::Result;
use crate::traits::ManifestWriter;

pub struct FileSystemManifestWriter;

impl FileSystemManifestWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileSystemManifestWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestWriter for FileSystemManifestWriter {
    fn read_raw(&self, manifest_path: &Path) -> Result<String> {
        Ok(monoweave_manifest::read_raw(manifest_path)?)
    }

    fn patch(&self, manifest_path: &Path, patch: &ManifestPatch) -> Result<bool> {
        Ok(monoweave_manifest::patch_manifest(manifest_path, patch)?)
    }

    fn restore(&self, manifest_path: &Path, content: &str) -> Result<()> {
        Ok(monoweave_manifest::restore_raw(manifest_path, content)?)
    }
}
