mod error;
mod reader;
mod writer;

pub use error::ManifestError;
pub use reader::{read_document, read_raw, read_version};
pub use writer::{
    ManifestPatch, patch_manifest, restore_raw, rewrite_range, write_document, write_version,
};

pub type Result<T> = std::result::Result<T, ManifestError>;
