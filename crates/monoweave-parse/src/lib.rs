mod error;
mod parse;
mod serialize;

pub use error::{FormatError, FrontMatterError, ValidationError};
pub use parse::parse_deferred_version;
pub use serialize::{content_hash, deferred_version_file_name, serialize_deferred_version};
