mod changelog;
mod config;
mod conventional;
mod error;
mod forge;
mod writer;

pub use changelog::{Changelog, LEGACY_MARKER, MARKER};
pub use config::{ChangelogMode, ConventionalRules};
pub use conventional::{classify_default, write_conventional};
pub use error::ChangelogError;
pub use forge::{Forge, RepositoryInfo};
pub use writer::{TemplateContext, generate_entry, manual_entry, write_default};

pub type Result<T> = std::result::Result<T, ChangelogError>;
