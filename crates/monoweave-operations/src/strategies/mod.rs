//! Resolution of per-package version strategies.
//!
//! Explicit strategies come from commit messages or version files, implicit
//! ones from the dependency graph, and the two are merged before versions are
//! computed.

mod commits;
mod explicit;
mod implicit;
mod manual;
mod merge;

pub use commits::{
    CommitFilter, changeset_ignore_set, commit_range, harvest_commits, modified_packages,
};
pub use explicit::{ExplicitStrategies, conventional_strategies, explicit_strategies};
pub use implicit::implicit_strategies;
pub use manual::{discover_version_files, manual_strategies};
pub use merge::merge_strategies;
