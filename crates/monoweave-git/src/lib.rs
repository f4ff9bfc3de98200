mod error;
mod repository;
mod types;

pub use error::GitError;
pub use repository::{GithubRefs, Repository, is_release_tag};
pub use types::{CommitInfo, TagInfo, TaggedCommit};

pub type Result<T> = std::result::Result<T, GitError>;
