mod changelog;
mod git;
mod manifest;
mod project;
mod scripts;

pub use changelog::FileSystemChangelogWriter;
pub use git::Git2Provider;
pub use manifest::FileSystemManifestWriter;
pub use project::FileSystemProjectProvider;
pub use scripts::ProcessScriptRunner;
