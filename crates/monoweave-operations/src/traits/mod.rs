mod changelog_writer;
mod git_provider;
mod manifest_writer;
mod project_provider;
mod release_hook;
mod script_runner;

pub use changelog_writer::ChangelogWriter;
pub use git_provider::GitProvider;
pub use manifest_writer::ManifestWriter;
pub use project_provider::ProjectProvider;
pub use release_hook::{HookError, ReleaseHook};
pub use script_runner::{ScriptJob, ScriptRunner};
