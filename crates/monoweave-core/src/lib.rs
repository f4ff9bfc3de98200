pub mod error;
pub mod types;
mod workspace;

pub use error::*;
pub use types::*;
pub use workspace::{DependencyKind, WORKSPACE_PROTOCOL, Workspace, strip_workspace_protocol};
