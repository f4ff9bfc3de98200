use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChangelogError {
    #[error("failed to read changelog at '{path}'")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write changelog at '{path}'")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("changelog at '{path}' is missing the marker '{marker}'")]
    MissingMarker { path: PathBuf, marker: &'static str },

    #[error("unrecognised repository reference '{value}'")]
    InvalidRepository { value: String },
}
