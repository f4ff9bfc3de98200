use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid version strategy '{0}' (expected one of: patch, minor, major)")]
    InvalidStrategy(String),

    #[error("invalid registry mode '{0}' (expected one of: npm, manifest)")]
    InvalidRegistryMode(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
