use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("invalid version file, expected '---' on the first line")]
    MissingOpeningDelimiter,

    #[error("invalid version file, missing closing '---'")]
    MissingClosingDelimiter,
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("input exceeds maximum size of {max_bytes} bytes")]
    InputTooLarge { max_bytes: usize },

    #[error("front matter must be a mapping of package names to strategies")]
    NotAMapping,
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("failed to parse YAML front matter")]
    Yaml(#[from] serde_yml::Error),

    #[error(transparent)]
    FrontMatter(#[from] FrontMatterError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
