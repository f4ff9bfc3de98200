use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to determine the current directory")]
    CurrentDir(#[source] std::io::Error),

    #[error("failed to load the project configuration")]
    Project(#[from] monoweave_project::ProjectError),

    #[error(transparent)]
    Operation(#[from] monoweave_operations::OperationError),

    #[error("failed to create the registry client")]
    Registry(#[from] monoweave_registry::RegistryError),

    #[error("invalid log level '{filter}'")]
    LogFilter {
        filter: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("failed to install the log subscriber")]
    Logging(#[from] tracing_subscriber::util::TryInitError),

    #[error("failed to start the async runtime")]
    Runtime(#[source] std::io::Error),

    #[error("invalid strategy '{0}', expected <package>=<patch|minor|major>")]
    StrategyAssignment(String),

    #[error("'{0}' is not a publishable package of this project")]
    UnknownPackage(String),

    #[error("no packages selected")]
    NothingSelected,

    #[error("operation cancelled by user")]
    Cancelled,

    #[error("interactive mode requires a terminal; pass --strategy instead")]
    NotATty,

    #[error("prompt failed")]
    Prompt(#[from] dialoguer::Error),

    #[error("IO error")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
