use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to build the HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("request to '{url}' failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("registry responded with HTTP {status} for '{url}'")]
    Status { url: String, status: u16 },

    #[error("invalid dist-tags response from '{url}'")]
    InvalidResponse {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("registry lookup task failed")]
    Task(#[from] tokio::task::JoinError),
}

impl RegistryError {
    /// Whether the error means the package has never been published.
    ///
    /// Some registry proxies answer unknown packages under `/api/npm/` with a
    /// 500 instead of a 404; those are treated the same way.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Status { status: 404, .. } => true,
            Self::Status { url, status: 500 } => url.contains("/api/npm/"),
            _ => false,
        }
    }
}
