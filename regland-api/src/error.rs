use thiserror::Error;

/// Errors from a single API call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid response payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// The typed gene symbol matched nothing exactly; carries up to three
    /// suggested alternatives for the inline message.
    #[error("gene '{query}' not found")]
    GeneNotFound {
        query: String,
        suggestions: Vec<String>,
    },
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Errors from a whole per-gene load.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Every per-species region fetch failed. Partial failures are not an
    /// error; the affected tracks just render without data.
    #[error("no region data available for any species")]
    AllSpeciesFailed,

    #[error(transparent)]
    Api(#[from] ApiError),
}
