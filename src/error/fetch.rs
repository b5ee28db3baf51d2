use reqwest::StatusCode;
use thiserror::Error as ThisError;

/// Failure while downloading a remote image.
#[derive(Debug, ThisError)]
pub enum FetchError {
    #[error("invalid url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),

    /// Transport-level failure (DNS, connect, timeouts, etc).
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("remote returned status {status} for {url}")]
    Status { status: StatusCode, url: String },

    #[error("remote payload exceeds {limit} bytes")]
    TooLarge { limit: usize },
}
