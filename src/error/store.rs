use thiserror::Error as ThisError;

/// Failure talking to the object store.
#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("S3 error: {0}")]
    S3(#[from] s3::error::S3Error),

    #[error("object store answered {status} to {op} {key}")]
    Status {
        op: &'static str,
        key: String,
        status: u16,
    },

    #[error("url {0} does not belong to this object store")]
    ForeignUrl(String),

    #[error("invalid object key: {0}")]
    InvalidKey(String),

    #[error("object store misconfigured: {0}")]
    Config(String),
}
