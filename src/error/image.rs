use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use imgshelf_schema::ApiErrorBody;
use thiserror::Error as ThisError;
use tracing::{error, warn};

use super::{FetchError, StoreError};

/// Every failure an image operation can surface to the HTTP layer.
#[derive(Debug, ThisError)]
pub enum ImageError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("image {0} not found")]
    NotFound(i64),

    #[error("image {0} was changed by another request")]
    Conflict(i64),

    #[error("remote fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("object store failure: {0}")]
    Store(#[from] StoreError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("request deadline exceeded")]
    Timeout,

    #[error("request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ImageError {
    pub fn status(&self) -> StatusCode {
        match self {
            ImageError::InvalidInput(_) | ImageError::InvalidManifest(_) => {
                StatusCode::BAD_REQUEST
            }
            ImageError::NotFound(_) => StatusCode::NOT_FOUND,
            ImageError::Conflict(_) => StatusCode::CONFLICT,
            ImageError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ImageError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ImageError::Fetch(_)
            | ImageError::Store(_)
            | ImageError::Database(_)
            | ImageError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ImageError::InvalidInput(_) => "INVALID_INPUT",
            ImageError::InvalidManifest(_) => "INVALID_MANIFEST",
            ImageError::NotFound(_) => "NOT_FOUND",
            ImageError::Conflict(_) => "CONFLICT",
            ImageError::Fetch(_) => "FETCH_ERROR",
            ImageError::Store(_) => "STORE_ERROR",
            ImageError::Database(_) => "DATABASE_ERROR",
            ImageError::Timeout => "TIMEOUT",
            ImageError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ImageError::Task(_) => "INTERNAL_ERROR",
        }
    }

    /// Client-facing message. Internal failures never echo their source.
    fn public_message(&self) -> String {
        match self {
            ImageError::InvalidInput(msg) | ImageError::InvalidManifest(msg) => msg.clone(),
            ImageError::NotFound(_) => "Image not found".to_string(),
            ImageError::Conflict(_) => {
                "Image was modified by another request; retry the update".to_string()
            }
            ImageError::Fetch(_) => "Failed to fetch remote image".to_string(),
            ImageError::Store(_) => "Object storage error".to_string(),
            ImageError::Database(_) => "Database error".to_string(),
            ImageError::Timeout => "Request timed out".to_string(),
            ImageError::PayloadTooLarge(_) => "Request body too large".to_string(),
            ImageError::Task(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ImageError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(code = self.code(), error = %self, "image request failed");
        } else {
            warn!(code = self.code(), error = %self, "image request rejected");
        }

        let body = ApiErrorBody::new(self.public_message(), self.code());
        (status, Json(body)).into_response()
    }
}

impl From<MultipartRejection> for ImageError {
    fn from(rejection: MultipartRejection) -> Self {
        ImageError::InvalidInput(format!("expected a multipart/form-data body: {rejection}"))
    }
}

impl From<MultipartError> for ImageError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ImageError::PayloadTooLarge(err.body_text())
        } else {
            ImageError::InvalidInput(format!("malformed multipart body: {}", err.body_text()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_taxonomy_to_status() {
        assert_eq!(
            ImageError::InvalidInput("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ImageError::InvalidManifest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ImageError::NotFound(4).status(), StatusCode::NOT_FOUND);
        assert_eq!(ImageError::Conflict(4).status(), StatusCode::CONFLICT);
        assert_eq!(ImageError::Conflict(4).code(), "CONFLICT");
        assert_eq!(ImageError::Timeout.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            ImageError::Store(StoreError::ForeignUrl("u".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ImageError::Fetch(FetchError::UnsupportedScheme("ftp".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_detail_stays_out_of_the_message() {
        let err = ImageError::Store(StoreError::Config("secret endpoint".into()));
        assert_eq!(err.public_message(), "Object storage error");
        assert_eq!(err.code(), "STORE_ERROR");
    }
}
