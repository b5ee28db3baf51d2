use serde::{Deserialize, Serialize};

use super::ImageRecord;

/// `POST /upload` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UploadResponse {
    pub id: i64,
    pub url: String,
    pub description: String,
    pub message: String,
}

impl UploadResponse {
    pub fn from_record(record: ImageRecord) -> Self {
        Self {
            id: record.id,
            url: record.url,
            description: record.description,
            message: "Image uploaded successfully".to_string(),
        }
    }
}

/// One successfully ingested manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BatchUploadedItem {
    pub id: i64,
    /// Public URL in our bucket.
    pub url: String,
    /// URL as it appeared in the manifest.
    pub original: String,
}

/// `POST /json-upload` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BatchUploadResponse {
    pub message: String,
    pub uploaded: Vec<BatchUploadedItem>,
    /// Number of manifest entries that were skipped.
    #[serde(default)]
    pub failed: usize,
}

impl BatchUploadResponse {
    pub fn new(uploaded: Vec<BatchUploadedItem>, failed: usize) -> Self {
        Self {
            message: format!("{} image(s) uploaded successfully", uploaded.len()),
            uploaded,
            failed,
        }
    }
}

/// `GET /` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageListResponse {
    pub images: Vec<ImageRecord>,
    pub current_page: i64,
    pub total_pages: i64,
}

/// `PUT /update/{id}` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UpdateResponse {
    pub message: String,
    pub url: String,
    pub description: String,
}

impl UpdateResponse {
    pub fn from_record(record: ImageRecord) -> Self {
        Self {
            message: "Updated successfully".to_string(),
            url: record.url,
            description: record.description,
        }
    }
}

/// Bare `{ "message": ... }` acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
