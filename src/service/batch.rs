//! Manifest ingestion: one remote upload per array element, failures isolated per entry.

use futures::{StreamExt, stream};
use imgshelf_schema::{BatchUploadResponse, BatchUploadedItem, ImageRecord};
use serde_json::Value;
use tracing::{info, warn};

use super::images::ImageService;
use super::source::UploadSource;
use crate::error::ImageError;

/// A manifest entry that produced a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchUploaded {
    pub record: ImageRecord,
    pub original: String,
}

/// A manifest entry that did not. `original` is the element as it appeared in the manifest.
#[derive(Debug)]
pub struct BatchFailed {
    pub original: String,
    pub error: ImageError,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// One result per manifest element, in manifest order.
    pub entries: Vec<Result<BatchUploaded, BatchFailed>>,
}

impl BatchOutcome {
    pub fn succeeded(&self) -> impl Iterator<Item = &BatchUploaded> {
        self.entries.iter().filter_map(|e| e.as_ref().ok())
    }

    pub fn failed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_err()).count()
    }

    pub fn into_response(self) -> BatchUploadResponse {
        let failed = self.failed_count();
        let uploaded = self
            .entries
            .into_iter()
            .filter_map(Result::ok)
            .map(|ok| BatchUploadedItem {
                id: ok.record.id,
                url: ok.record.url,
                original: ok.original,
            })
            .collect();
        BatchUploadResponse::new(uploaded, failed)
    }
}

/// Parses manifest bytes; only a top-level JSON array is accepted.
pub fn parse_manifest(bytes: &[u8]) -> Result<Vec<Value>, ImageError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| ImageError::InvalidManifest(format!("manifest is not valid JSON: {e}")))?;
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(ImageError::InvalidManifest(
            "manifest must be a JSON array of image URLs".to_string(),
        )),
    }
}

impl ImageService {
    /// Uploads every URL in the manifest. Only an unreadable manifest fails the call.
    pub async fn batch_upload(&self, manifest: &[u8]) -> Result<BatchOutcome, ImageError> {
        let items = parse_manifest(manifest)?;
        let total = items.len();

        let entries: Vec<_> = stream::iter(items.into_iter().enumerate())
            .map(|(index, item)| self.ingest_entry(index, item))
            .buffered(self.batch_concurrency)
            .collect()
            .await;

        let outcome = BatchOutcome { entries };
        info!(
            total,
            uploaded = total - outcome.failed_count(),
            failed = outcome.failed_count(),
            "manifest processed"
        );
        Ok(outcome)
    }

    async fn ingest_entry(
        &self,
        index: usize,
        item: Value,
    ) -> Result<BatchUploaded, BatchFailed> {
        let original = match item {
            Value::String(url) => url,
            other => {
                let original = other.to_string();
                warn!(index, entry = %original, "manifest entry is not a string");
                return Err(BatchFailed {
                    error: ImageError::InvalidInput(format!(
                        "manifest entry {index} is not a string"
                    )),
                    original,
                });
            }
        };

        match self
            .upload(
                UploadSource::RemoteUrl(original.clone()),
                &self.batch_description,
            )
            .await
        {
            Ok(record) => Ok(BatchUploaded { record, original }),
            Err(error) => {
                warn!(index, url = %original, error = %error, "manifest entry failed");
                Err(BatchFailed { original, error })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_must_be_an_array() {
        assert_eq!(parse_manifest(br#"["a", 1]"#).unwrap().len(), 2);
        assert!(parse_manifest(b"[]").unwrap().is_empty());
        assert!(matches!(
            parse_manifest(br#"{"urls": []}"#),
            Err(ImageError::InvalidManifest(_))
        ));
        assert!(matches!(
            parse_manifest(b"not json"),
            Err(ImageError::InvalidManifest(_))
        ));
    }

    #[test]
    fn outcome_counts_and_keeps_order() {
        let record = |id| ImageRecord {
            id,
            url: format!("https://b/uploads/{id}.png"),
            description: String::new(),
        };
        let outcome = BatchOutcome {
            entries: vec![
                Ok(BatchUploaded {
                    record: record(1),
                    original: "https://x/1.png".to_string(),
                }),
                Err(BatchFailed {
                    original: "bad".to_string(),
                    error: ImageError::InvalidInput("bad".to_string()),
                }),
                Ok(BatchUploaded {
                    record: record(2),
                    original: "https://x/2.png".to_string(),
                }),
            ],
        };
        assert_eq!(outcome.failed_count(), 1);
        let ids: Vec<_> = outcome.succeeded().map(|u| u.record.id).collect();
        assert_eq!(ids, [1, 2]);

        let body = outcome.into_response();
        assert_eq!(body.failed, 1);
        assert_eq!(body.uploaded.len(), 2);
        assert_eq!(body.uploaded[1].original, "https://x/2.png");
    }
}
