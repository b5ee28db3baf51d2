//! Upload, update and delete sequencing between the object store and the metadata table.
//!
//! There is no transaction spanning both resources. Every path writes before it deletes, so a
//! failure part-way leaves an unreferenced object behind rather than a row pointing at nothing.
//! Those leftovers are logged as "orphaned object" with their key for manual cleanup.

use bytes::Bytes;
use imgshelf_schema::ImageRecord;
use std::sync::Arc;
use tracing::{error, info, warn};
use url::Url;

use super::page::{ImagePage, PageRequest};
use super::source::UploadSource;
use crate::db::{DbImage, MetadataStore};
use crate::error::ImageError;
use crate::fetch::{RemoteFetcher, parse_remote_url};
use crate::storage::{DEFAULT_CONTENT_TYPE, ObjectKey, ObjectStore, name_from_remote_url};

/// Coordinates the object store, the remote fetcher and the metadata table.
pub struct ImageService {
    store: Arc<dyn ObjectStore>,
    fetcher: Arc<dyn RemoteFetcher>,
    db: MetadataStore,
    pub(super) batch_concurrency: usize,
    pub(super) batch_description: String,
}

impl ImageService {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        fetcher: Arc<dyn RemoteFetcher>,
        db: MetadataStore,
    ) -> Self {
        let defaults = crate::config::BatchConfig::default();
        Self {
            store,
            fetcher,
            db,
            batch_concurrency: defaults.concurrency,
            batch_description: defaults.description,
        }
    }

    /// Overrides manifest ingestion settings.
    #[must_use]
    pub fn with_batch(mut self, concurrency: usize, description: impl Into<String>) -> Self {
        self.batch_concurrency = concurrency.max(1);
        self.batch_description = description.into();
        self
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    pub fn metadata(&self) -> &MetadataStore {
        &self.db
    }

    /// Stores the source's bytes under a fresh key and inserts the metadata row.
    pub async fn upload(
        &self,
        source: UploadSource,
        description: &str,
    ) -> Result<ImageRecord, ImageError> {
        let (key, url) = self.write_object(source).await?;

        match self.db.insert(url.as_str(), description).await {
            Ok(id) => {
                info!(id, key = %key, "image uploaded");
                Ok(ImageRecord {
                    id,
                    url: url.into(),
                    description: description.to_string(),
                })
            }
            Err(err) => {
                self.discard_object(&key, "row insert failed").await;
                Err(err)
            }
        }
    }

    pub async fn list(&self, req: PageRequest) -> Result<ImagePage, ImageError> {
        let rows = self.db.select_page(req.limit, req.offset()).await?;
        let total = self.db.count_all().await?;

        Ok(ImagePage {
            items: rows.into_iter().map(ImageRecord::from).collect(),
            current_page: req.page,
            total_pages: req.total_pages(total),
        })
    }

    pub async fn get(&self, id: i64) -> Result<ImageRecord, ImageError> {
        self.require(id).await.map(ImageRecord::from)
    }

    /// Replaces the description and, when a source is given, the stored object.
    ///
    /// A missing description keeps the current one. The replacement object is written and the
    /// row repointed before the previous object is removed. The row is only repointed if it still
    /// references the url read at the start; otherwise the new object is discarded and
    /// [`ImageError::Conflict`] returned.
    pub async fn update(
        &self,
        id: i64,
        source: Option<UploadSource>,
        description: Option<String>,
    ) -> Result<ImageRecord, ImageError> {
        let current = self.require(id).await?;
        let description = description.unwrap_or_else(|| current.description.clone());

        let Some(source) = source else {
            self.db.update_description(id, &description).await?;
            info!(id, "image description updated");
            return Ok(ImageRecord {
                id,
                url: current.url,
                description,
            });
        };

        let old_key = self.owned_key(&current);
        let (new_key, new_url) = self.write_object(source).await?;

        match self
            .db
            .update_if_url(id, &current.url, new_url.as_str(), &description)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                // Another request repointed or removed the row after we read it.
                self.discard_object(&new_key, "record changed concurrently")
                    .await;
                return Err(match self.db.select_by_id(id).await? {
                    Some(_) => ImageError::Conflict(id),
                    None => ImageError::NotFound(id),
                });
            }
            Err(err) => {
                self.discard_object(&new_key, "row update failed").await;
                return Err(err);
            }
        }

        if let Some(old_key) = old_key.filter(|k| *k != new_key) {
            if let Err(err) = self.store.delete(&old_key).await {
                error!(
                    id,
                    key = %old_key,
                    error = %err,
                    "orphaned object: previous image could not be deleted after update"
                );
            }
        }

        info!(id, key = %new_key, "image replaced");
        Ok(ImageRecord {
            id,
            url: new_url.into(),
            description,
        })
    }

    /// Removes the stored object, then the row. The row stays if the object delete fails.
    pub async fn delete(&self, id: i64) -> Result<(), ImageError> {
        let current = self.require(id).await?;

        if let Some(key) = self.owned_key(&current) {
            self.store.delete(&key).await?;
        }

        match self.db.delete_by_id(id).await {
            Ok(()) => {
                info!(id, "image deleted");
                Ok(())
            }
            Err(ImageError::NotFound(id)) => Err(ImageError::NotFound(id)),
            Err(err) => {
                error!(
                    id,
                    url = %current.url,
                    error = %err,
                    "dangling reference: object deleted but row delete failed"
                );
                Err(err)
            }
        }
    }

    async fn require(&self, id: i64) -> Result<DbImage, ImageError> {
        self.db
            .select_by_id(id)
            .await?
            .ok_or(ImageError::NotFound(id))
    }

    /// Key of the record's object, or `None` when its URL is outside this store.
    fn owned_key(&self, record: &DbImage) -> Option<ObjectKey> {
        match self.store.key_for_url(&record.url) {
            Ok(key) => Some(key),
            Err(err) => {
                warn!(
                    id = record.id,
                    url = %record.url,
                    error = %err,
                    "record url is not addressable in this store; nothing to delete"
                );
                None
            }
        }
    }

    async fn write_object(
        &self,
        source: UploadSource,
    ) -> Result<(ObjectKey, Url), ImageError> {
        let (key, bytes, content_type) = self.materialize(source).await?;
        let url = self.store.put(&key, bytes, &content_type).await?;
        Ok((key, url))
    }

    async fn materialize(
        &self,
        source: UploadSource,
    ) -> Result<(ObjectKey, Bytes, String), ImageError> {
        match source {
            UploadSource::File {
                bytes,
                filename,
                content_type,
            } => {
                let content_type =
                    content_type.unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
                Ok((ObjectKey::generate(&filename), bytes, content_type))
            }
            UploadSource::RemoteUrl(raw) => {
                let url = parse_remote_url(&raw)?;
                let fetched = self.fetcher.fetch(&url).await?;
                let key = ObjectKey::generate(&name_from_remote_url(&url));
                Ok((key, fetched.bytes, fetched.content_type))
            }
        }
    }

    /// Best-effort removal of an object whose row never materialized.
    async fn discard_object(&self, key: &ObjectKey, reason: &str) {
        match self.store.delete(key).await {
            Ok(()) => warn!(key = %key, reason, "rolled back freshly written object"),
            Err(err) => error!(
                key = %key,
                reason,
                error = %err,
                "orphaned object: rollback delete failed"
            ),
        }
    }
}
