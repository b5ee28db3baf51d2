//! Object store clients.
//!
//! The service only needs put/get/delete by key plus the key <-> public URL mapping;
//! [`S3ObjectStore`] talks to any S3-compatible bucket and [`MemoryObjectStore`] keeps objects
//! in process for tests and local runs.

mod key;
mod memory;
mod s3_store;

pub use key::{ObjectKey, PublicUrlBase, name_from_remote_url};
pub use memory::MemoryObjectStore;
pub use s3_store::S3ObjectStore;

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use url::Url;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::StoreError;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Bytes and metadata of one stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Bytes,
    pub content_type: String,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    fn public_base(&self) -> &PublicUrlBase;

    /// Writes (or overwrites) `key` and returns its public URL.
    async fn put(
        &self,
        key: &ObjectKey,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<Url, StoreError>;

    async fn get(&self, key: &ObjectKey) -> Result<Option<StoredObject>, StoreError>;

    /// Removes `key`. A key that is already gone is not an error.
    async fn delete(&self, key: &ObjectKey) -> Result<(), StoreError>;

    fn url_for_key(&self, key: &ObjectKey) -> Url {
        self.public_base().url_for(key)
    }

    fn key_for_url(&self, url: &str) -> Result<ObjectKey, StoreError> {
        self.public_base().key_for(url)
    }
}

/// Builds the configured backend.
pub fn from_config(cfg: &StorageConfig) -> Result<Arc<dyn ObjectStore>, StoreError> {
    let base = cfg
        .resolved_public_base()
        .map_err(|e| StoreError::Config(format!("public base url: {e}")))?;
    let base = PublicUrlBase::new(base);

    Ok(match cfg.backend {
        StorageBackend::S3 => Arc::new(S3ObjectStore::from_config(cfg, base)?),
        StorageBackend::Memory => Arc::new(MemoryObjectStore::new(base)),
    })
}
