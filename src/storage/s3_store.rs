use async_trait::async_trait;
use bytes::Bytes;
use s3::{Bucket, Region, creds::Credentials};
use tracing::debug;
use url::Url;

use super::{DEFAULT_CONTENT_TYPE, ObjectKey, ObjectStore, PublicUrlBase, StoredObject};
use crate::config::StorageConfig;
use crate::error::StoreError;

/// S3 (or S3-compatible) bucket client.
pub struct S3ObjectStore {
    bucket: Box<Bucket>,
    base: PublicUrlBase,
}

fn get_bucket(cfg: &StorageConfig) -> Result<Box<Bucket>, StoreError> {
    let region = match &cfg.endpoint {
        Some(endpoint) => Region::Custom {
            region: cfg.region.clone(),
            endpoint: endpoint.as_str().trim_end_matches('/').to_string(),
        },
        None => cfg
            .region
            .parse::<Region>()
            .map_err(|e| StoreError::Config(format!("invalid region {:?}: {e}", cfg.region)))?,
    };

    let credentials = if cfg.access_key.is_empty() {
        Credentials::default()
    } else {
        Credentials::new(
            Some(cfg.access_key.as_str()),
            Some(cfg.secret_key.as_str()),
            None,
            None,
            None,
        )
    }
    .map_err(|e| StoreError::Config(format!("failed to load credentials: {e}")))?;

    let bucket = Bucket::new(&cfg.bucket, region, credentials)?;
    Ok(if cfg.path_style {
        bucket.with_path_style()
    } else {
        bucket
    })
}

fn ensure_success(op: &'static str, key: &ObjectKey, status: u16) -> Result<(), StoreError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(StoreError::Status {
            op,
            key: key.to_string(),
            status,
        })
    }
}

impl S3ObjectStore {
    pub fn from_config(cfg: &StorageConfig, base: PublicUrlBase) -> Result<Self, StoreError> {
        let bucket = get_bucket(cfg)?;
        Ok(Self { bucket, base })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn public_base(&self) -> &PublicUrlBase {
        &self.base
    }

    #[tracing::instrument(skip(self, key, bytes), fields(key = %key, len = bytes.len()))]
    async fn put(
        &self,
        key: &ObjectKey,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<Url, StoreError> {
        let response = self
            .bucket
            .put_object_with_content_type(key.as_str(), &bytes, content_type)
            .await?;
        ensure_success("put", key, response.status_code())?;
        debug!("object written");
        Ok(self.url_for_key(key))
    }

    async fn get(&self, key: &ObjectKey) -> Result<Option<StoredObject>, StoreError> {
        let response = self.bucket.get_object(key.as_str()).await?;
        if response.status_code() == 404 {
            return Ok(None);
        }
        ensure_success("get", key, response.status_code())?;

        let content_type = response
            .headers()
            .get("content-type")
            .cloned()
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
        Ok(Some(StoredObject {
            bytes: response.bytes().clone(),
            content_type,
        }))
    }

    #[tracing::instrument(skip(self, key), fields(key = %key))]
    async fn delete(&self, key: &ObjectKey) -> Result<(), StoreError> {
        let response = self.bucket.delete_object(key.as_str()).await?;
        let status = response.status_code();
        if status == 404 {
            debug!("object already gone");
            return Ok(());
        }
        ensure_success("delete", key, status)?;
        debug!("object deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_2xx_is_success() {
        let key = ObjectKey::new("uploads/a.png").unwrap();
        assert!(ensure_success("put", &key, 200).is_ok());
        assert!(ensure_success("delete", &key, 204).is_ok());
        assert!(matches!(
            ensure_success("put", &key, 403),
            Err(StoreError::Status { status: 403, .. })
        ));
    }

    #[test]
    fn builds_bucket_from_static_credentials() {
        let cfg = StorageConfig {
            bucket: "gallery".to_string(),
            endpoint: Some(Url::parse("http://127.0.0.1:9000").unwrap()),
            path_style: true,
            access_key: "minio".to_string(),
            secret_key: "minio-secret".to_string(),
            ..Default::default()
        };
        let base = PublicUrlBase::new(cfg.resolved_public_base().unwrap());
        let store = S3ObjectStore::from_config(&cfg, base).unwrap();
        assert_eq!(store.bucket.name(), "gallery");
        assert_eq!(
            store.public_base().as_url().as_str(),
            "http://127.0.0.1:9000/gallery/"
        );
    }
}
