use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use tokio::sync::RwLock;
use url::Url;

use super::{ObjectKey, ObjectStore, PublicUrlBase, StoredObject};
use crate::error::StoreError;

/// In-process object store. Nothing survives a restart.
#[derive(Debug)]
pub struct MemoryObjectStore {
    base: PublicUrlBase,
    objects: RwLock<HashMap<ObjectKey, StoredObject>>,
}

impl MemoryObjectStore {
    pub fn new(base: PublicUrlBase) -> Self {
        Self {
            base,
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn public_base(&self) -> &PublicUrlBase {
        &self.base
    }

    async fn put(
        &self,
        key: &ObjectKey,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<Url, StoreError> {
        let object = StoredObject {
            bytes,
            content_type: content_type.to_string(),
        };
        self.objects.write().await.insert(key.clone(), object);
        Ok(self.url_for_key(key))
    }

    async fn get(&self, key: &ObjectKey) -> Result<Option<StoredObject>, StoreError> {
        Ok(self.objects.read().await.get(key).cloned())
    }

    async fn delete(&self, key: &ObjectKey) -> Result<(), StoreError> {
        self.objects.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryObjectStore {
        MemoryObjectStore::new(PublicUrlBase::new(
            Url::parse("https://gallery.example.com/").unwrap(),
        ))
    }

    #[tokio::test]
    async fn put_overwrites_and_delete_tolerates_missing() {
        let store = store();
        let key = ObjectKey::new("uploads/a.png").unwrap();

        let url = store
            .put(&key, Bytes::from_static(b"one"), "image/png")
            .await
            .unwrap();
        assert_eq!(url.as_str(), "https://gallery.example.com/uploads/a.png");
        store
            .put(&key, Bytes::from_static(b"two"), "image/png")
            .await
            .unwrap();
        assert_eq!(store.len().await, 1);
        assert_eq!(
            store.get(&key).await.unwrap().unwrap().bytes,
            Bytes::from_static(b"two")
        );

        store.delete(&key).await.unwrap();
        store.delete(&key).await.unwrap();
        assert!(store.get(&key).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }
}
