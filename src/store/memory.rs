use crate::core::cache::{CacheEntry, KeyValueCollection};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory collection backed by a HashMap behind a tokio Mutex
#[derive(Clone, Default)]
pub struct MemoryCollection {
    inner: Arc<Mutex<HashMap<Vec<u8>, CacheEntry>>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueCollection for MemoryCollection {
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let mut entries = self.inner.lock().await;
        if let Some(entry) = entries.get(key) {
            if entry.is_expired() {
                debug!("Cache entry expired for key: {}", String::from_utf8_lossy(key));
                entries.remove(key);
                return Ok(None);
            }
            debug!("Cache HIT for key: {}", String::from_utf8_lossy(key));
            return Ok(Some(entry.value.clone()));
        }
        debug!("Cache MISS for key: {}", String::from_utf8_lossy(key));
        Ok(None)
    }

    async fn put(&self, key: &[u8], value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut entries = self.inner.lock().await;
        debug!("Cache PUT for key: {}", String::from_utf8_lossy(key));
        entries.insert(key.to_vec(), CacheEntry::new(value, ttl));
        Ok(())
    }

    async fn remove(&self, key: &[u8]) -> Result<()> {
        let mut entries = self.inner.lock().await;
        entries.remove(key);
        debug!("Cache REMOVE for key: {}", String::from_utf8_lossy(key));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_collection_get_put() {
        let collection = MemoryCollection::new();

        assert!(collection.get(b"key1").await.unwrap().is_none());

        collection.put(b"key1", b"123", None).await.unwrap();
        assert_eq!(collection.get(b"key1").await.unwrap(), Some(b"123".to_vec()));

        assert!(collection.get(b"key2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_replaces_existing_value() {
        let collection = MemoryCollection::new();

        collection.put(b"key1", b"first", None).await.unwrap();
        collection.put(b"key1", b"second", None).await.unwrap();

        assert_eq!(
            collection.get(b"key1").await.unwrap(),
            Some(b"second".to_vec())
        );
    }

    #[tokio::test]
    async fn test_collection_ttl_expiration() {
        let collection = MemoryCollection::new();

        collection
            .put(b"key1", b"123", Some(Duration::from_millis(10)))
            .await
            .unwrap();
        assert_eq!(collection.get(b"key1").await.unwrap(), Some(b"123".to_vec()));

        sleep(Duration::from_millis(20)).await;
        assert!(collection.get(b"key1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_collection_remove() {
        let collection = MemoryCollection::new();

        collection.put(b"key1", b"123", None).await.unwrap();
        collection.remove(b"key1").await.unwrap();
        assert!(collection.get(b"key1").await.unwrap().is_none());
    }
}
