use crate::core::cache::{CacheEntry, KeyValueCollection};
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionHandle, PersistMode};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// A collection stored in one fjall partition.
///
/// Writes are synced to the journal before `put` returns.
pub struct DiskCollection {
    keyspace: Arc<Keyspace>,
    partition: PartitionHandle,
}

impl DiskCollection {
    pub fn new(keyspace: Arc<Keyspace>, partition: PartitionHandle) -> Self {
        Self {
            keyspace,
            partition,
        }
    }
}

#[async_trait]
impl KeyValueCollection for DiskCollection {
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let Some(raw) = self.partition.get(key)? else {
            debug!("Cache MISS for key: {}", String::from_utf8_lossy(key));
            return Ok(None);
        };

        let entry: CacheEntry = serde_json::from_slice(&raw)
            .with_context(|| format!("Corrupt entry for key: {}", String::from_utf8_lossy(key)))?;
        if entry.is_expired() {
            debug!("Cache entry expired for key: {}", String::from_utf8_lossy(key));
            self.partition.remove(key)?;
            return Ok(None);
        }

        debug!("Cache HIT for key: {}", String::from_utf8_lossy(key));
        Ok(Some(entry.value))
    }

    async fn put(&self, key: &[u8], value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let entry = serde_json::to_vec(&CacheEntry::new(value, ttl))?;
        self.partition.insert(key, entry)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!("Cache PUT for key: {}", String::from_utf8_lossy(key));
        Ok(())
    }

    async fn remove(&self, key: &[u8]) -> Result<()> {
        self.partition.remove(key)?;
        debug!("Cache REMOVE for key: {}", String::from_utf8_lossy(key));
        Ok(())
    }
}
