//! Key-value storage abstractions shared by the settings store and the
//! client-side rate cache.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// A named collection of byte keys and values.
///
/// `put` is a single-key conflict-resolving write: an existing value under the
/// same key is replaced as a whole, never merged.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;
    async fn put(&self, key: &[u8], value: &[u8], ttl: Option<Duration>) -> Result<()>;
    async fn remove(&self, key: &[u8]) -> Result<()>;
}

/// Hands out collections by name.
pub trait Store: Send + Sync {
    fn get_collection(&self, name: &str, persist: bool) -> Result<Arc<dyn KeyValueCollection>>;
}

/// Envelope written by collections that support expiry.
#[derive(Serialize, Deserialize)]
pub(crate) struct CacheEntry {
    pub value: Vec<u8>,
    pub expires_at: Option<SystemTime>,
}

impl CacheEntry {
    pub fn new(value: &[u8], ttl: Option<Duration>) -> Self {
        Self {
            value: value.to_vec(),
            expires_at: ttl.map(|d| SystemTime::now() + d),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|expires_at| SystemTime::now() > expires_at)
    }
}
