use crate::core::cache::KeyValueCollection;
use crate::core::{CachedRates, RateSource, SettingsStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Name of the collection the client-side rate cache is kept in.
pub const RATE_CACHE_COLLECTION: &str = "rate_cache";

const RATE_CACHE_KEY: &[u8] = b"rates";

/// Reads the exchange-rate record straight from the settings store.
pub struct SettingsRateSource {
    settings: Arc<dyn SettingsStore>,
}

impl SettingsRateSource {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl RateSource for SettingsRateSource {
    async fn load_rates(&self) -> Result<Option<CachedRates>> {
        let record = self
            .settings
            .exchange_rate()
            .await
            .context("Failed to read exchange rate setting")?;
        Ok(record.map(|record| CachedRates::from_record(&record, Utc::now())))
    }
}

/// Keeps the last loaded rate set in a collection for `ttl`, so repeated reads
/// within the window do not reach the inner source.
pub struct CachingRateSource<T: RateSource> {
    inner: T,
    cache: Arc<dyn KeyValueCollection>,
    ttl: Duration,
}

impl<T: RateSource> CachingRateSource<T> {
    pub fn new(inner: T, cache: Arc<dyn KeyValueCollection>, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }

    /// Drops the cached set; the next load goes to the inner source.
    pub async fn invalidate(&self) -> Result<()> {
        self.cache.remove(RATE_CACHE_KEY).await
    }
}

#[async_trait]
impl<T: RateSource> RateSource for CachingRateSource<T> {
    async fn load_rates(&self) -> Result<Option<CachedRates>> {
        match self.cache.get(RATE_CACHE_KEY).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<CachedRates>(&bytes) {
                Ok(rates) => {
                    debug!("Cache hit for exchange rates");
                    return Ok(Some(rates));
                }
                Err(e) => debug!("Discarding unreadable cached rates: {}", e),
            },
            Ok(None) => debug!("Cache miss for exchange rates"),
            Err(e) => debug!("Rate cache read failed: {:#}", e),
        }

        let rates = self.inner.load_rates().await?;
        if let Some(rates) = &rates {
            let bytes = serde_json::to_vec(rates)?;
            if let Err(e) = self.cache.put(RATE_CACHE_KEY, &bytes, Some(self.ttl)).await {
                debug!("Rate cache write failed: {:#}", e);
            }
        }
        Ok(rates)
    }
}
