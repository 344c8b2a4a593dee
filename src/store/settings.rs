use crate::core::cache::KeyValueCollection;
use crate::core::error::RateError;
use crate::core::rate::{EXCHANGE_RATES_KEY, ExchangeRateRecord};
use crate::core::settings::SettingsStore;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Settings kept in a key-value collection, one JSON value per key.
pub struct KvSettingsStore {
    collection: Arc<dyn KeyValueCollection>,
}

impl KvSettingsStore {
    pub fn new(collection: Arc<dyn KeyValueCollection>) -> Self {
        Self { collection }
    }
}

#[async_trait]
impl SettingsStore for KvSettingsStore {
    async fn exchange_rate(&self) -> Result<Option<ExchangeRateRecord>, RateError> {
        let raw = self
            .collection
            .get(EXCHANGE_RATES_KEY.as_bytes())
            .await
            .map_err(|e| RateError::PersistenceError(format!("{e:#}")))?;

        raw.map(|bytes| {
            serde_json::from_slice(&bytes).map_err(|e| {
                RateError::PersistenceError(format!("Corrupt {EXCHANGE_RATES_KEY} setting: {e}"))
            })
        })
        .transpose()
    }

    async fn upsert_exchange_rate(&self, record: &ExchangeRateRecord) -> Result<(), RateError> {
        let value =
            serde_json::to_vec(record).map_err(|e| RateError::PersistenceError(e.to_string()))?;
        self.collection
            .put(EXCHANGE_RATES_KEY.as_bytes(), &value, None)
            .await
            .map_err(|e| RateError::PersistenceError(format!("{e:#}")))?;
        debug!(rate = record.dzd_to_eur_rate, "Upserted {}", EXCHANGE_RATES_KEY);
        Ok(())
    }
}
