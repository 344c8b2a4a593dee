//! Settings store abstraction

use crate::core::error::RateError;
use crate::core::rate::ExchangeRateRecord;
use async_trait::async_trait;

/// Name of the collection holding platform settings.
pub const SETTINGS_COLLECTION: &str = "settings";

/// Shared key-value table of named platform settings.
///
/// The exchange-rate record is written only by the fetcher; everything else
/// reads it.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Reads the exchange-rate record, if one was ever written.
    async fn exchange_rate(&self) -> Result<Option<ExchangeRateRecord>, RateError>;

    /// Inserts or replaces the exchange-rate record.
    async fn upsert_exchange_rate(&self, record: &ExchangeRateRecord) -> Result<(), RateError>;
}
