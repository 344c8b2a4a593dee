//! Client-side rate table and the source it is loaded from

use crate::core::rate::ExchangeRateRecord;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Every cached multiplier is relative to this currency.
pub const BASE_CURRENCY: &str = "DZD";

/// Currency the fetched record converts into.
pub const QUOTE_CURRENCY: &str = "EUR";

/// A set of multipliers relative to [`BASE_CURRENCY`]: `rates[C]` is the
/// amount of `C` worth one dinar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedRates {
    pub rates: HashMap<String, f64>,
    pub fetched_at: DateTime<Utc>,
}

impl CachedRates {
    pub fn new(rates: HashMap<String, f64>, fetched_at: DateTime<Utc>) -> Self {
        let mut rates: HashMap<String, f64> = rates
            .into_iter()
            .map(|(code, rate)| (code.to_uppercase(), rate))
            .collect();
        rates.insert(BASE_CURRENCY.to_string(), 1.0);
        Self { rates, fetched_at }
    }

    pub fn from_record(record: &ExchangeRateRecord, fetched_at: DateTime<Utc>) -> Self {
        Self::new(
            HashMap::from([(QUOTE_CURRENCY.to_string(), record.dzd_to_eur_rate)]),
            fetched_at,
        )
    }

    /// Usable multiplier for `code`; zero, negative and non-finite entries are
    /// treated as missing.
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates
            .get(&code.to_uppercase())
            .copied()
            .filter(|rate| rate.is_finite() && *rate > 0.0)
    }
}

/// Loads the current rate set. Implementations may hit the settings store or a
/// cache in front of it.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// `None` when no exchange rate has been published yet.
    async fn load_rates(&self) -> Result<Option<CachedRates>>;
}
