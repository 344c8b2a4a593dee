//! One fetch-and-upsert invocation of the exchange rate.

use crate::core::{ExchangeRateRecord, QuoteProvider, RateError, SettingsStore};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

/// Result of a successful invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSummary {
    pub rate: f64,
    pub timestamp: DateTime<Utc>,
}

/// JSON body reported to whoever triggered the invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FetchReport {
    Success {
        success: bool,
        rate: f64,
        timestamp: String,
    },
    Failure {
        error: String,
        timestamp: String,
    },
}

impl FetchReport {
    pub fn from_result(result: &Result<FetchSummary, RateError>) -> Self {
        match result {
            Ok(summary) => FetchReport::Success {
                success: true,
                rate: summary.rate,
                timestamp: summary.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            },
            Err(e) => FetchReport::Failure {
                error: e.to_string(),
                timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchReport::Success { .. })
    }
}

/// Stateless: nothing is kept between calls to [`RateFetcher::run`].
#[derive(Clone)]
pub struct RateFetcher {
    quotes: Arc<dyn QuoteProvider>,
    settings: Arc<dyn SettingsStore>,
}

impl RateFetcher {
    pub fn new(quotes: Arc<dyn QuoteProvider>, settings: Arc<dyn SettingsStore>) -> Self {
        Self { quotes, settings }
    }

    /// Fetches the EUR/DZD midpoint, inverts it and upserts the record.
    ///
    /// Any failure aborts before the store is touched, except a failed write,
    /// which leaves the previous record in place. There is no retry here.
    pub async fn run(&self) -> Result<FetchSummary, RateError> {
        let result = self.fetch_and_store().await;
        match &result {
            Ok(summary) => info!(rate = summary.rate, "Exchange rate updated"),
            Err(e) => error!(error = %e, "Exchange rate update failed"),
        }
        result
    }

    async fn fetch_and_store(&self) -> Result<FetchSummary, RateError> {
        let midpoint = self.quotes.fetch_midpoint().await?;
        let timestamp = Utc::now();
        let record = ExchangeRateRecord::from_midpoint(midpoint, self.quotes.source(), timestamp)?;

        self.settings.upsert_exchange_rate(&record).await?;

        Ok(FetchSummary {
            rate: record.dzd_to_eur_rate,
            timestamp,
        })
    }
}
