//! Exchange-rate record and the quote provider abstraction

use crate::core::error::RateError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Settings key of the singleton exchange-rate record.
pub const EXCHANGE_RATES_KEY: &str = "exchange_rates";

/// The persisted DZD to EUR conversion rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRateRecord {
    pub dzd_to_eur_rate: f64,
    pub last_updated: DateTime<Utc>,
    pub source: String,
}

impl ExchangeRateRecord {
    /// Builds a record from an EUR/DZD midpoint quote.
    ///
    /// The quote must be finite and strictly positive, and so must its inverse.
    pub fn from_midpoint(
        midpoint: f64,
        source: &str,
        last_updated: DateTime<Utc>,
    ) -> Result<Self, RateError> {
        if !midpoint.is_finite() || midpoint <= 0.0 {
            return Err(RateError::MalformedResponse(format!(
                "midpoint quote must be a positive number, got {midpoint}"
            )));
        }

        let dzd_to_eur_rate = 1.0 / midpoint;
        if !dzd_to_eur_rate.is_finite() || dzd_to_eur_rate <= 0.0 {
            return Err(RateError::MalformedResponse(format!(
                "midpoint quote {midpoint:e} has no finite inverse"
            )));
        }

        Ok(Self {
            dzd_to_eur_rate,
            last_updated,
            source: source.to_string(),
        })
    }
}

/// Supplies the current EUR/DZD midpoint.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Provenance tag written into the record.
    fn source(&self) -> &str;

    async fn fetch_midpoint(&self) -> Result<f64, RateError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_inverts_midpoint() {
        let now = Utc::now();
        for midpoint in [0.5, 1.0, 144.93, 250.0, 1e6] {
            let record = ExchangeRateRecord::from_midpoint(midpoint, "test", now).unwrap();
            assert!((record.dzd_to_eur_rate - 1.0 / midpoint).abs() < f64::EPSILON);
            assert!((record.dzd_to_eur_rate * midpoint - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_record_rejects_non_positive_midpoint() {
        let now = Utc::now();
        for midpoint in [0.0, -0.0, -144.93, f64::NAN, f64::INFINITY] {
            let result = ExchangeRateRecord::from_midpoint(midpoint, "test", now);
            assert!(
                matches!(result, Err(RateError::MalformedResponse(_))),
                "{midpoint} should be rejected"
            );
        }
    }

    #[test]
    fn test_record_rejects_quote_without_finite_inverse() {
        let now = Utc::now();
        for midpoint in [1e-310, f64::MIN_POSITIVE / 8.0] {
            let result = ExchangeRateRecord::from_midpoint(midpoint, "test", now);
            assert!(
                matches!(result, Err(RateError::MalformedResponse(_))),
                "{midpoint:e} should be rejected"
            );
        }

        let record = ExchangeRateRecord::from_midpoint(f64::MAX, "test", now).unwrap();
        assert!(record.dzd_to_eur_rate > 0.0);
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = ExchangeRateRecord {
            dzd_to_eur_rate: 0.0069,
            last_updated: "2024-05-01T10:00:00Z".parse().unwrap(),
            source: "tradermade".to_string(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["dzdToEurRate"], 0.0069);
        assert_eq!(json["lastUpdated"], "2024-05-01T10:00:00Z");
        assert_eq!(json["source"], "tradermade");

        let parsed: ExchangeRateRecord = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, record);
    }
}
