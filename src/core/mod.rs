//! Core business logic abstractions

pub mod cache;
pub mod config;
pub mod currency;
pub mod error;
pub mod log;
pub mod rate;
pub mod settings;

// Re-export main types for cleaner imports
pub use currency::{BASE_CURRENCY, CachedRates, RateSource};
pub use error::RateError;
pub use rate::{EXCHANGE_RATES_KEY, ExchangeRateRecord, QuoteProvider};
pub use settings::SettingsStore;
