//! Client-side owner of the cached rates and the price formatter.

use crate::core::{BASE_CURRENCY, CachedRates, RateSource};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

/// Display suffix of the base currency.
pub const BASE_CURRENCY_SYMBOL: &str = "DA";

/// Cached rates plus the user's display currency.
///
/// Starts empty. Rates only change through [`RateContext::refresh`] (or
/// [`RateContext::populate`]); reads and formatting never do I/O.
pub struct RateContext {
    rates: watch::Sender<Option<CachedRates>>,
    display_currency: String,
    staleness: Duration,
}

impl RateContext {
    pub fn new(display_currency: &str, staleness: Duration) -> Self {
        let (rates, _) = watch::channel(None);
        Self {
            rates,
            display_currency: display_currency.to_uppercase(),
            staleness,
        }
    }

    /// Fetch time of the cached set, if there is one.
    pub fn cached_timestamp(&self) -> Option<DateTime<Utc>> {
        self.rates.borrow().as_ref().map(|rates| rates.fetched_at)
    }

    /// Snapshot of the current mapping.
    pub fn exchange_rates(&self) -> Option<CachedRates> {
        self.rates.borrow().clone()
    }

    /// Receives every newly published rate set.
    pub fn subscribe(&self) -> watch::Receiver<Option<CachedRates>> {
        self.rates.subscribe()
    }

    pub fn display_currency(&self) -> &str {
        &self.display_currency
    }

    pub fn set_currency(&mut self, code: &str) {
        self.display_currency = code.trim().to_uppercase();
    }

    /// Publishes `rates` as the current set.
    pub fn populate(&self, rates: CachedRates) {
        self.rates.send_replace(Some(rates));
    }

    /// Loads a fresh set from `source`. A source with nothing published yet
    /// leaves the current set untouched.
    pub async fn refresh(&self, source: &dyn RateSource) -> Result<bool> {
        match source.load_rates().await? {
            Some(rates) => {
                debug!(fetched_at = %rates.fetched_at, "Publishing exchange rates");
                self.populate(rates);
                Ok(true)
            }
            None => {
                debug!("No exchange rates published yet");
                Ok(false)
            }
        }
    }

    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        match self.cached_timestamp() {
            None => true,
            Some(fetched_at) => (now - fetched_at)
                .to_std()
                .is_ok_and(|age| age > self.staleness),
        }
    }

    /// Refreshes when nothing is cached or the cached set is older than the
    /// staleness window.
    pub async fn refresh_if_stale(&self, source: &dyn RateSource) -> Result<bool> {
        if !self.is_stale(Utc::now()) {
            return Ok(false);
        }
        self.refresh(source).await
    }

    /// Converts between two cached currencies; `None` when either is missing.
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> Option<f64> {
        let from = from.trim().to_uppercase();
        let to = to.trim().to_uppercase();
        if from == to {
            return Some(amount);
        }

        let guard = self.rates.borrow();
        let rates = guard.as_ref()?;
        Some(amount / rates.rate(&from)? * rates.rate(&to)?)
    }

    /// `amount` in `currency`, shown in the display currency when the cache
    /// allows the conversion and in `currency` otherwise. Never fails.
    pub fn format_price(&self, amount: f64, currency: &str) -> String {
        let currency = currency.trim().to_uppercase();
        if !amount.is_finite() || amount < 0.0 {
            return format_amount(amount, &currency);
        }

        match self.convert(amount, &currency, &self.display_currency) {
            Some(converted) => format_amount(converted, &self.display_currency),
            None => format_amount(amount, &currency),
        }
    }

    /// "1 C = X DA" for a cached non-base currency.
    pub fn rate_label(&self, code: &str) -> Option<String> {
        let code = code.trim().to_uppercase();
        if code == BASE_CURRENCY {
            return None;
        }

        let guard = self.rates.borrow();
        let rate = guard.as_ref()?.rate(&code)?;
        Some(format!("1 {code} = {:.2} {BASE_CURRENCY_SYMBOL}", 1.0 / rate))
    }

    /// Human readable age of the cached set.
    pub fn updated_ago(&self, now: DateTime<Utc>) -> Option<String> {
        let age = now - self.cached_timestamp()?;
        let minutes = age.num_minutes();
        let text = if minutes < 1 {
            "updated just now".to_string()
        } else if minutes < 60 {
            format!("updated {} ago", plural(minutes, "minute"))
        } else if age.num_hours() < 24 {
            format!("updated {} ago", plural(age.num_hours(), "hour"))
        } else {
            format!("updated {} ago", plural(age.num_days(), "day"))
        };
        Some(text)
    }
}

impl Default for RateContext {
    fn default() -> Self {
        Self::new(BASE_CURRENCY, Duration::from_secs(60 * 60))
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

/// Formats `amount` for display in `currency`.
///
/// Dinars are rounded to whole units with the `DA` suffix; anything else keeps
/// two decimals (dropped for whole values) followed by its code.
pub fn format_amount(amount: f64, currency: &str) -> String {
    if !amount.is_finite() {
        return format!("{amount} {currency}");
    }

    if currency == BASE_CURRENCY {
        return format!("{} {BASE_CURRENCY_SYMBOL}", group_thousands(amount.round(), 0));
    }

    let cents = (amount * 100.0).round();
    let decimals = if cents % 100.0 == 0.0 { 0 } else { 2 };
    format!("{} {currency}", group_thousands(cents / 100.0, decimals))
}

fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match formatted.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(formatted.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    if value < 0.0 && grouped.chars().any(|c| c != '0' && c != ',' && c != '.') {
        grouped.insert(0, '-');
    }
    grouped
}
