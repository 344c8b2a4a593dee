use super::ui;
use crate::core::cache::Store;
use crate::core::config::AppConfig;
use crate::core::settings::SETTINGS_COLLECTION;
use crate::providers::caching::RATE_CACHE_COLLECTION;
use crate::providers::{CachingRateSource, SettingsRateSource};
use crate::reader::{RateContext, format_amount};
use crate::store::settings::KvSettingsStore;
use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::Cell;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShowOptions {
    /// Amount to format, in `from`.
    pub amount: Option<f64>,
    pub from: String,
    /// Overrides the configured display currency.
    pub to: Option<String>,
    /// Skip the local cache and read the settings store.
    pub refresh: bool,
}

pub async fn show(config: &AppConfig, store: &dyn Store, options: &ShowOptions) -> Result<()> {
    let settings = Arc::new(KvSettingsStore::new(
        store.get_collection(SETTINGS_COLLECTION, true)?,
    ));
    let source = CachingRateSource::new(
        SettingsRateSource::new(settings),
        store.get_collection(RATE_CACHE_COLLECTION, true)?,
        config.display.staleness(),
    );
    if options.refresh {
        source.invalidate().await?;
    }

    let mut context = RateContext::new(&config.display.currency, config.display.staleness());
    if let Some(to) = &options.to {
        context.set_currency(to);
    }
    context.refresh_if_stale(&source).await?;

    println!("{}", render(&context, options, Utc::now()));
    Ok(())
}

/// Renders the rate table, freshness line and optional converted amount.
pub fn render(context: &RateContext, options: &ShowOptions, now: DateTime<Utc>) -> String {
    let mut output = format!(
        "{}\n\n",
        ui::style_text("Exchange rates", ui::StyleType::Title)
    );

    match context.exchange_rates() {
        Some(cached) => {
            let mut table = ui::new_styled_table();
            table.set_header(vec![
                ui::header_cell("Currency"),
                ui::header_cell("Per 1 DA"),
                ui::header_cell("Rate"),
            ]);

            let mut codes: Vec<_> = cached.rates.keys().cloned().collect();
            codes.sort();
            for code in codes {
                table.add_row(vec![
                    Cell::new(&code),
                    ui::rate_cell(&code, cached.rate(&code)),
                    ui::format_optional_cell(context.rate_label(&code), |label| label),
                ]);
            }
            output.push_str(&table.to_string());

            if let Some(updated) = context.updated_ago(now) {
                output.push_str(&format!(
                    "\n{}",
                    ui::style_text(&updated, ui::StyleType::Subtle)
                ));
            }
        }
        None => output.push_str(&ui::style_text(
            "No exchange rate published yet",
            ui::StyleType::Error,
        )),
    }

    if let Some(amount) = options.amount {
        let original = format_amount(amount, &options.from.to_uppercase());
        let converted = context.format_price(amount, &options.from);
        output.push_str(&format!(
            "\n\n{} in {}: {}",
            ui::style_text(&original, ui::StyleType::TotalLabel),
            context.display_currency(),
            ui::style_text(&converted, ui::StyleType::TotalValue)
        ));
    }

    output
}
