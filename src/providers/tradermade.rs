use crate::core::config::ProviderConfig;
use crate::core::{QuoteProvider, RateError};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

/// Live quote endpoint returning `{"quotes": [{"midpoint": ..}, ..]}`.
pub struct TraderMadeProvider {
    base_url: String,
    path: String,
    pair: String,
    api_key: Option<String>,
    source: String,
    client: reqwest::Client,
}

impl TraderMadeProvider {
    pub fn new(config: &ProviderConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("dzrate/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(TraderMadeProvider {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            path: config.path.clone(),
            pair: config.pair.clone(),
            api_key: config.api_key.clone(),
            source: config.source.clone(),
            client,
        })
    }

    fn request_url(&self) -> Result<Url, RateError> {
        let mut params = vec![("currency", self.pair.as_str())];
        if let Some(api_key) = &self.api_key {
            params.push(("api_key", api_key.as_str()));
        }
        Url::parse_with_params(&format!("{}{}", self.base_url, self.path), &params)
            .map_err(|e| RateError::UpstreamUnavailable(format!("Invalid provider URL: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct LiveResponse {
    quotes: Vec<LiveQuote>,
}

#[derive(Debug, Deserialize)]
struct LiveQuote {
    midpoint: Option<f64>,
}

fn parse_midpoint(body: &str, pair: &str) -> Result<f64, RateError> {
    let data: LiveResponse = serde_json::from_str(body).map_err(|e| {
        RateError::MalformedResponse(format!("Failed to parse quote response for {pair}: {e}"))
    })?;

    data.quotes
        .first()
        .and_then(|quote| quote.midpoint)
        .ok_or_else(|| {
            RateError::MalformedResponse(format!("No quotes[0].midpoint in response for {pair}"))
        })
}

#[async_trait]
impl QuoteProvider for TraderMadeProvider {
    fn source(&self) -> &str {
        &self.source
    }

    #[instrument(name = "QuoteFetch", skip(self), fields(pair = %self.pair))]
    async fn fetch_midpoint(&self) -> Result<f64, RateError> {
        let url = self.request_url()?;
        debug!("Requesting quote from {}{}", self.base_url, self.path);

        let response = self.client.get(url).send().await.map_err(|e| {
            RateError::UpstreamUnavailable(format!("Request error: {e} for pair: {}", self.pair))
        })?;

        if !response.status().is_success() {
            return Err(RateError::UpstreamUnavailable(format!(
                "HTTP error: {} for pair: {}",
                response.status(),
                self.pair
            )));
        }

        let text = response.text().await.map_err(|e| {
            RateError::UpstreamUnavailable(format!("Failed to read body for {}: {e}", self.pair))
        })?;

        let midpoint = parse_midpoint(&text, &self.pair)?;
        debug!(midpoint, "Received quote");
        Ok(midpoint)
    }
}
