use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{Error, Result};

const GOLD_API_BASE: &str = "https://api.gold-api.com";

/// Client for gold-api.com spot quotes
#[derive(Clone)]
pub struct GoldApiClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct PriceResponse {
    #[serde(default)]
    price: Option<Decimal>,
}

impl GoldApiClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(GOLD_API_BASE)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Get the live quote for a metal symbol (e.g. "XAU")
    pub async fn get_price(&self, symbol: &str) -> Result<Decimal> {
        let url = format!("{}/price/{}", self.base_url, symbol);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::unavailable("gold-api", format!("HTTP {}", status)));
        }

        let body: PriceResponse = response
            .json()
            .await
            .map_err(|e| Error::unavailable("gold-api", format!("malformed payload: {}", e)))?;

        match body.price {
            Some(price) if price > Decimal::ZERO => {
                tracing::debug!(symbol, %price, "Fetched spot price");
                Ok(price)
            }
            Some(price) => Err(Error::unavailable("gold-api", format!("non-positive price {}", price))),
            None => Err(Error::unavailable("gold-api", "no price in payload")),
        }
    }
}
