use governor::{Quota, RateLimiter};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::num::NonZeroU32;
use std::str::FromStr;
use std::sync::Arc;

use crate::models::{CandleSeries, IndicatorKind};
use crate::{Error, Result};

const TWELVE_DATA_API_BASE: &str = "https://api.twelvedata.com";
const DEFAULT_RATE_LIMIT_RPM: u32 = 8; // Free plan: 8 API credits per minute

// Type alias for the rate limiter to simplify signatures
type TwelveDataRateLimiter = RateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Twelve Data API client for candles and provider-computed indicators
///
/// Cloneable; all clones share the same rate limiter. Requests are attempted
/// once: a failed fetch is reported as unavailable and the next scheduled
/// cycle is the retry.
#[derive(Clone)]
pub struct TwelveDataClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: Arc<TwelveDataRateLimiter>,
}

/// Envelope shared by /time_series and indicator endpoints
///
/// Errors come back as `{"code": 4xx, "message": "...", "status": "error"}`
/// with no `values`, sometimes under HTTP 200.
#[derive(Debug, Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Option<Vec<Map<String, Value>>>,
    #[serde(default)]
    message: Option<String>,
}

impl TwelveDataClient {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_base_url(api_key, TWELVE_DATA_API_BASE, DEFAULT_RATE_LIMIT_RPM)
    }

    /// Create a client against a custom endpoint and request budget
    pub fn with_base_url(
        api_key: String,
        base_url: impl Into<String>,
        rate_limit_rpm: u32,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        let rpm = NonZeroU32::new(rate_limit_rpm)
            .ok_or_else(|| Error::Config("twelve_data_rate_limit_rpm must be > 0".to_string()))?;
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(rpm)));

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rate_limiter,
        })
    }

    /// Make a rate-limited GET and return the `values` rows, oldest first
    async fn fetch_values(&self, endpoint: &str, query: &[(&str, String)]) -> Result<Vec<Map<String, Value>>> {
        let source = format!("twelvedata/{}", endpoint);

        // Wait for rate limiter
        self.rate_limiter.until_ready().await;

        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!("Fetching {} with {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::unavailable(source, format!("HTTP {}", status)));
        }

        let body: ValuesResponse = response
            .json()
            .await
            .map_err(|e| Error::unavailable(&source, format!("malformed payload: {}", e)))?;

        let mut values = match body.values {
            Some(values) if !values.is_empty() => values,
            _ => {
                let reason = body
                    .message
                    .unwrap_or_else(|| "no values in payload".to_string());
                return Err(Error::unavailable(source, reason));
            }
        };

        // Provider returns newest first
        values.reverse();
        Ok(values)
    }

    /// Fetch `count` candles for `symbol` at `interval` (e.g. "15min", "1h")
    pub async fn get_time_series(
        &self,
        symbol: &str,
        interval: &str,
        count: usize,
    ) -> Result<CandleSeries> {
        let rows = self
            .fetch_values(
                "time_series",
                &[
                    ("symbol", symbol.to_string()),
                    ("interval", interval.to_string()),
                    ("outputsize", count.to_string()),
                ],
            )
            .await?;

        let mut series = CandleSeries::default();
        for row in &rows {
            series.close.push(parse_field(row, "close", "twelvedata/time_series")?);
            series.high.push(parse_field(row, "high", "twelvedata/time_series")?);
            series.low.push(parse_field(row, "low", "twelvedata/time_series")?);
        }

        tracing::debug!("Fetched {} {} candles for {}", series.len(), interval, symbol);

        Ok(series)
    }

    /// Fetch an indicator series, oldest first
    pub async fn get_indicator(
        &self,
        kind: IndicatorKind,
        symbol: &str,
        interval: &str,
        time_period: Option<u32>,
    ) -> Result<Vec<Decimal>> {
        let mut query = vec![
            ("symbol", symbol.to_string()),
            ("interval", interval.to_string()),
        ];
        if let Some(period) = time_period {
            query.push(("time_period", period.to_string()));
        }

        let source = format!("twelvedata/{}", kind);
        let rows = self.fetch_values(kind.as_str(), &query).await?;

        rows.iter()
            .map(|row| parse_field(row, kind.as_str(), &source))
            .collect()
    }
}

/// Read a decimal column that the provider may send as a string or a number
fn parse_field(row: &Map<String, Value>, field: &str, source: &str) -> Result<Decimal> {
    let raw = match row.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(Error::unavailable(source, format!("missing field '{}'", field))),
    };

    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| Error::unavailable(source, format!("bad {} value '{}'", field, raw)))
}
