pub mod gold_api;
pub mod telegram;
pub mod twelvedata;

pub use gold_api::GoldApiClient;
pub use telegram::TelegramClient;
pub use twelvedata::TwelveDataClient;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::models::{CandleSeries, IndicatorKind};
use crate::Result;

/// Source of prices, candles and provider-computed indicators
#[async_trait]
pub trait MarketDataGateway: Send + Sync {
    /// Live quote for the instrument
    async fn current_price(&self, symbol: &str) -> Result<Decimal>;

    /// Latest `count` candles at `interval`, oldest first
    async fn candles(&self, symbol: &str, interval: &str, count: usize) -> Result<CandleSeries>;

    /// Indicator series at `interval`, oldest first
    async fn indicator(
        &self,
        kind: IndicatorKind,
        symbol: &str,
        interval: &str,
        period: Option<u32>,
    ) -> Result<Vec<Decimal>>;
}

/// Delivery of human-readable messages to a chat channel
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, channel: &str, text: &str) -> Result<()>;
}

/// Production gateway: spot price from gold-api, everything else from Twelve Data
#[derive(Clone)]
pub struct LiveMarketData {
    prices: GoldApiClient,
    series: TwelveDataClient,
}

impl LiveMarketData {
    pub fn new(prices: GoldApiClient, series: TwelveDataClient) -> Self {
        Self { prices, series }
    }
}

#[async_trait]
impl MarketDataGateway for LiveMarketData {
    async fn current_price(&self, symbol: &str) -> Result<Decimal> {
        self.prices.get_price(symbol).await
    }

    async fn candles(&self, symbol: &str, interval: &str, count: usize) -> Result<CandleSeries> {
        self.series.get_time_series(symbol, interval, count).await
    }

    async fn indicator(
        &self,
        kind: IndicatorKind,
        symbol: &str,
        interval: &str,
        period: Option<u32>,
    ) -> Result<Vec<Decimal>> {
        self.series.get_indicator(kind, symbol, interval, period).await
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn send(&self, channel: &str, text: &str) -> Result<()> {
        self.send_message(channel, text).await
    }
}
