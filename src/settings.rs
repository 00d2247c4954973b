use ::config::builder::DefaultState;
use ::config::{Config, ConfigBuilder, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::risk::Cooldown;
use crate::strategy::{StrategyConfig, StrategyKind};
use crate::{Error, Result};

pub const DEFAULT_CONFIG_FILE: &str = "goldbot.toml";

/// Upper bound for every minute-based setting (one week)
const MAX_MINUTES: u64 = 7 * 24 * 60;
/// Twelve Data caps `outputsize` at 5000
const MAX_CANDLES: usize = 5000;

/// Process configuration, fixed for the lifetime of the process
///
/// Layered lowest to highest: built-in defaults, TOML file, `GOLDBOT_*`
/// environment variables, then the provider credentials under their usual
/// names (`TWELVE_DATA_API_KEY`, `TELEGRAM_BOT_TOKEN`, `TELEGRAM_CHAT_ID`).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    // Credentials
    pub twelve_data_api_key: String,
    pub telegram_bot_token: String,
    pub telegram_chat_id: String,

    // Instrument
    pub symbol: String,       // Twelve Data symbol, e.g. "XAU/USD"
    pub price_symbol: String, // gold-api symbol, e.g. "XAU"
    pub signal_interval: String,
    pub trend_interval: String,
    pub candle_count: usize,

    // Indicators
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub ema_trend: usize,
    pub cci_period: u32,
    pub atr_period: u32,
    pub adx_period: u32,

    // Strategy
    pub strategy: StrategyKind,
    pub adx_min: Decimal,
    pub cci_long_floor: Decimal,
    pub cci_short_ceiling: Decimal,
    pub risk_reward: Decimal,

    // Scheduling
    pub poll_interval_minutes: u64,
    pub cooldown_minutes: u64,
    pub heartbeat_minutes: u64,

    // Output
    pub journal_path: PathBuf,

    // Providers
    pub twelve_data_base_url: String,
    pub twelve_data_rate_limit_rpm: u32,
    pub gold_api_base_url: String,
    pub telegram_base_url: String,
}

impl Settings {
    /// Load from `path` (or `goldbot.toml` if present) and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let builder = Self::defaults()?
            .add_source(file)
            .add_source(Environment::with_prefix("GOLDBOT"))
            .set_override_option("twelve_data_api_key", std::env::var("TWELVE_DATA_API_KEY").ok())?
            .set_override_option("telegram_bot_token", std::env::var("TELEGRAM_BOT_TOKEN").ok())?
            .set_override_option("telegram_chat_id", std::env::var("TELEGRAM_CHAT_ID").ok())?;

        Self::from_builder(builder)
    }

    /// Builder pre-filled with the reference defaults
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("symbol", "XAU/USD")?
            .set_default("price_symbol", "XAU")?
            .set_default("signal_interval", "15min")?
            .set_default("trend_interval", "1h")?
            .set_default("candle_count", 60_i64)?
            .set_default("ema_fast", 13_i64)?
            .set_default("ema_slow", 21_i64)?
            .set_default("ema_trend", 50_i64)?
            .set_default("cci_period", 20_i64)?
            .set_default("atr_period", 14_i64)?
            .set_default("adx_period", 14_i64)?
            .set_default("strategy", "trend_adx")?
            .set_default("adx_min", "20")?
            .set_default("cci_long_floor", "-100")?
            .set_default("cci_short_ceiling", "100")?
            .set_default("risk_reward", "2.0")?
            .set_default("poll_interval_minutes", 15_i64)?
            .set_default("cooldown_minutes", 30_i64)?
            .set_default("heartbeat_minutes", 30_i64)?
            .set_default("journal_path", "signal_report.csv")?
            .set_default("twelve_data_base_url", "https://api.twelvedata.com")?
            .set_default("twelve_data_rate_limit_rpm", 8_i64)?
            .set_default("gold_api_base_url", "https://api.gold-api.com")?
            .set_default("telegram_base_url", "https://api.telegram.org")?)
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("twelve_data_api_key", &self.twelve_data_api_key),
            ("telegram_bot_token", &self.telegram_bot_token),
            ("telegram_chat_id", &self.telegram_chat_id),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("{} must not be empty", key)));
            }
        }

        for (key, value) in [
            ("poll_interval_minutes", self.poll_interval_minutes),
            ("heartbeat_minutes", self.heartbeat_minutes),
        ] {
            if value == 0 {
                return Err(Error::Config(format!("{} must be > 0", key)));
            }
        }

        for (key, value) in [
            ("poll_interval_minutes", self.poll_interval_minutes),
            ("heartbeat_minutes", self.heartbeat_minutes),
            ("cooldown_minutes", self.cooldown_minutes),
        ] {
            if value > MAX_MINUTES {
                return Err(Error::Config(format!(
                    "{} must be at most {}, got {}",
                    key, MAX_MINUTES, value
                )));
            }
        }

        if self.candle_count > MAX_CANDLES {
            return Err(Error::Config(format!(
                "candle_count must be at most {}, got {}",
                MAX_CANDLES, self.candle_count
            )));
        }

        for (key, period) in [
            ("ema_fast", self.ema_fast),
            ("ema_slow", self.ema_slow),
            ("ema_trend", self.ema_trend),
        ] {
            if period == 0 || period > self.candle_count {
                return Err(Error::Config(format!(
                    "{} must be between 1 and candle_count ({}), got {}",
                    key, self.candle_count, period
                )));
            }
        }

        if self.risk_reward <= Decimal::ZERO {
            return Err(Error::Config("risk_reward must be > 0".to_string()));
        }

        if self.twelve_data_rate_limit_rpm == 0 {
            return Err(Error::Config("twelve_data_rate_limit_rpm must be > 0".to_string()));
        }

        Ok(())
    }

    pub fn strategy_config(&self) -> StrategyConfig {
        StrategyConfig {
            adx_min: self.adx_min,
            cci_long_floor: self.cci_long_floor,
            cci_short_ceiling: self.cci_short_ceiling,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_minutes * 60)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_minutes * 60)
    }

    /// Emission cooldown, tolerant of up to half a poll interval of tick jitter
    pub fn cooldown(&self) -> Cooldown {
        Cooldown::new(chrono::Duration::minutes(self.cooldown_minutes as i64))
            .with_tolerance(chrono::Duration::seconds(self.poll_interval_minutes as i64 * 30))
    }

    /// Log the effective configuration without credentials
    pub fn log_summary(&self) {
        tracing::info!("📊 Configuration:");
        tracing::info!("  Instrument: {} (spot: {})", self.symbol, self.price_symbol);
        tracing::info!(
            "  Timeframes: signal {} / trend {} ({} candles)",
            self.signal_interval,
            self.trend_interval,
            self.candle_count
        );
        tracing::info!(
            "  EMA: {}/{}/{}  CCI({})  ATR({})  ADX({})",
            self.ema_fast,
            self.ema_slow,
            self.ema_trend,
            self.cci_period,
            self.atr_period,
            self.adx_period
        );
        tracing::info!("  Strategy: {:?}  R:R {}", self.strategy, self.risk_reward);
        tracing::info!(
            "  Poll: {}m  Cooldown: {}m  Heartbeat: {}m",
            self.poll_interval_minutes,
            self.cooldown_minutes,
            self.heartbeat_minutes
        );
        tracing::info!("  Journal: {}", self.journal_path.display());
        tracing::info!("  Chat: {}", self.telegram_chat_id);
    }
}
