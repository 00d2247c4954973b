use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Candle columns as returned by the market-data provider, oldest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandleSeries {
    pub close: Vec<Decimal>,
    pub high: Vec<Decimal>,
    pub low: Vec<Decimal>,
}

impl CandleSeries {
    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    pub fn last_close(&self) -> Option<Decimal> {
        self.close.last().copied()
    }
}

/// Trade direction of a fired signal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "LONG",
            Direction::Short => "SHORT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of a strategy evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    None,
    Long,
    Short,
}

impl Decision {
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Decision::None => None,
            Decision::Long => Some(Direction::Long),
            Decision::Short => Some(Direction::Short),
        }
    }
}

/// Indicators computed by the market-data provider
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    Cci,
    Atr,
    Adx,
    PlusDi,
    MinusDi,
    Obv,
}

impl IndicatorKind {
    /// Endpoint name, which is also the value key in the response payload
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorKind::Cci => "cci",
            IndicatorKind::Atr => "atr",
            IndicatorKind::Adx => "adx",
            IndicatorKind::PlusDi => "plus_di",
            IndicatorKind::MinusDi => "minus_di",
            IndicatorKind::Obv => "obv",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Slope of the on-balance-volume series between its last two readings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObvSlope {
    Rising,
    Falling,
    Flat,
}

impl ObvSlope {
    /// None when fewer than two readings are available
    pub fn from_series(obv: &[Decimal]) -> Option<Self> {
        let [prev, last] = obv.get(obv.len().checked_sub(2)?..)? else {
            return None;
        };
        Some(match last.cmp(prev) {
            std::cmp::Ordering::Greater => ObvSlope::Rising,
            std::cmp::Ordering::Less => ObvSlope::Falling,
            std::cmp::Ordering::Equal => ObvSlope::Flat,
        })
    }
}

/// ADX with its directional-movement components
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalMovement {
    pub adx: Decimal,
    pub plus_di: Decimal,
    pub minus_di: Decimal,
}

/// Indicator readings for one evaluation cycle
///
/// Rebuilt from scratch each cycle. `directional` and `obv` are only populated
/// when the active strategy asks for them.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSnapshot {
    /// Signal-timeframe closes with the last element replaced by the live price
    pub close_prices: Vec<Decimal>,
    pub ema_fast: Decimal,
    pub ema_slow: Decimal,
    pub ema_trend: Decimal,
    pub trend_up_1h: bool,
    pub cci: Decimal,
    pub atr: Decimal,
    pub directional: Option<DirectionalMovement>,
    pub obv: Option<ObvSlope>,
}

impl IndicatorSnapshot {
    pub fn last_close(&self) -> Option<Decimal> {
        self.close_prices.last().copied()
    }
}

/// A virtual position opened by a fired signal
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub direction: Direction,
    pub entry: Decimal,
    pub take_profit: Decimal,
    pub stop_loss: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Signal {
    /// Build a signal and check that take-profit and stop-loss bracket the entry
    pub fn new(
        direction: Direction,
        entry: Decimal,
        take_profit: Decimal,
        stop_loss: Decimal,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        let ordered = match direction {
            Direction::Long => take_profit > entry && entry > stop_loss,
            Direction::Short => take_profit < entry && entry < stop_loss,
        };
        if !ordered {
            return Err(Error::InvalidSignal(format!(
                "{} entry {} with tp {} and sl {}",
                direction, entry, take_profit, stop_loss
            )));
        }

        Ok(Self {
            direction,
            entry,
            take_profit,
            stop_loss,
            created_at,
        })
    }

    /// Size stop at one ATR and take-profit at `risk_reward` ATRs from entry
    pub fn from_atr(
        direction: Direction,
        entry: Decimal,
        atr: Decimal,
        risk_reward: Decimal,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        if atr <= Decimal::ZERO {
            return Err(Error::InvalidSignal(format!("non-positive ATR {}", atr)));
        }

        let reward = atr * risk_reward;
        let (take_profit, stop_loss) = match direction {
            Direction::Long => (entry + reward, entry - atr),
            Direction::Short => (entry - reward, entry + atr),
        };

        Self::new(direction, entry, take_profit, stop_loss, created_at)
    }

    /// Outcome if `price` has reached one of the targets
    pub fn outcome_at(&self, price: Decimal) -> Option<Outcome> {
        match self.direction {
            Direction::Long if price >= self.take_profit => Some(Outcome::TakeProfit),
            Direction::Long if price <= self.stop_loss => Some(Outcome::StopLoss),
            Direction::Short if price <= self.take_profit => Some(Outcome::TakeProfit),
            Direction::Short if price >= self.stop_loss => Some(Outcome::StopLoss),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Outcome {
    #[serde(rename = "TP")]
    TakeProfit,
    #[serde(rename = "SL")]
    StopLoss,
    #[serde(rename = "PENDING")]
    Pending,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::TakeProfit => "TP",
            Outcome::StopLoss => "SL",
            Outcome::Pending => "PENDING",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One append-only journal row
#[derive(Debug, Clone, PartialEq)]
pub struct SignalRecord {
    pub timestamp: DateTime<Utc>,
    pub instrument: String,
    pub direction: Direction,
    pub entry: Decimal,
    pub take_profit: Decimal,
    pub stop_loss: Decimal,
    pub outcome: Outcome,
}

impl SignalRecord {
    pub fn from_signal(
        signal: &Signal,
        instrument: &str,
        outcome: Outcome,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp,
            instrument: instrument.to_string(),
            direction: signal.direction,
            entry: signal.entry,
            take_profit: signal.take_profit,
            stop_loss: signal.stop_loss,
            outcome,
        }
    }

    /// CSV line without trailing newline
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{},{},{:.2},{:.2},{:.2},{}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.instrument,
            self.direction,
            self.entry,
            self.take_profit,
            self.stop_loss,
            self.outcome
        )
    }
}
