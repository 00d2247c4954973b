#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use goldbot::api::{MarketDataGateway, Notifier};
use goldbot::execution::{SessionConfig, SessionDeps, SignalSession};
use goldbot::persistence::SignalJournal;
use goldbot::risk::Cooldown;
use goldbot::strategy::{Strategy, StrategyConfig, StrategyKind};
use goldbot::{CandleSeries, Decision, Error, IndicatorKind, IndicatorSnapshot, Result, SignalRecord};
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const CHAT_ID: &str = "-100200";

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
}

pub fn dec(value: i64) -> Decimal {
    Decimal::from(value)
}

pub fn ramp(start: i64, len: usize) -> Vec<Decimal> {
    (0..len as i64).map(|i| Decimal::from(start + i)).collect()
}

/// In-memory market with a settable live price and fixed series
pub struct FakeMarket {
    price: Mutex<Option<Decimal>>,
    signal_closes: Vec<Decimal>,
    trend_closes: Vec<Decimal>,
    indicators: HashMap<IndicatorKind, Vec<Decimal>>,
    fail_series: AtomicBool,
    fail_indicator: Mutex<Option<IndicatorKind>>,
    panic_on_price: AtomicBool,
    price_calls: AtomicUsize,
    indicator_calls: Mutex<Vec<IndicatorKind>>,
}

impl FakeMarket {
    /// Rising closes on both timeframes with readings that satisfy the ADX strategy's LONG side
    pub fn bullish() -> Self {
        let mut indicators = HashMap::new();
        indicators.insert(IndicatorKind::Cci, vec![dec(40), dec(50)]);
        indicators.insert(IndicatorKind::Atr, vec![dec(4), dec(5)]);
        indicators.insert(IndicatorKind::Adx, vec![dec(25), dec(28)]);
        indicators.insert(IndicatorKind::PlusDi, vec![dec(29), dec(30)]);
        indicators.insert(IndicatorKind::MinusDi, vec![dec(16), dec(15)]);
        indicators.insert(IndicatorKind::Obv, vec![dec(1000), dec(1200)]);

        Self {
            price: Mutex::new(Some(dec(2000))),
            signal_closes: ramp(1940, 60),
            trend_closes: ramp(1900, 60),
            indicators,
            fail_series: AtomicBool::new(false),
            fail_indicator: Mutex::new(None),
            panic_on_price: AtomicBool::new(false),
            price_calls: AtomicUsize::new(0),
            indicator_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_price(&self, price: Option<Decimal>) {
        *self.price.lock().unwrap() = price;
    }

    pub fn set_fail_series(&self, fail: bool) {
        self.fail_series.store(fail, Ordering::SeqCst);
    }

    /// Fail only the given indicator; candles keep working
    pub fn set_fail_indicator(&self, kind: Option<IndicatorKind>) {
        *self.fail_indicator.lock().unwrap() = kind;
    }

    pub fn set_panic_on_price(&self, panic: bool) {
        self.panic_on_price.store(panic, Ordering::SeqCst);
    }

    pub fn price_calls(&self) -> usize {
        self.price_calls.load(Ordering::SeqCst)
    }

    pub fn indicator_calls(&self) -> Vec<IndicatorKind> {
        self.indicator_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketDataGateway for FakeMarket {
    async fn current_price(&self, _symbol: &str) -> Result<Decimal> {
        self.price_calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_price.load(Ordering::SeqCst) {
            panic!("price feed exploded");
        }
        let price = *self.price.lock().unwrap();
        price.ok_or_else(|| Error::unavailable("fake/price", "no quote"))
    }

    async fn candles(&self, _symbol: &str, interval: &str, count: usize) -> Result<CandleSeries> {
        if self.fail_series.load(Ordering::SeqCst) {
            return Err(Error::unavailable("fake/time_series", "provider outage"));
        }
        let closes = if interval == "1h" {
            &self.trend_closes
        } else {
            &self.signal_closes
        };
        let close: Vec<Decimal> = closes.iter().rev().take(count).rev().copied().collect();
        Ok(CandleSeries {
            high: close.clone(),
            low: close.clone(),
            close,
        })
    }

    async fn indicator(
        &self,
        kind: IndicatorKind,
        _symbol: &str,
        _interval: &str,
        _period: Option<u32>,
    ) -> Result<Vec<Decimal>> {
        if self.fail_series.load(Ordering::SeqCst) {
            return Err(Error::unavailable(format!("fake/{}", kind), "provider outage"));
        }
        self.indicator_calls.lock().unwrap().push(kind);
        if *self.fail_indicator.lock().unwrap() == Some(kind) {
            return Err(Error::unavailable(format!("fake/{}", kind), "rate limited"));
        }
        self.indicators
            .get(&kind)
            .cloned()
            .ok_or_else(|| Error::unavailable(format!("fake/{}", kind), "not configured"))
    }
}

/// Notifier that records every message it is asked to deliver
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn count_containing(&self, needle: &str) -> usize {
        self.messages().iter().filter(|m| m.contains(needle)).count()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, channel: &str, text: &str) -> Result<()> {
        assert_eq!(channel, CHAT_ID);
        self.messages.lock().unwrap().push(text.to_string());
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Notification("chat not found".to_string()));
        }
        Ok(())
    }
}

/// Journal kept in memory
#[derive(Default)]
pub struct MemoryJournal {
    records: Mutex<Vec<SignalRecord>>,
    fail: AtomicBool,
}

impl MemoryJournal {
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn records(&self) -> Vec<SignalRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.records().iter().map(|r| r.to_csv_line()).collect()
    }
}

#[async_trait]
impl SignalJournal for MemoryJournal {
    async fn append(&self, record: &SignalRecord) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::LogWrite(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Strategy that replays a fixed list of decisions, then returns NONE
pub struct ScriptedStrategy {
    decisions: Mutex<VecDeque<Decision>>,
}

impl ScriptedStrategy {
    pub fn new(decisions: impl IntoIterator<Item = Decision>) -> Self {
        Self {
            decisions: Mutex::new(decisions.into_iter().collect()),
        }
    }
}

impl Strategy for ScriptedStrategy {
    fn evaluate(&self, _snapshot: &IndicatorSnapshot) -> Decision {
        self.decisions.lock().unwrap().pop_front().unwrap_or(Decision::None)
    }

    fn name(&self) -> &str {
        "ScriptedStrategy"
    }

    fn requirements(&self) -> &[IndicatorKind] {
        &[IndicatorKind::Cci, IndicatorKind::Atr]
    }
}

pub struct Harness {
    pub market: Arc<FakeMarket>,
    pub notifier: Arc<RecordingNotifier>,
    pub journal: Arc<MemoryJournal>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            market: Arc::new(FakeMarket::bullish()),
            notifier: Arc::new(RecordingNotifier::default()),
            journal: Arc::new(MemoryJournal::default()),
        }
    }

    pub fn session(&self, strategy: Box<dyn Strategy>) -> SignalSession {
        self.session_with_cooldown(strategy, Cooldown::default())
    }

    pub fn session_with_cooldown(&self, strategy: Box<dyn Strategy>, cooldown: Cooldown) -> SignalSession {
        let config = SessionConfig {
            chat_id: CHAT_ID.to_string(),
            ..SessionConfig::default()
        };
        let deps = SessionDeps {
            market: self.market.clone(),
            notifier: self.notifier.clone(),
            journal: self.journal.clone(),
            strategy,
        };
        SignalSession::new(config, deps, cooldown)
    }

    pub fn adx_session(&self) -> SignalSession {
        self.session(StrategyKind::TrendAdx.build(StrategyConfig::default()))
    }
}
