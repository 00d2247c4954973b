use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;

use super::position_tracker::{ClosedSignal, PositionTracker};
use crate::api::{MarketDataGateway, Notifier};
use crate::indicators::{calculate_ema, is_uptrend, with_live_price};
use crate::models::{
    Decision, Direction, DirectionalMovement, IndicatorKind, IndicatorSnapshot, ObvSlope,
    Outcome, Signal, SignalRecord,
};
use crate::persistence::SignalJournal;
use crate::risk::Cooldown;
use crate::settings::Settings;
use crate::strategy::Strategy;
use crate::{Error, Result};

/// Instrument and indicator parameters for one session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub symbol: String,
    pub price_symbol: String,
    pub chat_id: String,
    pub signal_interval: String,
    pub trend_interval: String,
    pub candle_count: usize,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub ema_trend: usize,
    pub cci_period: u32,
    pub atr_period: u32,
    pub adx_period: u32,
    pub risk_reward: Decimal,
    pub poll_interval_minutes: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            symbol: "XAU/USD".to_string(),
            price_symbol: "XAU".to_string(),
            chat_id: String::new(),
            signal_interval: "15min".to_string(),
            trend_interval: "1h".to_string(),
            candle_count: 60,
            ema_fast: 13,
            ema_slow: 21,
            ema_trend: 50,
            cci_period: 20,
            atr_period: 14,
            adx_period: 14,
            risk_reward: Decimal::TWO,
            poll_interval_minutes: 15,
        }
    }
}

impl From<&Settings> for SessionConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            symbol: settings.symbol.clone(),
            price_symbol: settings.price_symbol.clone(),
            chat_id: settings.telegram_chat_id.clone(),
            signal_interval: settings.signal_interval.clone(),
            trend_interval: settings.trend_interval.clone(),
            candle_count: settings.candle_count,
            ema_fast: settings.ema_fast,
            ema_slow: settings.ema_slow,
            ema_trend: settings.ema_trend,
            cci_period: settings.cci_period,
            atr_period: settings.atr_period,
            adx_period: settings.adx_period,
            risk_reward: settings.risk_reward,
            poll_interval_minutes: settings.poll_interval_minutes,
        }
    }
}

/// What one evaluation cycle did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    /// Live price, if it could be fetched
    pub price: Option<Decimal>,
    /// Signals closed against `price`
    pub closed: Vec<ClosedSignal>,
    /// Strategy output, if the signal path got that far
    pub decision: Option<Decision>,
    /// Signal opened and announced this cycle
    pub emitted: Option<Signal>,
    /// A LONG/SHORT decision was dropped because the cooldown is active
    pub suppressed: bool,
    /// The signal path was aborted for missing data
    pub degraded: bool,
}

/// Collaborators injected into a session
pub struct SessionDeps {
    pub market: Arc<dyn MarketDataGateway>,
    pub notifier: Arc<dyn Notifier>,
    pub journal: Arc<dyn SignalJournal>,
    pub strategy: Box<dyn Strategy>,
}

/// Mutable state of the bot: open signals, cooldown and last indicator readings
///
/// Owned by the scheduler task, so no locking is needed. Every method
/// isolates collaborator failures: errors are logged and never propagate out
/// of a cycle.
pub struct SignalSession {
    config: SessionConfig,
    market: Arc<dyn MarketDataGateway>,
    notifier: Arc<dyn Notifier>,
    journal: Arc<dyn SignalJournal>,
    strategy: Box<dyn Strategy>,
    tracker: PositionTracker,
    cooldown: Cooldown,
    last_snapshot: Option<IndicatorSnapshot>,
}

impl SignalSession {
    pub fn new(config: SessionConfig, deps: SessionDeps, cooldown: Cooldown) -> Self {
        Self {
            config,
            market: deps.market,
            notifier: deps.notifier,
            journal: deps.journal,
            strategy: deps.strategy,
            tracker: PositionTracker::new(),
            cooldown,
            last_snapshot: None,
        }
    }

    pub fn tracker(&self) -> &PositionTracker {
        &self.tracker
    }

    pub fn cooldown(&self) -> &Cooldown {
        &self.cooldown
    }

    /// Announce that the bot is up
    pub async fn startup(&self) {
        let text = format!(
            "✅ Gold signal bot started for {}\nStrategy: {}\nChecking every {} min\nCooldown: {} min",
            self.config.symbol,
            self.strategy.name(),
            self.config.poll_interval_minutes,
            self.cooldown.window().num_minutes()
        );
        self.notify(&text).await;
    }

    /// Run one evaluation cycle at the current time
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.run_cycle_at(Utc::now()).await
    }

    /// Run one evaluation cycle with an explicit clock
    ///
    /// Target tracking runs first and only needs the live price, so neither
    /// the cooldown nor a failed indicator fetch can starve closures.
    pub async fn run_cycle_at(&mut self, now: DateTime<Utc>) -> CycleReport {
        tracing::info!("🔄 [CYCLE] {} at {}", self.config.symbol, now.format("%H:%M:%S"));

        let mut report = CycleReport::default();

        report.price = match self.market.current_price(&self.config.price_symbol).await {
            Ok(price) => Some(price),
            Err(e) => {
                tracing::warn!("  ✗ Live price unavailable: {}", e);
                None
            }
        };

        if let Some(price) = report.price {
            report.closed = self.track_targets(price, now).await;
        }

        if let Err(e) = self.signal_path(report.price, now, &mut report).await {
            if e.is_data_unavailable() {
                tracing::warn!("  ✗ Signal path aborted: {}", e);
                report.degraded = true;
                let text = format!("❌ Could not fetch market data for {}: {}", self.config.symbol, e);
                self.notify(&text).await;
            } else {
                tracing::error!("  ✗ Signal path failed: {}", e);
            }
        }

        tracing::info!(
            open = self.tracker.len(),
            closed = report.closed.len(),
            emitted = report.emitted.is_some(),
            "Cycle complete"
        );

        report
    }

    /// Close signals that hit a target, notifying and journaling each one
    async fn track_targets(&mut self, price: Decimal, now: DateTime<Utc>) -> Vec<ClosedSignal> {
        let closed = self.tracker.check_targets(price);

        for closure in &closed {
            let signal = &closure.signal;
            let headline = match closure.outcome {
                Outcome::TakeProfit => "🎯 TAKE PROFIT",
                _ => "🛑 STOP LOSS",
            };
            let text = format!(
                "{} {} {}\nEntry: {:.2}\nExit: {:.2}\nTP: {:.2}\nSL: {:.2}",
                headline,
                signal.direction,
                self.config.symbol,
                signal.entry,
                closure.exit_price,
                signal.take_profit,
                signal.stop_loss
            );
            self.notify(&text).await;

            let record = SignalRecord::from_signal(signal, &self.config.symbol, closure.outcome, now);
            self.record(&record).await;
        }

        closed
    }

    async fn signal_path(
        &mut self,
        price: Option<Decimal>,
        now: DateTime<Utc>,
        report: &mut CycleReport,
    ) -> Result<()> {
        let price = price.ok_or_else(|| Error::unavailable("gold-api", "no live price"))?;

        let snapshot = self.build_snapshot(price).await?;
        log_snapshot(&snapshot);
        self.last_snapshot = Some(snapshot.clone());

        let decision = self.strategy.evaluate(&snapshot);
        report.decision = Some(decision);
        tracing::info!("  Signal: {:?}", decision);

        let Some(direction) = decision.direction() else {
            return Ok(());
        };

        if let Some(remaining) = self.cooldown.remaining(now) {
            tracing::info!(
                "  → {} suppressed by cooldown ({} min left)",
                direction,
                remaining.num_minutes()
            );
            report.suppressed = true;
            return Ok(());
        }

        let signal = Signal::from_atr(direction, price, snapshot.atr, self.config.risk_reward, now)?;
        self.emit(&signal, &snapshot, now).await;
        report.emitted = Some(signal);

        Ok(())
    }

    /// Announce, journal and start tracking a fired signal
    async fn emit(&mut self, signal: &Signal, snapshot: &IndicatorSnapshot, now: DateTime<Utc>) {
        let headline = match signal.direction {
            Direction::Long => "🟢 LONG",
            Direction::Short => "🔴 SHORT",
        };
        let mut text = format!(
            "{} {}\nEntry: {:.2}\nTP: {:.2}\nSL: {:.2}\nCCI: {:.2}\nATR: {:.2}",
            headline,
            self.config.symbol,
            signal.entry,
            signal.take_profit,
            signal.stop_loss,
            snapshot.cci,
            snapshot.atr
        );
        if let Some(dm) = snapshot.directional {
            text.push_str(&format!(
                "\nADX: {:.2} (+DI {:.2} / -DI {:.2})",
                dm.adx, dm.plus_di, dm.minus_di
            ));
        }
        if let Some(obv) = snapshot.obv {
            text.push_str(&format!("\nOBV: {:?}", obv));
        }
        self.notify(&text).await;

        let record = SignalRecord::from_signal(signal, &self.config.symbol, Outcome::Pending, now);
        self.record(&record).await;

        self.tracker.open(signal.clone());
        self.cooldown.mark(now);
    }

    /// Fetch candles and indicators and derive the snapshot for this cycle
    async fn build_snapshot(&self, price: Decimal) -> Result<IndicatorSnapshot> {
        let cfg = &self.config;

        let signal_candles = self
            .market
            .candles(&cfg.symbol, &cfg.signal_interval, cfg.candle_count)
            .await?;
        let trend_candles = self
            .market
            .candles(&cfg.symbol, &cfg.trend_interval, cfg.candle_count)
            .await?;

        let close_prices = with_live_price(&signal_candles.close, price);
        let ema = |period: usize| {
            calculate_ema(&close_prices, period).ok_or_else(|| {
                Error::unavailable(
                    format!("ema{}", period),
                    format!("need {} closes, got {}", period, close_prices.len()),
                )
            })
        };
        let ema_fast = ema(cfg.ema_fast)?;
        let ema_slow = ema(cfg.ema_slow)?;
        let ema_trend = ema(cfg.ema_trend)?;

        let trend_up_1h = is_uptrend(&trend_candles.close, cfg.ema_trend).ok_or_else(|| {
            Error::unavailable(
                format!("trend/{}", cfg.trend_interval),
                format!("need {} closes, got {}", cfg.ema_trend, trend_candles.len()),
            )
        })?;

        let cci = self.latest(IndicatorKind::Cci, Some(cfg.cci_period)).await?;
        let atr = self.latest(IndicatorKind::Atr, Some(cfg.atr_period)).await?;

        let requirements = self.strategy.requirements();

        let directional = if requirements.contains(&IndicatorKind::Adx) {
            Some(DirectionalMovement {
                adx: self.latest(IndicatorKind::Adx, Some(cfg.adx_period)).await?,
                plus_di: self.latest(IndicatorKind::PlusDi, Some(cfg.adx_period)).await?,
                minus_di: self.latest(IndicatorKind::MinusDi, Some(cfg.adx_period)).await?,
            })
        } else {
            None
        };

        let obv = if requirements.contains(&IndicatorKind::Obv) {
            let series = self
                .market
                .indicator(IndicatorKind::Obv, &cfg.symbol, &cfg.signal_interval, None)
                .await?;
            Some(
                ObvSlope::from_series(&series)
                    .ok_or_else(|| Error::unavailable("twelvedata/obv", "need two readings"))?,
            )
        } else {
            None
        };

        Ok(IndicatorSnapshot {
            close_prices,
            ema_fast,
            ema_slow,
            ema_trend,
            trend_up_1h,
            cci,
            atr,
            directional,
            obv,
        })
    }

    /// Latest value of a provider indicator on the signal timeframe
    async fn latest(&self, kind: IndicatorKind, period: Option<u32>) -> Result<Decimal> {
        let values = self
            .market
            .indicator(kind, &self.config.symbol, &self.config.signal_interval, period)
            .await?;
        values
            .last()
            .copied()
            .ok_or_else(|| Error::unavailable(format!("twelvedata/{}", kind), "empty series"))
    }

    /// Status summary sent on every heartbeat tick
    pub fn heartbeat_message(&self, now: DateTime<Utc>) -> String {
        let trend = match self.last_snapshot.as_ref().map(|s| s.trend_up_1h) {
            Some(true) => "⬆️ up",
            Some(false) => "⬇️ down",
            None => "unknown",
        };
        let adx = self
            .last_snapshot
            .as_ref()
            .and_then(|s| s.directional)
            .map(|dm| format!("{:.2}", dm.adx))
            .unwrap_or_else(|| "n/a".to_string());
        let cooldown = match self.cooldown.remaining(now) {
            Some(remaining) => format!("active ({} min left)", remaining.num_minutes().max(1)),
            None => "ready".to_string(),
        };

        let last_signal = self
            .cooldown
            .last_emitted()
            .map(|t| t.format("%H:%M UTC").to_string())
            .unwrap_or_else(|| "none".to_string());
        let (longs, shorts) = self.tracker.exposure();

        format!(
            "💓 Status {}\nH1 trend: {}\nADX: {}\nCooldown: {}\nLast signal: {}\nOpen signals: {} ({} long / {} short)\nStrategy: {}",
            self.config.symbol,
            trend,
            adx,
            cooldown,
            last_signal,
            self.tracker.len(),
            longs,
            shorts,
            self.strategy.name()
        )
    }

    pub async fn heartbeat(&self) {
        self.heartbeat_at(Utc::now()).await;
    }

    pub async fn heartbeat_at(&self, now: DateTime<Utc>) {
        tracing::info!("💓 [HEARTBEAT] {} open signal(s)", self.tracker.len());
        let text = self.heartbeat_message(now);
        self.notify(&text).await;
    }

    /// Best-effort delivery: failures are logged and dropped
    async fn notify(&self, text: &str) {
        if let Err(e) = self.notifier.send(&self.config.chat_id, text).await {
            tracing::warn!("  ✗ Notification failed: {}", e);
        }
    }

    /// Best-effort journal append: failures are logged and dropped
    async fn record(&self, record: &SignalRecord) {
        if let Err(e) = self.journal.append(record).await {
            tracing::warn!("  ✗ Failed to journal {} record: {}", record.outcome, e);
        }
    }
}

fn log_snapshot(snapshot: &IndicatorSnapshot) {
    tracing::info!(
        "  EMA fast {:.2} | slow {:.2} | trend {:.2} | H1 up: {}",
        snapshot.ema_fast,
        snapshot.ema_slow,
        snapshot.ema_trend,
        snapshot.trend_up_1h
    );
    tracing::info!("  CCI {:.2} | ATR {:.2}", snapshot.cci, snapshot.atr);
    if let Some(dm) = snapshot.directional {
        tracing::info!(
            "  ADX {:.2} | +DI {:.2} | -DI {:.2}",
            dm.adx,
            dm.plus_di,
            dm.minus_di
        );
    }
    if let Some(obv) = snapshot.obv {
        tracing::info!("  OBV {:?}", obv);
    }
}
