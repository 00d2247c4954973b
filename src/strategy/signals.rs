use super::StrategyConfig;
use crate::models::IndicatorSnapshot;

/// Trend-following conditions common to every strategy
///
/// Each side holds only when all of its conditions hold: higher-timeframe trend,
/// fast/slow EMA order, close against the trend EMA and CCI away from the
/// exhaustion extreme. Equal values satisfy neither side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrendConditions {
    pub long: bool,
    pub short: bool,
}

pub fn trend_conditions(snapshot: &IndicatorSnapshot, config: &StrategyConfig) -> TrendConditions {
    let Some(last_close) = snapshot.last_close() else {
        return TrendConditions::default();
    };

    let long = snapshot.trend_up_1h
        && snapshot.ema_fast > snapshot.ema_slow
        && last_close > snapshot.ema_trend
        && snapshot.cci > config.cci_long_floor;

    let short = !snapshot.trend_up_1h
        && snapshot.ema_fast < snapshot.ema_slow
        && last_close < snapshot.ema_trend
        && snapshot.cci < config.cci_short_ceiling;

    TrendConditions { long, short }
}
