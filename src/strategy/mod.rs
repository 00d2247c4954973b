// Trading strategy module
pub mod signals;
pub mod trend_adx;
pub mod trend_obv;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::{Decision, IndicatorKind, IndicatorSnapshot};

pub use signals::{trend_conditions, TrendConditions};
pub use trend_adx::TrendAdxStrategy;
pub use trend_obv::TrendObvStrategy;

/// Base trait for all signal strategies
pub trait Strategy: Send + Sync {
    /// Map the latest indicator snapshot to a trading decision
    ///
    /// Must be pure: no I/O, no state. Missing inputs yield `Decision::None`.
    fn evaluate(&self, snapshot: &IndicatorSnapshot) -> Decision;

    /// Get strategy name
    fn name(&self) -> &str;

    /// Provider indicators this strategy reads from the snapshot
    fn requirements(&self) -> &[IndicatorKind];
}

/// Thresholds shared by the rule-based strategies
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    /// Minimum ADX for a trend to count as established
    pub adx_min: Decimal,
    /// LONG requires CCI strictly above this value
    pub cci_long_floor: Decimal,
    /// SHORT requires CCI strictly below this value
    pub cci_short_ceiling: Decimal,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            adx_min: Decimal::from(20),
            cci_long_floor: Decimal::from(-100),
            cci_short_ceiling: Decimal::ONE_HUNDRED,
        }
    }
}

/// Strategy selected through configuration
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Trend + ADX/DI gate (reference)
    #[default]
    TrendAdx,
    /// Trend + OBV slope gate (legacy)
    TrendObv,
}

impl StrategyKind {
    pub fn build(self, config: StrategyConfig) -> Box<dyn Strategy> {
        match self {
            StrategyKind::TrendAdx => Box::new(TrendAdxStrategy::new(config)),
            StrategyKind::TrendObv => Box::new(TrendObvStrategy::new(config)),
        }
    }
}
