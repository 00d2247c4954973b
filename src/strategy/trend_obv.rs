use super::{signals::trend_conditions, Strategy, StrategyConfig};
use crate::models::{Decision, IndicatorKind, IndicatorSnapshot, ObvSlope};

const REQUIREMENTS: &[IndicatorKind] = &[IndicatorKind::Cci, IndicatorKind::Atr, IndicatorKind::Obv];

/// Legacy trend-following strategy confirmed by volume flow
///
/// Uses the on-balance-volume slope instead of ADX/DI: LONG needs OBV rising,
/// SHORT needs OBV falling. A flat OBV confirms neither side. The H1 trend
/// filter applies to both sides.
#[derive(Debug, Clone, Default)]
pub struct TrendObvStrategy {
    config: StrategyConfig,
}

impl TrendObvStrategy {
    pub fn new(config: StrategyConfig) -> Self {
        Self { config }
    }
}

impl Strategy for TrendObvStrategy {
    fn evaluate(&self, snapshot: &IndicatorSnapshot) -> Decision {
        let Some(obv) = snapshot.obv else {
            return Decision::None;
        };

        let trend = trend_conditions(snapshot, &self.config);

        match (trend.long, trend.short, obv) {
            (true, false, ObvSlope::Rising) => Decision::Long,
            (false, true, ObvSlope::Falling) => Decision::Short,
            _ => Decision::None,
        }
    }

    fn name(&self) -> &str {
        "TrendObvStrategy"
    }

    fn requirements(&self) -> &[IndicatorKind] {
        REQUIREMENTS
    }
}
