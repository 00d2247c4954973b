use super::{signals::trend_conditions, Strategy, StrategyConfig};
use crate::models::{Decision, IndicatorKind, IndicatorSnapshot};

const REQUIREMENTS: &[IndicatorKind] = &[
    IndicatorKind::Cci,
    IndicatorKind::Atr,
    IndicatorKind::Adx,
    IndicatorKind::PlusDi,
    IndicatorKind::MinusDi,
];

/// Trend-following strategy gated on trend strength
///
/// On top of the shared trend conditions a side only fires when:
/// - ADX is above `adx_min` (an established trend, not a range)
/// - the matching directional indicator dominates (+DI for LONG, -DI for SHORT)
#[derive(Debug, Clone, Default)]
pub struct TrendAdxStrategy {
    config: StrategyConfig,
}

impl TrendAdxStrategy {
    pub fn new(config: StrategyConfig) -> Self {
        Self { config }
    }
}

impl Strategy for TrendAdxStrategy {
    fn evaluate(&self, snapshot: &IndicatorSnapshot) -> Decision {
        let Some(dm) = snapshot.directional else {
            return Decision::None;
        };

        let trend = trend_conditions(snapshot, &self.config);
        let strong = dm.adx > self.config.adx_min;

        let long = trend.long && strong && dm.plus_di > dm.minus_di;
        let short = trend.short && strong && dm.minus_di > dm.plus_di;

        match (long, short) {
            (true, false) => Decision::Long,
            (false, true) => Decision::Short,
            _ => Decision::None,
        }
    }

    fn name(&self) -> &str {
        "TrendAdxStrategy"
    }

    fn requirements(&self) -> &[IndicatorKind] {
        REQUIREMENTS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::fixtures::{long_snapshot, short_snapshot};
    use rust_decimal::Decimal;

    fn strategy() -> TrendAdxStrategy {
        TrendAdxStrategy::default()
    }

    #[test]
    fn test_full_long_predicate() {
        assert_eq!(strategy().evaluate(&long_snapshot()), Decision::Long);
    }

    #[test]
    fn test_full_short_predicate() {
        assert_eq!(strategy().evaluate(&short_snapshot()), Decision::Short);
    }

    #[test]
    fn test_any_failed_long_condition_yields_none() {
        let breakers: [(&str, fn(&mut IndicatorSnapshot)); 6] = [
            ("h1 trend down", |s| s.trend_up_1h = false),
            ("weak adx", |s| s.directional.as_mut().unwrap().adx = Decimal::from(20)),
            ("-DI dominates", |s| {
                let dm = s.directional.as_mut().unwrap();
                dm.minus_di = dm.plus_di + Decimal::ONE;
            }),
            ("ema fast below slow", |s| s.ema_fast = s.ema_slow - Decimal::ONE),
            ("close under trend ema", |s| s.ema_trend = Decimal::from(2020)),
            ("cci oversold", |s| s.cci = Decimal::from(-150)),
        ];

        for (label, breaker) in breakers {
            let mut snapshot = long_snapshot();
            breaker(&mut snapshot);
            assert_eq!(strategy().evaluate(&snapshot), Decision::None, "{}", label);
        }
    }

    #[test]
    fn test_any_failed_short_condition_yields_none() {
        let breakers: [(&str, fn(&mut IndicatorSnapshot)); 6] = [
            ("h1 trend up", |s| s.trend_up_1h = true),
            ("weak adx", |s| s.directional.as_mut().unwrap().adx = Decimal::from(12)),
            ("DI tie", |s| {
                let dm = s.directional.as_mut().unwrap();
                dm.minus_di = dm.plus_di;
            }),
            ("ema fast above slow", |s| s.ema_fast = s.ema_slow + Decimal::ONE),
            ("close over trend ema", |s| s.ema_trend = Decimal::from(1980)),
            ("cci overbought", |s| s.cci = Decimal::from(140)),
        ];

        for (label, breaker) in breakers {
            let mut snapshot = short_snapshot();
            breaker(&mut snapshot);
            assert_eq!(strategy().evaluate(&snapshot), Decision::None, "{}", label);
        }
    }

    #[test]
    fn test_missing_directional_movement_yields_none() {
        let mut snapshot = long_snapshot();
        snapshot.directional = None;
        assert_eq!(strategy().evaluate(&snapshot), Decision::None);
    }

    #[test]
    fn test_ignores_obv() {
        let mut snapshot = long_snapshot();
        snapshot.obv = None;
        assert_eq!(strategy().evaluate(&snapshot), Decision::Long);
    }

    #[test]
    fn test_custom_adx_threshold() {
        let config = StrategyConfig {
            adx_min: Decimal::from(30),
            ..StrategyConfig::default()
        };
        // Fixture ADX is 28
        let strategy = TrendAdxStrategy::new(config);
        assert_eq!(strategy.evaluate(&long_snapshot()), Decision::None);
    }

    #[test]
    fn test_requirements() {
        let reqs = strategy().requirements().to_vec();
        assert!(reqs.contains(&IndicatorKind::Adx));
        assert!(reqs.contains(&IndicatorKind::PlusDi));
        assert!(reqs.contains(&IndicatorKind::MinusDi));
        assert!(!reqs.contains(&IndicatorKind::Obv));
    }
}
