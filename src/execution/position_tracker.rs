use rust_decimal::Decimal;

use crate::models::{Direction, Outcome, Signal};

/// A signal removed from the open set because a target was hit
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedSignal {
    pub signal: Signal,
    pub outcome: Outcome,
    pub exit_price: Decimal,
}

/// Open virtual positions, in insertion order
///
/// Holds no I/O: the session notifies and journals around `open` and
/// `check_targets`. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct PositionTracker {
    open: Vec<Signal>,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, signal: Signal) {
        tracing::info!(
            direction = %signal.direction,
            entry = %signal.entry,
            take_profit = %signal.take_profit,
            stop_loss = %signal.stop_loss,
            "Tracking new signal"
        );
        self.open.push(signal);
    }

    /// Close every open signal whose take-profit or stop-loss `price` has reached
    ///
    /// Walks the set newest first so removal never shifts an unvisited index.
    /// Returned closures follow the same order.
    pub fn check_targets(&mut self, price: Decimal) -> Vec<ClosedSignal> {
        let mut closed = Vec::new();

        for i in (0..self.open.len()).rev() {
            if let Some(outcome) = self.open[i].outcome_at(price) {
                let signal = self.open.remove(i);
                tracing::info!(
                    direction = %signal.direction,
                    entry = %signal.entry,
                    exit = %price,
                    outcome = %outcome,
                    "Signal closed"
                );
                closed.push(ClosedSignal {
                    signal,
                    outcome,
                    exit_price: price,
                });
            }
        }

        closed
    }

    pub fn open_signals(&self) -> &[Signal] {
        &self.open
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// Count of open signals per direction as (long, short)
    pub fn exposure(&self) -> (usize, usize) {
        let longs = self
            .open
            .iter()
            .filter(|s| s.direction == Direction::Long)
            .count();
        (longs, self.open.len() - longs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn long_2000() -> Signal {
        Signal::new(
            Direction::Long,
            Decimal::from(2000),
            Decimal::from(2020),
            Decimal::from(1990),
            Utc::now(),
        )
        .unwrap()
    }

    fn short_2000() -> Signal {
        Signal::new(
            Direction::Short,
            Decimal::from(2000),
            Decimal::from(1980),
            Decimal::from(2010),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_long_take_profit() {
        let mut tracker = PositionTracker::new();
        tracker.open(long_2000());

        let closed = tracker.check_targets(Decimal::from(2021));

        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].outcome, Outcome::TakeProfit);
        assert_eq!(closed[0].exit_price, Decimal::from(2021));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_long_stop_loss() {
        let mut tracker = PositionTracker::new();
        tracker.open(long_2000());

        let closed = tracker.check_targets(Decimal::from(1989));

        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].outcome, Outcome::StopLoss);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_long_between_targets_stays_open() {
        let mut tracker = PositionTracker::new();
        tracker.open(long_2000());

        let closed = tracker.check_targets(Decimal::from(2005));

        assert!(closed.is_empty());
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_targets_are_inclusive() {
        let mut tracker = PositionTracker::new();
        tracker.open(long_2000());
        tracker.open(short_2000());

        // Exactly at the long TP and beyond the short SL
        let closed = tracker.check_targets(Decimal::from(2020));

        assert_eq!(closed.len(), 2);
        assert_eq!(closed[0].signal.direction, Direction::Short);
        assert_eq!(closed[0].outcome, Outcome::StopLoss);
        assert_eq!(closed[1].signal.direction, Direction::Long);
        assert_eq!(closed[1].outcome, Outcome::TakeProfit);
    }

    #[test]
    fn test_short_take_profit() {
        let mut tracker = PositionTracker::new();
        tracker.open(short_2000());

        let closed = tracker.check_targets(Decimal::from(1979));

        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].outcome, Outcome::TakeProfit);
    }

    #[test]
    fn test_only_hit_signals_removed() {
        let mut tracker = PositionTracker::new();
        tracker.open(long_2000());
        let wide = Signal::new(
            Direction::Long,
            Decimal::from(2000),
            Decimal::from(2100),
            Decimal::from(1900),
            Utc::now(),
        )
        .unwrap();
        tracker.open(wide.clone());
        tracker.open(long_2000());

        let closed = tracker.check_targets(Decimal::from(2030));

        assert_eq!(closed.len(), 2);
        assert_eq!(tracker.open_signals(), &[wide]);
    }

    #[test]
    fn test_exposure() {
        let mut tracker = PositionTracker::new();
        tracker.open(long_2000());
        tracker.open(short_2000());
        tracker.open(long_2000());

        assert_eq!(tracker.exposure(), (2, 1));
    }
}
