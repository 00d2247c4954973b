use chrono::{DateTime, Duration, Utc};

/// Minimum spacing between two emitted signals
///
/// Suppresses new signals for `window` after the last emission, regardless of
/// what the strategy says. Cycles fire on ticks but are stamped when they
/// actually start, so a cycle due exactly at the window end may run slightly
/// early relative to a late emission. `tolerance` absorbs that jitter: the
/// window counts as over once less than `tolerance` of it remains.
#[derive(Debug, Clone)]
pub struct Cooldown {
    window: Duration,
    tolerance: Duration,
    last_emitted: Option<DateTime<Utc>>,
}

impl Default for Cooldown {
    fn default() -> Self {
        Self::new(Duration::minutes(30))
    }
}

impl Cooldown {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            tolerance: Duration::zero(),
            last_emitted: None,
        }
    }

    /// Treat the window as elapsed once less than `tolerance` remains
    pub fn with_tolerance(mut self, tolerance: Duration) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn last_emitted(&self) -> Option<DateTime<Utc>> {
        self.last_emitted
    }

    /// True while a new signal must be suppressed
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.remaining(now).is_some()
    }

    /// Time left before the next signal may be emitted
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        let ready_at = self.last_emitted? + self.window;
        (now + self.tolerance < ready_at).then(|| ready_at - now)
    }

    /// Record an emitted signal
    pub fn mark(&mut self, now: DateTime<Utc>) {
        self.last_emitted = Some(now);
    }
}
