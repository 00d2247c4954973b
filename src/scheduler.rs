use futures_util::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};

use crate::execution::SignalSession;

/// Drives a session on two fixed-period timers: evaluation and heartbeat
///
/// Both timers share one task, so a cycle and a heartbeat never run
/// concurrently and a slow cycle delays rather than overlaps the next one.
/// Missed ticks are skipped, not replayed.
pub struct Scheduler {
    session: SignalSession,
    poll_interval: Duration,
    heartbeat_interval: Duration,
}

impl Scheduler {
    pub fn new(session: SignalSession, poll_interval: Duration, heartbeat_interval: Duration) -> Self {
        Self {
            session,
            poll_interval,
            heartbeat_interval,
        }
    }

    /// Announce startup, run one cycle immediately, then tick until `shutdown` resolves
    ///
    /// Returns the session so callers can inspect the final state.
    pub async fn run_until<F>(mut self, shutdown: F) -> SignalSession
    where
        F: Future<Output = ()>,
    {
        self.session.startup().await;
        self.guarded_cycle().await;

        let start = Instant::now();
        let mut cycles = interval_at(start + self.poll_interval, self.poll_interval);
        cycles.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut heartbeats = interval_at(start + self.heartbeat_interval, self.heartbeat_interval);
        heartbeats.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            "⏱️  Evaluating every {}s, heartbeat every {}s",
            self.poll_interval.as_secs(),
            self.heartbeat_interval.as_secs()
        );

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("⚠️  Shutdown requested, stopping scheduler");
                    break;
                }
                _ = cycles.tick() => self.guarded_cycle().await,
                _ = heartbeats.tick() => self.guarded_heartbeat().await,
            }
        }

        self.session
    }

    async fn guarded_cycle(&mut self) {
        match AssertUnwindSafe(self.session.run_cycle()).catch_unwind().await {
            Ok(report) => tracing::debug!(?report, "Cycle finished"),
            Err(panic) => tracing::error!("❌ Evaluation cycle panicked: {}", panic_message(&*panic)),
        }
    }

    async fn guarded_heartbeat(&mut self) {
        if let Err(panic) = AssertUnwindSafe(self.session.heartbeat()).catch_unwind().await {
            tracing::error!("❌ Heartbeat panicked: {}", panic_message(&*panic));
        }
    }
}

/// Resolve when `signal` fires; if the listener itself fails, never resolve
pub async fn wait_for_shutdown<F, E>(signal: F)
where
    F: Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    if let Err(e) = signal.await {
        tracing::error!("Failed to listen for shutdown signal, running until killed: {}", e);
        std::future::pending::<()>().await;
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
