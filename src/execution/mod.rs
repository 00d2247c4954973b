// Signal lifecycle: evaluation cycles and open-signal tracking
pub mod position_tracker;
pub mod session;

pub use position_tracker::{ClosedSignal, PositionTracker};
pub use session::{CycleReport, SessionConfig, SessionDeps, SignalSession};
