// Technical indicators module
// EMA/SMA derivation and the higher-timeframe trend filter.
// CCI, ATR, ADX/DI and OBV come pre-computed from the market-data provider.

pub mod moving_average;
pub mod trend;

pub use moving_average::{calculate_ema, calculate_ema_series, calculate_sma};
pub use trend::{is_uptrend, with_live_price};
