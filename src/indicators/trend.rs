use rust_decimal::Decimal;

use super::calculate_ema;

/// Copy of `closes` with the newest element replaced by the live quote
///
/// The provider's last candle is still forming, so the quoted price is the
/// better estimate of its close.
pub fn with_live_price(closes: &[Decimal], live_price: Decimal) -> Vec<Decimal> {
    let mut adjusted = closes.to_vec();
    if let Some(last) = adjusted.last_mut() {
        *last = live_price;
    }
    adjusted
}

/// Higher-timeframe trend filter: last close above its EMA
///
/// Returns None when the series is shorter than `period`.
pub fn is_uptrend(closes: &[Decimal], period: usize) -> Option<bool> {
    let ema = calculate_ema(closes, period)?;
    let last = closes.last()?;
    Some(*last > ema)
}
