use rust_decimal::Decimal;

/// Calculate Simple Moving Average (SMA) over the last `period` prices
pub fn calculate_sma(prices: &[Decimal], period: usize) -> Option<Decimal> {
    if period == 0 || prices.len() < period {
        return None;
    }

    let sum: Decimal = prices.iter().rev().take(period).sum();
    Some(sum / Decimal::from(period))
}

/// Calculate the full Exponential Moving Average (EMA) series
///
/// The first element is the SMA seed over `prices[..period]`, so the result has
/// `prices.len() - period + 1` values. Empty if there is not enough data.
pub fn calculate_ema_series(prices: &[Decimal], period: usize) -> Vec<Decimal> {
    if period == 0 || prices.len() < period {
        return Vec::new();
    }

    let multiplier = Decimal::TWO / Decimal::from(period + 1);

    // Start with SMA
    let Some(initial_sma) = calculate_sma(&prices[..period], period) else {
        return Vec::new();
    };

    let mut series = Vec::with_capacity(prices.len() - period + 1);
    let mut ema = initial_sma;
    series.push(ema);
    for price in &prices[period..] {
        ema = (*price - ema) * multiplier + ema;
        series.push(ema);
    }

    series
}

/// Calculate the latest Exponential Moving Average (EMA) value
pub fn calculate_ema(prices: &[Decimal], period: usize) -> Option<Decimal> {
    calculate_ema_series(prices, period).last().copied()
}
