//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * value[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (period + 1).
//! Seed: EMA[period-1] = SMA of the first `period` values.
//!
//! The seed comes from the start of the series, so the final value depends on
//! the whole history supplied. Pass the full series for repeatable results.

/// Final EMA value over the whole series, or `None` when `values.len() < period`.
pub fn exponential_moving_average(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let seed = values[..period].iter().sum::<f64>() / period as f64;

    let ema = values[period..]
        .iter()
        .fold(seed, |prev, &v| v * alpha + prev * (1.0 - alpha));
    Some(ema)
}

/// Per-index EMA values. Indices before the seed are NaN.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let seed = values[..period].iter().sum::<f64>() / period as f64;
    result[period - 1] = seed;

    let mut prev = seed;
    for i in period..n {
        let ema = values[i] * alpha + prev * (1.0 - alpha);
        result[i] = ema;
        prev = ema;
    }

    result
}

/// EMA-smoothed copy of a series, same length as the input.
///
/// Indices without enough history for the seed (`i + 1 < period`) carry the
/// raw value through. `period <= 1` returns the input unchanged.
pub fn smooth_series(values: &[f64], period: usize) -> Vec<f64> {
    if period <= 1 {
        return values.to_vec();
    }
    ema_series(values, period)
        .into_iter()
        .zip(values)
        .map(|(smoothed, &raw)| if smoothed.is_nan() { raw } else { smoothed })
        .collect()
}
