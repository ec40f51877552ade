//! Simple Moving Average (SMA).
//!
//! Unweighted mean of the trailing `window` values.

/// Mean of the last `window` values, or `None` when fewer are available.
pub fn moving_average(values: &[f64], window: usize) -> Option<f64> {
    if window == 0 || values.len() < window {
        return None;
    }
    let tail = &values[values.len() - window..];
    Some(tail.iter().sum::<f64>() / window as f64)
}
