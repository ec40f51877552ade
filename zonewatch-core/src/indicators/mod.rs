//! Indicator library.
//!
//! Every indicator is a pure function over a slice of prices, oldest first.
//! Too little history returns `None`, which is a normal outcome and not an
//! error; callers decide what an absent value means for them.

pub mod ema;
pub mod rsi;
pub mod sma;

pub use ema::{ema_series, exponential_moving_average, smooth_series};
pub use rsi::compute_rsi;
pub use sma::moving_average;

/// Drop the most recent sample.
///
/// Classifiers compare today's indicator value with yesterday's; yesterday's
/// value is the same indicator computed over the series without its last
/// element.
pub fn previous_window(values: &[f64]) -> &[f64] {
    match values.split_last() {
        Some((_, rest)) => rest,
        None => values,
    }
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn previous_window_drops_last() {
        assert_eq!(previous_window(&[1.0, 2.0, 3.0]), &[1.0, 2.0]);
        assert_eq!(previous_window(&[1.0]), &[] as &[f64]);
        assert_eq!(previous_window(&[]), &[] as &[f64]);
    }
}
