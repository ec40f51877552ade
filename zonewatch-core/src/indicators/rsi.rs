//! Relative Strength Index (RSI).
//!
//! Uses Wilder smoothing of average gains and average losses.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Needs period + 1 closes.
//! Edge case: avg_loss == 0 → RSI = 100 (saturates, including a flat series).

/// RSI of the most recent close.
///
/// The seed averages come from the first `period` one-step changes; every
/// later change is folded in with Wilder's recurrence
/// `avg = (avg * (period - 1) + x) / period`. Returns `None` for a zero period
/// or fewer than `period + 1` closes.
pub fn compute_rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for pair in closes[..=period].windows(2) {
        let change = pair[1] - pair[0];
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss -= change;
        }
    }
    let n = period as f64;
    avg_gain /= n;
    avg_loss /= n;

    for pair in closes[period..].windows(2) {
        let change = pair[1] - pair[0];
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        avg_gain = (avg_gain * (n - 1.0) + gain) / n;
        avg_loss = (avg_loss * (n - 1.0) + loss) / n;
    }

    Some(rsi_from_averages(avg_gain, avg_loss))
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}
