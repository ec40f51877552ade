//! Long-horizon classifier — price crossing the long moving average.
//!
//! BUY on a cross above the MA, SELL on a cross below it. Without a cross the
//! label is the side of the MA the price sits on. Crossovers win over the
//! steady-state trend labels.

use serde::{Deserialize, Serialize};

use super::{crossed_down, crossed_up, Classification, Classifier, ClassifierKind, SeriesInput, Signal};
use crate::domain::IndicatorSet;

/// Labels emitted by the long-horizon classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LongSignal {
    Buy,
    Sell,
    Uptrend,
    Downtrend,
    InsufficientData,
}

impl LongSignal {
    pub fn code(&self) -> &'static str {
        match self {
            LongSignal::Buy => "BUY",
            LongSignal::Sell => "SELL",
            LongSignal::Uptrend => "UPTREND",
            LongSignal::Downtrend => "DOWNTREND",
            LongSignal::InsufficientData => "INSUFFICIENT_DATA",
        }
    }

    /// Inverse of [`code`](Self::code).
    pub fn from_code(code: &str) -> Option<Self> {
        [
            LongSignal::Buy,
            LongSignal::Sell,
            LongSignal::Uptrend,
            LongSignal::Downtrend,
            LongSignal::InsufficientData,
        ]
        .into_iter()
        .find(|s| s.code() == code)
    }

    pub fn describe(&self, window: usize) -> String {
        match self {
            LongSignal::Buy => format!("Cross Above MA{window}"),
            LongSignal::Sell => format!("Cross Below MA{window}"),
            LongSignal::Uptrend => format!("Above MA{window}"),
            LongSignal::Downtrend => format!("Below MA{window}"),
            LongSignal::InsufficientData => format!("fewer than {} samples", window + 1),
        }
    }
}

/// Classify price against the long MA.
///
/// `ma` and `prev_ma` are the same-window MA at the current and previous
/// sample. Either one absent yields `InsufficientData`.
pub fn classify_long_horizon(
    current: f64,
    prev: f64,
    ma: Option<f64>,
    prev_ma: Option<f64>,
) -> LongSignal {
    let (Some(ma), Some(prev_ma)) = (ma, prev_ma) else {
        return LongSignal::InsufficientData;
    };

    if crossed_up(current, prev, ma, prev_ma) {
        return LongSignal::Buy;
    }
    if crossed_down(current, prev, ma, prev_ma) {
        return LongSignal::Sell;
    }
    if current > ma {
        LongSignal::Uptrend
    } else {
        LongSignal::Downtrend
    }
}

/// `Classifier` strategy for the long-horizon rule.
#[derive(Debug, Clone)]
pub struct MaCrossClassifier {
    pub window: usize,
}

impl MaCrossClassifier {
    pub fn new(window: usize) -> Self {
        Self { window }
    }
}

impl Classifier for MaCrossClassifier {
    fn kind(&self) -> ClassifierKind {
        ClassifierKind::LongHorizon
    }

    fn warmup(&self) -> usize {
        self.window + 1
    }

    fn classify(&self, input: &SeriesInput<'_>) -> Classification {
        let ma = input.ma(self.window);
        let label = match (input.current(), input.previous()) {
            (Some(current), Some(prev)) => {
                classify_long_horizon(current, prev, ma, input.prev_ma(self.window))
            }
            _ => LongSignal::InsufficientData,
        };

        Classification {
            signal: Signal::LongHorizon(label),
            indicators: IndicatorSet {
                long_ma: ma,
                ..IndicatorSet::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_code_inverts_code() {
        for s in [LongSignal::Buy, LongSignal::Downtrend, LongSignal::InsufficientData] {
            assert_eq!(LongSignal::from_code(s.code()), Some(s));
        }
        assert_eq!(LongSignal::from_code("STRONG_BUY"), None);
    }

    #[test]
    fn absent_ma_is_insufficient() {
        assert_eq!(
            classify_long_horizon(10.0, 9.0, None, Some(9.5)),
            LongSignal::InsufficientData
        );
        assert_eq!(
            classify_long_horizon(10.0, 9.0, Some(9.5), None),
            LongSignal::InsufficientData
        );
    }

    #[test]
    fn cross_above_is_buy() {
        assert_eq!(
            classify_long_horizon(105.0, 95.0, Some(100.0), Some(100.0)),
            LongSignal::Buy
        );
    }

    #[test]
    fn cross_below_is_sell() {
        assert_eq!(
            classify_long_horizon(95.0, 105.0, Some(100.0), Some(100.0)),
            LongSignal::Sell
        );
    }

    #[test]
    fn tie_on_previous_ma_counts_as_cross() {
        assert_eq!(
            classify_long_horizon(101.0, 100.0, Some(100.5), Some(100.0)),
            LongSignal::Buy
        );
        assert_eq!(
            classify_long_horizon(99.0, 100.0, Some(99.5), Some(100.0)),
            LongSignal::Sell
        );
    }

    #[test]
    fn steady_state_trend() {
        assert_eq!(
            classify_long_horizon(110.0, 108.0, Some(100.0), Some(100.0)),
            LongSignal::Uptrend
        );
        assert_eq!(
            classify_long_horizon(90.0, 92.0, Some(100.0), Some(100.0)),
            LongSignal::Downtrend
        );
        // Price exactly on the MA without a cross is not above it.
        assert_eq!(
            classify_long_horizon(100.0, 100.0, Some(100.0), Some(100.0)),
            LongSignal::Downtrend
        );
    }

    #[test]
    fn strategy_needs_window_plus_one() {
        let c = MaCrossClassifier::new(200);
        let prices: Vec<f64> = (0..200).map(|i| 100.0 + i as f64).collect();
        let out = c.classify(&SeriesInput::new(&prices));
        assert_eq!(out.signal, Signal::LongHorizon(LongSignal::InsufficientData));
        // MA itself is present at exactly 200 samples.
        assert!(out.indicators.long_ma.is_some());

        let prices: Vec<f64> = (0..201).map(|i| 100.0 + i as f64).collect();
        let out = c.classify(&SeriesInput::new(&prices));
        assert_eq!(out.signal, Signal::LongHorizon(LongSignal::Uptrend));
    }

    #[test]
    fn strategy_detects_cross_from_series() {
        // MA(3) over [10,10,10,10] = 10; last price jumps to 20.
        // prev = 10 <= prev_ma 10, current 20 > ma(10,10,20)=13.33 → BUY
        let prices = [10.0, 10.0, 10.0, 10.0, 20.0];
        let out = MaCrossClassifier::new(3).classify(&SeriesInput::new(&prices));
        assert_eq!(out.signal, Signal::LongHorizon(LongSignal::Buy));
    }

    #[test]
    fn empty_series_is_insufficient() {
        let out = MaCrossClassifier::new(3).classify(&SeriesInput::new(&[]));
        assert_eq!(out.signal, Signal::LongHorizon(LongSignal::InsufficientData));
        assert_eq!(out.indicators.long_ma, None);
    }
}
