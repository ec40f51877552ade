//! Short-horizon classifier — short MA crossover confirmed by RSI.
//!
//! A crossover always wins over the trend/strength sub-labels. RSI thresholds
//! (70 overbought, 30 oversold) and the ±2% daily move are fixed.

use serde::{Deserialize, Serialize};

use super::{
    crossed_down, crossed_up, percent_change, Classification, Classifier, ClassifierKind,
    SeriesInput, Signal,
};
use crate::domain::IndicatorSet;
use crate::indicators::compute_rsi;

pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;
/// Daily move, in percent, that upgrades a trend label to STRONG_UP / STRONG_DOWN.
pub const STRONG_MOVE_PCT: f64 = 2.0;

/// Labels emitted by the short-horizon classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShortSignal {
    StrongBuy,
    Buy,
    StrongSell,
    Sell,
    Overbought,
    StrongUp,
    Uptrend,
    Oversold,
    StrongDown,
    Downtrend,
    InsufficientData,
}

impl ShortSignal {
    pub fn code(&self) -> &'static str {
        match self {
            ShortSignal::StrongBuy => "STRONG_BUY",
            ShortSignal::Buy => "BUY",
            ShortSignal::StrongSell => "STRONG_SELL",
            ShortSignal::Sell => "SELL",
            ShortSignal::Overbought => "OVERBOUGHT",
            ShortSignal::StrongUp => "STRONG_UP",
            ShortSignal::Uptrend => "UPTREND",
            ShortSignal::Oversold => "OVERSOLD",
            ShortSignal::StrongDown => "STRONG_DOWN",
            ShortSignal::Downtrend => "DOWNTREND",
            ShortSignal::InsufficientData => "INSUFFICIENT_DATA",
        }
    }

    /// Inverse of [`code`](Self::code).
    pub fn from_code(code: &str) -> Option<Self> {
        [
            ShortSignal::StrongBuy,
            ShortSignal::Buy,
            ShortSignal::StrongSell,
            ShortSignal::Sell,
            ShortSignal::Overbought,
            ShortSignal::StrongUp,
            ShortSignal::Uptrend,
            ShortSignal::Oversold,
            ShortSignal::StrongDown,
            ShortSignal::Downtrend,
            ShortSignal::InsufficientData,
        ]
        .into_iter()
        .find(|s| s.code() == code)
    }

    pub fn describe(&self, window: usize) -> String {
        match self {
            ShortSignal::StrongBuy | ShortSignal::StrongSell => format!("MA{window} Cross + RSI"),
            ShortSignal::Buy | ShortSignal::Sell => format!("MA{window} Cross"),
            ShortSignal::Overbought | ShortSignal::StrongUp | ShortSignal::Uptrend => {
                format!("Above MA{window}")
            }
            ShortSignal::Oversold | ShortSignal::StrongDown | ShortSignal::Downtrend => {
                format!("Below MA{window}")
            }
            ShortSignal::InsufficientData => format!("fewer than {} samples", window + 1),
        }
    }
}

/// Classify price against the short MA with RSI confirmation.
///
/// Either MA absent yields `InsufficientData`. A missing RSI never blocks a
/// label; it only withholds the STRONG / OVERBOUGHT / OVERSOLD upgrades.
pub fn classify_short_horizon(
    current: f64,
    prev: f64,
    ma: Option<f64>,
    prev_ma: Option<f64>,
    rsi: Option<f64>,
) -> ShortSignal {
    let (Some(ma), Some(prev_ma)) = (ma, prev_ma) else {
        return ShortSignal::InsufficientData;
    };

    let change_pct = percent_change(current, prev);

    if crossed_up(current, prev, ma, prev_ma) {
        return match rsi {
            Some(r) if r < RSI_OVERBOUGHT => ShortSignal::StrongBuy,
            _ => ShortSignal::Buy,
        };
    }

    if crossed_down(current, prev, ma, prev_ma) {
        return match rsi {
            Some(r) if r > RSI_OVERSOLD => ShortSignal::StrongSell,
            _ => ShortSignal::Sell,
        };
    }

    if current > ma {
        match rsi {
            Some(r) if r >= RSI_OVERBOUGHT => ShortSignal::Overbought,
            _ if change_pct > STRONG_MOVE_PCT => ShortSignal::StrongUp,
            _ => ShortSignal::Uptrend,
        }
    } else {
        match rsi {
            Some(r) if r <= RSI_OVERSOLD => ShortSignal::Oversold,
            _ if change_pct < -STRONG_MOVE_PCT => ShortSignal::StrongDown,
            _ => ShortSignal::Downtrend,
        }
    }
}

/// `Classifier` strategy for the short-horizon rule.
#[derive(Debug, Clone)]
pub struct MomentumClassifier {
    pub window: usize,
    pub rsi_period: usize,
}

impl MomentumClassifier {
    pub fn new(window: usize, rsi_period: usize) -> Self {
        Self { window, rsi_period }
    }
}

impl Classifier for MomentumClassifier {
    fn kind(&self) -> ClassifierKind {
        ClassifierKind::ShortHorizon
    }

    fn warmup(&self) -> usize {
        self.window + 1
    }

    fn classify(&self, input: &SeriesInput<'_>) -> Classification {
        let ma = input.ma(self.window);
        let rsi = compute_rsi(input.prices(), self.rsi_period);
        let label = match (input.current(), input.previous()) {
            (Some(current), Some(prev)) => {
                classify_short_horizon(current, prev, ma, input.prev_ma(self.window), rsi)
            }
            _ => ShortSignal::InsufficientData,
        };

        Classification {
            signal: Signal::ShortHorizon(label),
            indicators: IndicatorSet {
                rsi,
                short_ma: ma,
                ..IndicatorSet::default()
            },
        }
    }
}
