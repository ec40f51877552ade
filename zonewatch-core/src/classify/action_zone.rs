//! CDC ActionZone — dual-EMA trend zones.
//!
//! Bull when the fast EMA is above the slow EMA, Bear when below. The zone
//! then depends on where the (optionally smoothed) price sits relative to the
//! two averages. Rules are checked in a fixed order; the first match wins and
//! equal EMAs always fall through to NEUTRAL.

use serde::{Deserialize, Serialize};

use super::{Classification, Classifier, ClassifierKind, SeriesInput, Signal};
use crate::domain::IndicatorSet;
use crate::indicators::{exponential_moving_average, smooth_series};

/// Trend zone labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "SELL")]
    Sell,
    #[serde(rename = "PRE_BUY_1")]
    PreBuy1,
    #[serde(rename = "PRE_BUY_2")]
    PreBuy2,
    #[serde(rename = "PRE_SELL_1")]
    PreSell1,
    #[serde(rename = "PRE_SELL_2")]
    PreSell2,
    #[serde(rename = "NEUTRAL")]
    Neutral,
    #[serde(rename = "INSUFFICIENT_DATA")]
    InsufficientData,
}

impl Zone {
    pub fn code(&self) -> &'static str {
        match self {
            Zone::Buy => "BUY",
            Zone::Sell => "SELL",
            Zone::PreBuy1 => "PRE_BUY_1",
            Zone::PreBuy2 => "PRE_BUY_2",
            Zone::PreSell1 => "PRE_SELL_1",
            Zone::PreSell2 => "PRE_SELL_2",
            Zone::Neutral => "NEUTRAL",
            Zone::InsufficientData => "INSUFFICIENT_DATA",
        }
    }

    /// Zone meaning, with the conventional ActionZone bar colour.
    pub fn describe(&self) -> &'static str {
        match self {
            Zone::Buy => "Bull, price above fast EMA (green)",
            Zone::PreBuy2 => "Bear, price above both EMAs (blue)",
            Zone::PreBuy1 => "Bear, price between EMAs (light blue)",
            Zone::Sell => "Bear, price below fast EMA (red)",
            Zone::PreSell2 => "Bull, price below both EMAs (orange)",
            Zone::PreSell1 => "Bull, price between EMAs (yellow)",
            Zone::Neutral => "No trend",
            Zone::InsufficientData => "not enough history",
        }
    }
}

/// Zone plus the averages it was derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionZone {
    pub zone: Zone,
    pub fast_ma: Option<f64>,
    pub slow_ma: Option<f64>,
    pub x_price: Option<f64>,
}

impl ActionZone {
    fn insufficient() -> Self {
        Self {
            zone: Zone::InsufficientData,
            fast_ma: None,
            slow_ma: None,
            x_price: None,
        }
    }
}

/// Zone rule table.
pub fn zone_for(fast_ma: f64, slow_ma: f64, x_price: f64) -> Zone {
    let bull = fast_ma > slow_ma;
    let bear = fast_ma < slow_ma;

    if bull && x_price > fast_ma {
        Zone::Buy
    } else if bear && x_price > fast_ma && x_price > slow_ma {
        Zone::PreBuy2
    } else if bear && x_price > fast_ma && x_price < slow_ma {
        Zone::PreBuy1
    } else if bear && x_price < fast_ma {
        Zone::Sell
    } else if bull && x_price < fast_ma && x_price < slow_ma {
        Zone::PreSell2
    } else if bull && x_price < fast_ma && x_price > slow_ma {
        Zone::PreSell1
    } else {
        Zone::Neutral
    }
}

/// Classify the full price series into a trend zone.
///
/// Needs at least `max(fast, slow) + smoothing` prices; otherwise every output
/// is absent and the zone is `InsufficientData`. The EMAs run over the raw
/// series; only the reference price is smoothed.
pub fn classify_action_zone(
    prices: &[f64],
    fast_period: usize,
    slow_period: usize,
    smoothing_period: usize,
) -> ActionZone {
    if prices.len() < fast_period.max(slow_period) + smoothing_period {
        return ActionZone::insufficient();
    }

    let x_price = if smoothing_period > 1 {
        smooth_series(prices, smoothing_period).last().copied()
    } else {
        prices.last().copied()
    };
    let fast_ma = exponential_moving_average(prices, fast_period);
    let slow_ma = exponential_moving_average(prices, slow_period);

    let (Some(fast), Some(slow), Some(x)) = (fast_ma, slow_ma, x_price) else {
        // Only reachable with a zero period.
        return ActionZone::insufficient();
    };

    ActionZone {
        zone: zone_for(fast, slow, x),
        fast_ma,
        slow_ma,
        x_price,
    }
}

/// `Classifier` strategy for CDC ActionZone.
#[derive(Debug, Clone)]
pub struct ActionZoneClassifier {
    pub fast_period: usize,
    pub slow_period: usize,
    pub smoothing_period: usize,
}

impl ActionZoneClassifier {
    pub fn new(fast_period: usize, slow_period: usize, smoothing_period: usize) -> Self {
        Self {
            fast_period,
            slow_period,
            smoothing_period,
        }
    }
}

impl Classifier for ActionZoneClassifier {
    fn kind(&self) -> ClassifierKind {
        ClassifierKind::ActionZone
    }

    fn warmup(&self) -> usize {
        self.fast_period.max(self.slow_period) + self.smoothing_period
    }

    fn classify(&self, input: &SeriesInput<'_>) -> Classification {
        let az = classify_action_zone(
            input.prices(),
            self.fast_period,
            self.slow_period,
            self.smoothing_period,
        );
        Classification {
            signal: Signal::ActionZone(az.zone),
            indicators: IndicatorSet {
                fast_ema: az.fast_ma,
                slow_ema: az.slow_ma,
                smoothed_price: az.x_price,
                ..IndicatorSet::default()
            },
        }
    }
}
