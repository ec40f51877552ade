//! Signal classifiers.
//!
//! Three independent, stateless rule engines map indicator state to a
//! discrete label:
//! - `long_horizon`: price vs. the long moving average (MA200 crossover)
//! - `short_horizon`: price vs. the short moving average, confirmed by RSI
//! - `action_zone`: dual-EMA trend zones (CDC ActionZone)
//!
//! Each is available as a pure rule function taking explicit current and
//! previous values, and as a `Classifier` strategy that derives those values
//! from a `SeriesInput`. `ClassifierKind` is the closed set the orchestrator
//! selects from.

pub mod action_zone;
pub mod long_horizon;
pub mod short_horizon;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::IndicatorSet;
use crate::indicators::{moving_average, previous_window};
use crate::params::IndicatorParams;

pub use action_zone::{classify_action_zone, zone_for, ActionZone, ActionZoneClassifier, Zone};
pub use long_horizon::{classify_long_horizon, LongSignal, MaCrossClassifier};
pub use short_horizon::{classify_short_horizon, MomentumClassifier, ShortSignal};

// ─── Input contract ──────────────────────────────────────────────────

/// Common input for every classifier: the full price series, oldest first.
///
/// "Previous" values are derived from the series itself (the sample before
/// the last one), so classifiers keep no memory between calls.
#[derive(Debug, Clone, Copy)]
pub struct SeriesInput<'a> {
    prices: &'a [f64],
}

impl<'a> SeriesInput<'a> {
    pub fn new(prices: &'a [f64]) -> Self {
        Self { prices }
    }

    pub fn prices(&self) -> &'a [f64] {
        self.prices
    }

    pub fn current(&self) -> Option<f64> {
        self.prices.last().copied()
    }

    /// Second-to-last price, or the last one for a single-sample series.
    pub fn previous(&self) -> Option<f64> {
        match self.prices.len() {
            0 => None,
            1 => self.current(),
            n => Some(self.prices[n - 2]),
        }
    }

    /// SMA over the trailing `window` prices.
    pub fn ma(&self, window: usize) -> Option<f64> {
        moving_average(self.prices, window)
    }

    /// SMA over the trailing `window` prices as of the previous sample.
    pub fn prev_ma(&self, window: usize) -> Option<f64> {
        moving_average(previous_window(self.prices), window)
    }
}

// ─── Classifier strategy ─────────────────────────────────────────────

/// Output of a classifier: its label plus the indicator values it computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub signal: Signal,
    pub indicators: IndicatorSet,
}

/// A stateless classification strategy.
pub trait Classifier: Send + Sync {
    fn kind(&self) -> ClassifierKind;

    /// Minimum number of prices for a label other than `INSUFFICIENT_DATA`.
    fn warmup(&self) -> usize;

    fn classify(&self, input: &SeriesInput<'_>) -> Classification;
}

/// Unrecognized classifier name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown classifier '{0}' (valid: long_horizon, short_horizon, action_zone)")]
pub struct UnknownClassifier(pub String);

/// The closed set of classifier strategies.
///
/// Serialized as the snake_case name; deserialization goes through `FromStr`
/// so config files accept the same aliases as the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum ClassifierKind {
    /// Price vs. long MA crossover (MA200 by default).
    LongHorizon,
    /// Price vs. short MA crossover with RSI confirmation (MA20 by default).
    ShortHorizon,
    /// Dual-EMA trend zones (CDC ActionZone).
    ActionZone,
}

impl ClassifierKind {
    pub const ALL: [ClassifierKind; 3] = [
        ClassifierKind::LongHorizon,
        ClassifierKind::ShortHorizon,
        ClassifierKind::ActionZone,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierKind::LongHorizon => "long_horizon",
            ClassifierKind::ShortHorizon => "short_horizon",
            ClassifierKind::ActionZone => "action_zone",
        }
    }

    /// Construct the strategy for this kind with the given parameters.
    pub fn build(&self, params: &IndicatorParams) -> Box<dyn Classifier> {
        match self {
            ClassifierKind::LongHorizon => Box::new(MaCrossClassifier::new(params.ma_window)),
            ClassifierKind::ShortHorizon => Box::new(MomentumClassifier::new(
                params.short_ma_window,
                params.rsi_period,
            )),
            ClassifierKind::ActionZone => Box::new(ActionZoneClassifier::new(
                params.fast_ema_period,
                params.slow_ema_period,
                params.smoothing_period,
            )),
        }
    }
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassifierKind {
    type Err = UnknownClassifier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "long_horizon" | "ma200" | "long" => Ok(ClassifierKind::LongHorizon),
            "short_horizon" | "ma20" | "short" => Ok(ClassifierKind::ShortHorizon),
            "action_zone" | "cdc" | "cdc_action_zone" => Ok(ClassifierKind::ActionZone),
            _ => Err(UnknownClassifier(s.to_string())),
        }
    }
}

impl TryFrom<String> for ClassifierKind {
    type Error = UnknownClassifier;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

// ─── Signal ──────────────────────────────────────────────────────────

/// A label tagged with the classifier that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "classifier", content = "label", rename_all = "snake_case")]
pub enum Signal {
    LongHorizon(LongSignal),
    ShortHorizon(ShortSignal),
    ActionZone(Zone),
}

impl Signal {
    pub fn kind(&self) -> ClassifierKind {
        match self {
            Signal::LongHorizon(_) => ClassifierKind::LongHorizon,
            Signal::ShortHorizon(_) => ClassifierKind::ShortHorizon,
            Signal::ActionZone(_) => ClassifierKind::ActionZone,
        }
    }

    /// Stable label code, e.g. `STRONG_BUY` or `PRE_SELL_1`.
    pub fn code(&self) -> &'static str {
        match self {
            Signal::LongHorizon(s) => s.code(),
            Signal::ShortHorizon(s) => s.code(),
            Signal::ActionZone(z) => z.code(),
        }
    }

    /// Human-readable explanation for reports.
    pub fn describe(&self, params: &IndicatorParams) -> String {
        match self {
            Signal::LongHorizon(s) => s.describe(params.ma_window),
            Signal::ShortHorizon(s) => s.describe(params.short_ma_window),
            Signal::ActionZone(z) => z.describe().to_string(),
        }
    }

    pub fn is_insufficient_data(&self) -> bool {
        match self {
            Signal::LongHorizon(s) => *s == LongSignal::InsufficientData,
            Signal::ShortHorizon(s) => *s == ShortSignal::InsufficientData,
            Signal::ActionZone(z) => *z == Zone::InsufficientData,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// `(current - previous) / previous * 100`, or 0 when the previous price is 0.
pub(crate) fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        0.0
    } else {
        (current - previous) / previous * 100.0
    }
}

/// Price moved from at-or-below the MA to strictly above it.
pub(crate) fn crossed_up(current: f64, prev: f64, ma: f64, prev_ma: f64) -> bool {
    prev <= prev_ma && current > ma
}

/// Price moved from at-or-above the MA to strictly below it.
pub(crate) fn crossed_down(current: f64, prev: f64, ma: f64, prev_ma: f64) -> bool {
    prev >= prev_ma && current < ma
}
