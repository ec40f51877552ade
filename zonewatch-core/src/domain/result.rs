//! Per-asset results produced once per run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::{ClassifierKind, Signal};

/// Indicator values for one asset at the most recent sample.
///
/// `None` means the series was too short for that window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub rsi: Option<f64>,
    pub long_ma: Option<f64>,
    pub short_ma: Option<f64>,
    pub fast_ema: Option<f64>,
    pub slow_ema: Option<f64>,
    pub smoothed_price: Option<f64>,
}

impl IndicatorSet {
    /// Fill fields that are absent here from `other`. Present values win.
    pub fn merge(self, other: IndicatorSet) -> IndicatorSet {
        IndicatorSet {
            rsi: self.rsi.or(other.rsi),
            long_ma: self.long_ma.or(other.long_ma),
            short_ma: self.short_ma.or(other.short_ma),
            fast_ema: self.fast_ema.or(other.fast_ema),
            slow_ema: self.slow_ema.or(other.slow_ema),
            smoothed_price: self.smoothed_price.or(other.smoothed_price),
        }
    }
}

/// Snapshot of one evaluated asset. Created once, never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetResult {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub vs_currency: String,
    pub timestamp_utc: DateTime<Utc>,
    pub current_price: f64,
    pub rsi_period: usize,
    pub ma_window: usize,
    pub indicators: IndicatorSet,
    /// One signal per selected classifier, in configured order.
    pub signals: Vec<Signal>,
}

impl AssetResult {
    /// Signal produced by the given classifier, if it ran.
    pub fn signal(&self, kind: ClassifierKind) -> Option<&Signal> {
        self.signals.iter().find(|s| s.kind() == kind)
    }
}

/// An asset whose price series could not be obtained during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetFailure {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub error: String,
    pub timestamp_utc: DateTime<Utc>,
}

/// Per-asset outcome of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssetEntry {
    Evaluated(AssetResult),
    Failed(AssetFailure),
}

impl AssetEntry {
    pub fn id(&self) -> &str {
        match self {
            AssetEntry::Evaluated(r) => &r.id,
            AssetEntry::Failed(f) => &f.id,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            AssetEntry::Evaluated(r) => &r.symbol,
            AssetEntry::Failed(f) => &f.symbol,
        }
    }

    pub fn as_result(&self) -> Option<&AssetResult> {
        match self {
            AssetEntry::Evaluated(r) => Some(r),
            AssetEntry::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, AssetEntry::Failed(_))
    }
}
