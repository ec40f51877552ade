//! Tunable indicator parameters shared by every classifier.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_MA_WINDOW: usize = 200;
pub const DEFAULT_SHORT_MA_WINDOW: usize = 20;
pub const DEFAULT_FAST_EMA_PERIOD: usize = 12;
pub const DEFAULT_SLOW_EMA_PERIOD: usize = 26;
pub const DEFAULT_SMOOTHING_PERIOD: usize = 1;

/// Invalid parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("{name} must be >= 1 (got {value})")]
    ZeroPeriod { name: &'static str, value: usize },
}

/// Periods and windows passed into the indicator library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorParams {
    pub rsi_period: usize,
    /// Long moving-average window (MA200 by default).
    pub ma_window: usize,
    /// Short moving-average window used by the short-horizon classifier.
    pub short_ma_window: usize,
    pub fast_ema_period: usize,
    pub slow_ema_period: usize,
    pub smoothing_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_period: DEFAULT_RSI_PERIOD,
            ma_window: DEFAULT_MA_WINDOW,
            short_ma_window: DEFAULT_SHORT_MA_WINDOW,
            fast_ema_period: DEFAULT_FAST_EMA_PERIOD,
            slow_ema_period: DEFAULT_SLOW_EMA_PERIOD,
            smoothing_period: DEFAULT_SMOOTHING_PERIOD,
        }
    }
}

impl IndicatorParams {
    /// Reject zero periods. Every indicator is undefined for a zero window.
    pub fn validate(&self) -> Result<(), ParamError> {
        let checks = [
            ("rsi_period", self.rsi_period),
            ("ma_window", self.ma_window),
            ("short_ma_window", self.short_ma_window),
            ("fast_ema_period", self.fast_ema_period),
            ("slow_ema_period", self.slow_ema_period),
            ("smoothing_period", self.smoothing_period),
        ];
        for (name, value) in checks {
            if value == 0 {
                return Err(ParamError::ZeroPeriod { name, value });
            }
        }
        Ok(())
    }

    /// Minimum series length for the CDC ActionZone classifier.
    pub fn action_zone_warmup(&self) -> usize {
        self.fast_ema_period.max(self.slow_ema_period) + self.smoothing_period
    }

    /// Longest history any classifier can use, in samples.
    pub fn max_lookback(&self) -> usize {
        (self.ma_window + 1)
            .max(self.short_ma_window + 1)
            .max(self.rsi_period + 1)
            .max(self.action_zone_warmup())
    }
}
