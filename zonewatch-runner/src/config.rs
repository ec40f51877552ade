//! Watch configuration loaded from TOML or JSON.
//!
//! Legacy `coins.json`-style files are read as JSON; the format is chosen by
//! file extension. Every field except the asset list has
//! a default.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use zonewatch_core::{ClassifierKind, IndicatorParams, ParamError};

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("parse config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid parameter: {0}")]
    Param(#[from] ParamError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// One tracked asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSpec {
    /// Provider identifier, e.g. `bitcoin`.
    pub id: String,
    /// Ticker symbol. Legacy `coins.json` entries may omit it.
    #[serde(default)]
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl AssetSpec {
    pub fn new(id: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Display name; falls back to the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Upper-cased ticker symbol; the upper-cased id when none is set.
    pub fn display_symbol(&self) -> String {
        let symbol = self.symbol.trim();
        if symbol.is_empty() {
            self.id.to_uppercase()
        } else {
            symbol.to_uppercase()
        }
    }
}

/// Where the run writes its artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub summary_path: PathBuf,
    pub report_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            summary_path: PathBuf::from("data/summary.json"),
            report_path: PathBuf::from("REPORT.md"),
        }
    }
}

/// HTTP price provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.coingecko.com/api/v3".into(),
            timeout_secs: 60,
            max_retries: 3,
        }
    }
}

pub const DEFAULT_HISTORY_RETENTION: usize = 60;
pub const MIN_FETCH_DAYS: u32 = 250;

fn default_vs_currency() -> String {
    "usd".into()
}

fn default_history_retention() -> usize {
    DEFAULT_HISTORY_RETENTION
}

fn default_classifiers() -> Vec<ClassifierKind> {
    vec![ClassifierKind::LongHorizon, ClassifierKind::ShortHorizon]
}

fn default_rsi_period() -> usize {
    zonewatch_core::params::DEFAULT_RSI_PERIOD
}

fn default_ma_window() -> usize {
    zonewatch_core::params::DEFAULT_MA_WINDOW
}

fn default_short_ma_window() -> usize {
    zonewatch_core::params::DEFAULT_SHORT_MA_WINDOW
}

fn default_fast_ema_period() -> usize {
    zonewatch_core::params::DEFAULT_FAST_EMA_PERIOD
}

fn default_slow_ema_period() -> usize {
    zonewatch_core::params::DEFAULT_SLOW_EMA_PERIOD
}

fn default_smoothing_period() -> usize {
    zonewatch_core::params::DEFAULT_SMOOTHING_PERIOD
}

/// Complete configuration for a watch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Quote currency, e.g. `usd`.
    #[serde(default = "default_vs_currency")]
    pub vs_currency: String,
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
    #[serde(default = "default_ma_window")]
    pub ma_window: usize,
    #[serde(default = "default_short_ma_window")]
    pub short_ma_window: usize,
    #[serde(default = "default_fast_ema_period")]
    pub fast_ema_period: usize,
    #[serde(default = "default_slow_ema_period")]
    pub slow_ema_period: usize,
    #[serde(default = "default_smoothing_period")]
    pub smoothing_period: usize,
    /// Number of past runs kept in the summary document.
    #[serde(default = "default_history_retention")]
    pub history_retention: usize,
    /// Classifiers evaluated for every asset, in report column order.
    #[serde(default = "default_classifiers")]
    pub classifiers: Vec<ClassifierKind>,
    /// Days of history requested from the provider. Derived from the
    /// windows when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_days: Option<u32>,
    #[serde(alias = "coins")]
    pub assets: Vec<AssetSpec>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
}

impl WatchConfig {
    /// Load from a file: `.json` is parsed as JSON, anything else as TOML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration for the given assets with every other field defaulted.
    pub fn with_assets(assets: Vec<AssetSpec>) -> Self {
        Self {
            vs_currency: default_vs_currency(),
            rsi_period: default_rsi_period(),
            ma_window: default_ma_window(),
            short_ma_window: default_short_ma_window(),
            fast_ema_period: default_fast_ema_period(),
            slow_ema_period: default_slow_ema_period(),
            smoothing_period: default_smoothing_period(),
            history_retention: default_history_retention(),
            classifiers: default_classifiers(),
            fetch_days: None,
            assets,
            output: OutputConfig::default(),
            provider: ProviderConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.params().validate()?;

        if self.vs_currency.trim().is_empty() {
            return Err(ConfigError::Invalid("vs_currency must not be empty".into()));
        }
        if self.history_retention == 0 {
            return Err(ConfigError::Invalid(
                "history_retention must be >= 1".into(),
            ));
        }
        if self.classifiers.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one classifier must be selected".into(),
            ));
        }
        if self.fetch_days == Some(0) {
            return Err(ConfigError::Invalid("fetch_days must be >= 1".into()));
        }

        let mut seen = HashSet::new();
        for asset in &self.assets {
            if asset.id.trim().is_empty() {
                return Err(ConfigError::Invalid("asset id must not be empty".into()));
            }
            if !seen.insert(asset.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate asset id '{}'",
                    asset.id
                )));
            }
        }
        Ok(())
    }

    /// Indicator parameters handed to the core.
    pub fn params(&self) -> IndicatorParams {
        IndicatorParams {
            rsi_period: self.rsi_period,
            ma_window: self.ma_window,
            short_ma_window: self.short_ma_window,
            fast_ema_period: self.fast_ema_period,
            slow_ema_period: self.slow_ema_period,
            smoothing_period: self.smoothing_period,
        }
    }

    /// Days of history to request per asset.
    ///
    /// Explicit `fetch_days` wins; otherwise the longest lookback of any
    /// indicator plus a margin, and never less than 250.
    pub fn fetch_days(&self) -> u32 {
        if let Some(days) = self.fetch_days {
            return days;
        }
        let needed = self.params().max_lookback().saturating_add(10);
        u32::try_from(needed).unwrap_or(u32::MAX).max(MIN_FETCH_DAYS)
    }
}
