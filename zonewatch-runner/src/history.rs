//! Rolling run history and the stores that persist it.
//!
//! The persisted form is a single pretty-printed JSON document:
//!
//! ```json
//! { "last_run_utc": "...", "coins": [ ...latest entries... ],
//!   "history": [ { "run_at": "...", "data": [ ... ] }, ... ] }
//! ```
//!
//! A corrupt document is discarded with a warning rather than failing the
//! run; the next save rewrites it. Documents in the older flat shape
//! (`ma200` / `ma20` / `signal` / `signal2` per entry) are migrated on read.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use zonewatch_core::params::{DEFAULT_MA_WINDOW, DEFAULT_RSI_PERIOD};
use zonewatch_core::{
    AssetEntry, AssetFailure, AssetResult, IndicatorSet, LongSignal, ShortSignal, Signal,
};

use crate::config::DEFAULT_HISTORY_RETENTION;

/// Errors from persisting history.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history I/O at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// All asset entries produced by one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub run_at: DateTime<Utc>,
    pub data: Vec<AssetEntry>,
}

/// Ordered past runs, oldest first, capped at `retention`.
#[derive(Debug, Clone, PartialEq)]
pub struct RunHistory {
    runs: Vec<RunSnapshot>,
    retention: usize,
}

impl RunHistory {
    /// Empty history. A zero retention is treated as 1.
    pub fn new(retention: usize) -> Self {
        Self {
            runs: Vec::new(),
            retention: retention.max(1),
        }
    }

    /// Build from existing runs, dropping the oldest beyond `retention`.
    pub fn from_runs(runs: Vec<RunSnapshot>, retention: usize) -> Self {
        let mut history = Self {
            runs,
            retention: retention.max(1),
        };
        history.enforce_retention();
        history
    }

    /// Append a run; evicts the oldest runs FIFO beyond the cap.
    pub fn append(&mut self, snapshot: RunSnapshot) {
        self.runs.push(snapshot);
        self.enforce_retention();
    }

    fn enforce_retention(&mut self) {
        if self.runs.len() > self.retention {
            let excess = self.runs.len() - self.retention;
            self.runs.drain(..excess);
        }
    }

    pub fn runs(&self) -> &[RunSnapshot] {
        &self.runs
    }

    pub fn latest(&self) -> Option<&RunSnapshot> {
        self.runs.last()
    }

    /// The most recent `n` runs, oldest first.
    pub fn recent(&self, n: usize) -> &[RunSnapshot] {
        &self.runs[self.runs.len().saturating_sub(n)..]
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn retention(&self) -> usize {
        self.retention
    }
}

impl Default for RunHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_RETENTION)
    }
}

/// On-disk summary document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryDocument {
    pub last_run_utc: Option<DateTime<Utc>>,
    /// Entries of the latest run.
    #[serde(default)]
    pub coins: Vec<AssetEntry>,
    #[serde(default)]
    pub history: Vec<RunSnapshot>,
}

impl SummaryDocument {
    pub fn from_history(history: &RunHistory) -> Self {
        let latest = history.latest();
        Self {
            last_run_utc: latest.map(|s| s.run_at),
            coins: latest.map(|s| s.data.clone()).unwrap_or_default(),
            history: history.runs().to_vec(),
        }
    }

    pub fn into_history(self, retention: usize) -> RunHistory {
        RunHistory::from_runs(self.history, retention)
    }
}

// ─── Legacy documents ────────────────────────────────────────────────

/// Summary document with flat per-entry indicator keys and free-text labels,
/// e.g. `"signal": "BUY (Cross Above MA200)"`.
#[derive(Debug, Deserialize)]
struct LegacySummary {
    last_run_utc: Option<DateTime<Utc>>,
    #[serde(default)]
    coins: Vec<LegacyEntry>,
    #[serde(default)]
    history: Vec<LegacyRun>,
}

#[derive(Debug, Deserialize)]
struct LegacyRun {
    run_at: DateTime<Utc>,
    #[serde(default)]
    data: Vec<LegacyEntry>,
}

#[derive(Debug, Deserialize)]
struct LegacyEntry {
    id: String,
    name: Option<String>,
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    vs_currency: String,
    timestamp_utc: DateTime<Utc>,
    current_price: Option<f64>,
    rsi_period: Option<usize>,
    rsi: Option<f64>,
    ma_window: Option<usize>,
    ma200: Option<f64>,
    ma20: Option<f64>,
    signal: Option<String>,
    signal2: Option<String>,
    error: Option<String>,
}

/// `"STRONG_BUY (MA20 Cross + RSI)"` → `"STRONG_BUY"`.
fn leading_code(label: &str) -> &str {
    label.split_whitespace().next().unwrap_or("")
}

impl LegacyEntry {
    fn into_entry(self) -> AssetEntry {
        let name = self.name.unwrap_or_else(|| self.id.clone());
        let current_price = match (self.error, self.current_price) {
            (None, Some(price)) => price,
            (error, _) => {
                return AssetEntry::Failed(AssetFailure {
                    id: self.id,
                    name,
                    symbol: self.symbol,
                    error: error.unwrap_or_else(|| "missing current_price".into()),
                    timestamp_utc: self.timestamp_utc,
                })
            }
        };

        let long = self
            .signal
            .as_deref()
            .and_then(|l| LongSignal::from_code(leading_code(l)))
            .map(Signal::LongHorizon);
        let short = self
            .signal2
            .as_deref()
            .and_then(|l| ShortSignal::from_code(leading_code(l)))
            .map(Signal::ShortHorizon);

        AssetEntry::Evaluated(AssetResult {
            id: self.id,
            name,
            symbol: self.symbol,
            vs_currency: self.vs_currency,
            timestamp_utc: self.timestamp_utc,
            current_price,
            rsi_period: self.rsi_period.unwrap_or(DEFAULT_RSI_PERIOD),
            ma_window: self.ma_window.unwrap_or(DEFAULT_MA_WINDOW),
            indicators: IndicatorSet {
                rsi: self.rsi,
                long_ma: self.ma200,
                short_ma: self.ma20,
                ..IndicatorSet::default()
            },
            signals: long.into_iter().chain(short).collect(),
        })
    }
}

impl From<LegacySummary> for SummaryDocument {
    fn from(legacy: LegacySummary) -> Self {
        Self {
            last_run_utc: legacy.last_run_utc,
            coins: legacy
                .coins
                .into_iter()
                .map(LegacyEntry::into_entry)
                .collect(),
            history: legacy
                .history
                .into_iter()
                .map(|run| RunSnapshot {
                    run_at: run.run_at,
                    data: run.data.into_iter().map(LegacyEntry::into_entry).collect(),
                })
                .collect(),
        }
    }
}

/// Load/save interface for run history.
pub trait HistoryStore: Send + Sync {
    fn load(&self) -> Result<RunHistory, HistoryError>;
    fn save(&self, history: &RunHistory) -> Result<(), HistoryError>;
}

/// History persisted as a JSON summary document.
#[derive(Debug, Clone)]
pub struct JsonHistoryStore {
    path: PathBuf,
    retention: usize,
}

impl JsonHistoryStore {
    pub fn new(path: impl Into<PathBuf>, retention: usize) -> Self {
        Self {
            path: path.into(),
            retention,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the raw document. Missing file → `None`; malformed → error.
    ///
    /// A document in the legacy flat shape is converted.
    pub fn read_document(&self) -> Result<Option<SummaryDocument>, HistoryError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(HistoryError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        match serde_json::from_str::<SummaryDocument>(&content) {
            Ok(doc) => Ok(Some(doc)),
            Err(e) => match serde_json::from_str::<LegacySummary>(&content) {
                Ok(legacy) => {
                    info!(
                        path = %self.path.display(),
                        runs = legacy.history.len(),
                        "migrating legacy summary document"
                    );
                    Ok(Some(legacy.into()))
                }
                Err(_) => Err(e.into()),
            },
        }
    }
}

impl HistoryStore for JsonHistoryStore {
    fn load(&self) -> Result<RunHistory, HistoryError> {
        match self.read_document() {
            Ok(Some(doc)) => {
                debug!(path = %self.path.display(), runs = doc.history.len(), "loaded history");
                Ok(doc.into_history(self.retention))
            }
            Ok(None) => Ok(RunHistory::new(self.retention)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "discarding unreadable history");
                Ok(RunHistory::new(self.retention))
            }
        }
    }

    fn save(&self, history: &RunHistory) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| HistoryError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(&SummaryDocument::from_history(history))?;
        fs::write(&self.path, json).map_err(|source| HistoryError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// In-memory store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    saved: Mutex<Option<RunHistory>>,
    retention: usize,
}

impl MemoryHistoryStore {
    pub fn new(retention: usize) -> Self {
        Self {
            saved: Mutex::new(None),
            retention,
        }
    }

    /// Start from an existing history.
    pub fn with_history(history: RunHistory) -> Self {
        let retention = history.retention();
        Self {
            saved: Mutex::new(Some(history)),
            retention,
        }
    }

    /// Last saved history, if any.
    pub fn snapshot(&self) -> Option<RunHistory> {
        self.saved.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self) -> Result<RunHistory, HistoryError> {
        Ok(self
            .snapshot()
            .unwrap_or_else(|| RunHistory::new(self.retention)))
    }

    fn save(&self, history: &RunHistory) -> Result<(), HistoryError> {
        *self.saved.lock().unwrap_or_else(|e| e.into_inner()) = Some(history.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use zonewatch_core::AssetFailure;

    fn at(i: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(i)
    }

    fn snapshot(i: i64) -> RunSnapshot {
        RunSnapshot {
            run_at: at(i),
            data: vec![AssetEntry::Failed(AssetFailure {
                id: "bitcoin".into(),
                name: "Bitcoin".into(),
                symbol: "BTC".into(),
                error: format!("run {i}"),
                timestamp_utc: at(i),
            })],
        }
    }

    #[test]
    fn append_caps_at_retention_fifo() {
        let mut history = RunHistory::new(60);
        for i in 0..61 {
            history.append(snapshot(i));
        }
        assert_eq!(history.len(), 60);
        assert_eq!(history.runs()[0].run_at, at(1));
        assert_eq!(history.latest().unwrap().run_at, at(60));
    }

    #[test]
    fn from_runs_recaps() {
        let runs = (0..10).map(snapshot).collect();
        let history = RunHistory::from_runs(runs, 3);
        let times: Vec<_> = history.runs().iter().map(|r| r.run_at).collect();
        assert_eq!(times, vec![at(7), at(8), at(9)]);
    }

    #[test]
    fn recent_returns_tail() {
        let history = RunHistory::from_runs((0..5).map(snapshot).collect(), 10);
        assert_eq!(history.recent(2).len(), 2);
        assert_eq!(history.recent(2)[1].run_at, at(4));
        assert_eq!(history.recent(100).len(), 5);
    }

    #[test]
    fn summary_document_mirrors_latest_run() {
        let history = RunHistory::from_runs(vec![snapshot(0), snapshot(1)], 10);
        let doc = SummaryDocument::from_history(&history);
        assert_eq!(doc.last_run_utc, Some(at(1)));
        assert_eq!(doc.coins, snapshot(1).data);
        assert_eq!(doc.history.len(), 2);
    }

    #[test]
    fn json_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("summary.json"), 60);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn json_store_corrupt_file_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        fs::write(&path, "{ not json").unwrap();
        let store = JsonHistoryStore::new(&path, 60);
        assert!(store.load().unwrap().is_empty());
        assert!(store.read_document().is_err());
    }

    const LEGACY_DOC: &str = r#"{
      "last_run_utc": "2024-06-02T00:00:05.123456+00:00",
      "coins": [],
      "history": [
        {
          "run_at": "2024-06-02T00:00:05.123456+00:00",
          "data": [
            {
              "id": "bitcoin", "name": "Bitcoin", "symbol": "BTC",
              "vs_currency": "usd",
              "timestamp_utc": "2024-06-02T00:00:05.123456+00:00",
              "current_price": 67000.5, "rsi_period": 14, "rsi": 72.35,
              "ma_window": 200, "ma200": 61000.12, "ma20": 66000.0,
              "signal": "BUY (Cross Above MA200)",
              "signal2": "STRONG_BUY (MA20 Cross + RSI)"
            },
            {
              "id": "ghost", "name": "Ghost", "symbol": "",
              "error": "404 Client Error",
              "timestamp_utc": "2024-06-02T00:00:05.123456+00:00"
            }
          ]
        }
      ]
    }"#;

    #[test]
    fn json_store_migrates_legacy_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        fs::write(&path, LEGACY_DOC).unwrap();
        let store = JsonHistoryStore::new(&path, 60);

        let history = store.load().unwrap();
        assert_eq!(history.len(), 1);
        let data = &history.runs()[0].data;
        assert_eq!(data.len(), 2);

        let btc = data[0].as_result().unwrap();
        assert_eq!(btc.current_price, 67000.5);
        assert_eq!(btc.indicators.rsi, Some(72.35));
        assert_eq!(btc.indicators.long_ma, Some(61000.12));
        assert_eq!(btc.indicators.short_ma, Some(66000.0));
        assert_eq!(
            btc.signals,
            vec![
                Signal::LongHorizon(LongSignal::Buy),
                Signal::ShortHorizon(ShortSignal::StrongBuy)
            ]
        );

        assert!(data[1].is_failed());
        match &data[1] {
            AssetEntry::Failed(f) => assert_eq!(f.error, "404 Client Error"),
            AssetEntry::Evaluated(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn legacy_unknown_label_is_dropped() {
        let entry: LegacyEntry = serde_json::from_str(
            r#"{"id": "x", "name": "X", "timestamp_utc": "2024-01-01T00:00:00Z",
                "current_price": 1.0, "signal": "INSUFFICIENT_DATA", "signal2": "N/A"}"#,
        )
        .unwrap();
        let entry = entry.into_entry();
        let result = entry.as_result().unwrap();
        assert_eq!(
            result.signals,
            vec![Signal::LongHorizon(LongSignal::InsufficientData)]
        );
        assert_eq!(result.rsi_period, 14);
        assert_eq!(result.ma_window, 200);
    }

    #[test]
    fn json_store_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/data/summary.json");
        let store = JsonHistoryStore::new(&path, 60);
        store
            .save(&RunHistory::from_runs(vec![snapshot(0)], 60))
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryHistoryStore::new(5);
        assert!(store.load().unwrap().is_empty());
        let history = RunHistory::from_runs(vec![snapshot(0)], 5);
        store.save(&history).unwrap();
        assert_eq!(store.load().unwrap(), history);

        let seeded = MemoryHistoryStore::with_history(history.clone());
        assert_eq!(seeded.load().unwrap().retention(), 5);
        assert_eq!(seeded.snapshot(), Some(history));
    }
}
