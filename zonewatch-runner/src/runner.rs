//! Run orchestrator — fetch, evaluate, persist, report.
//!
//! One run walks every configured asset: prices are fetched sequentially
//! (providers rate-limit), evaluated in parallel on the rayon pool, appended
//! to the history, and rendered into the Markdown report. A failing asset
//! becomes a failure entry; only configuration and persistence errors abort
//! the run.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use zonewatch_core::{evaluate_series, AssetEntry, AssetFailure, AssetResult, PriceSeries};

use crate::config::{AssetSpec, ConfigError, WatchConfig};
use crate::history::{HistoryError, HistoryStore, RunSnapshot};
use crate::provider::{FetchError, PriceProvider};
use crate::report::{write_report, MarkdownReport};

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("history error: {0}")]
    History(#[from] HistoryError),
    #[error("write report {path}: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub snapshot: RunSnapshot,
    /// Runs kept in history after this one was appended.
    pub history_len: usize,
    pub report: String,
}

impl RunOutcome {
    pub fn evaluated(&self) -> usize {
        self.snapshot.data.iter().filter(|e| !e.is_failed()).count()
    }

    pub fn failed(&self) -> usize {
        self.snapshot.data.iter().filter(|e| e.is_failed()).count()
    }
}

/// Evaluate one asset's series into a result entry.
///
/// An empty series is recorded as a failure.
pub fn evaluate_asset(
    asset: &AssetSpec,
    series: &PriceSeries,
    config: &WatchConfig,
    now: DateTime<Utc>,
) -> AssetEntry {
    let prices = series.prices();
    match evaluate_series(&prices, &config.params(), &config.classifiers) {
        Some(eval) => AssetEntry::Evaluated(AssetResult {
            id: asset.id.clone(),
            name: asset.display_name().to_string(),
            symbol: asset.display_symbol(),
            vs_currency: config.vs_currency.clone(),
            timestamp_utc: now,
            current_price: eval.current_price,
            rsi_period: config.rsi_period,
            ma_window: config.ma_window,
            indicators: eval.indicators,
            signals: eval.signals,
        }),
        None => failure(
            asset,
            &FetchError::EmptySeries {
                id: asset.id.clone(),
            },
            now,
        ),
    }
}

fn failure(asset: &AssetSpec, error: &FetchError, now: DateTime<Utc>) -> AssetEntry {
    AssetEntry::Failed(AssetFailure {
        id: asset.id.clone(),
        name: asset.display_name().to_string(),
        symbol: asset.display_symbol(),
        error: error.to_string(),
        timestamp_utc: now,
    })
}

/// Wires a configuration to a price provider and a history store.
pub struct Runner<'a> {
    config: &'a WatchConfig,
    provider: &'a dyn PriceProvider,
    store: &'a dyn HistoryStore,
    write_report: bool,
}

impl<'a> Runner<'a> {
    pub fn new(
        config: &'a WatchConfig,
        provider: &'a dyn PriceProvider,
        store: &'a dyn HistoryStore,
    ) -> Self {
        Self {
            config,
            provider,
            store,
            write_report: true,
        }
    }

    /// Render the report without writing it to `output.report_path`.
    pub fn without_report_file(mut self) -> Self {
        self.write_report = false;
        self
    }

    /// Run now.
    pub fn run(&self) -> Result<RunOutcome, RunError> {
        self.run_at(Utc::now())
    }

    /// Run with an explicit run timestamp.
    pub fn run_at(&self, now: DateTime<Utc>) -> Result<RunOutcome, RunError> {
        let config = self.config;
        config.validate()?;

        let mut history = self.store.load()?;
        let days = config.fetch_days();
        info!(
            assets = config.assets.len(),
            provider = self.provider.name(),
            days,
            "starting run"
        );

        let fetched: Vec<Result<PriceSeries, FetchError>> = config
            .assets
            .iter()
            .map(|asset| {
                let result = if self.provider.is_available() {
                    self.provider.fetch(asset, &config.vs_currency, days)
                } else {
                    Err(FetchError::CircuitBreakerTripped)
                };
                match &result {
                    Ok(series) => debug!(id = %asset.id, samples = series.len(), "fetched"),
                    Err(e) => warn!(id = %asset.id, error = %e, "fetch failed"),
                }
                result
            })
            .collect();

        // par_iter over an indexed source keeps configured order in collect().
        let data: Vec<AssetEntry> = config
            .assets
            .par_iter()
            .zip(fetched.par_iter())
            .map(|(asset, fetched)| match fetched {
                Ok(series) => evaluate_asset(asset, series, config, now),
                Err(e) => failure(asset, e, now),
            })
            .collect();

        let snapshot = RunSnapshot { run_at: now, data };
        history.append(snapshot.clone());
        self.store.save(&history)?;

        let report = MarkdownReport::from_config(config).render(&snapshot);
        if self.write_report {
            let path = &config.output.report_path;
            write_report(path, &report).map_err(|source| RunError::Report {
                path: path.clone(),
                source,
            })?;
        }

        let outcome = RunOutcome {
            snapshot,
            history_len: history.len(),
            report,
        };
        info!(
            evaluated = outcome.evaluated(),
            failed = outcome.failed(),
            history = outcome.history_len,
            "run complete"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryHistoryStore;
    use crate::provider::SyntheticProvider;
    use chrono::TimeZone;
    use zonewatch_core::{ClassifierKind, PricePoint};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn evaluate_asset_fills_result_fields() {
        let config = WatchConfig::with_assets(vec![]);
        let asset = AssetSpec::new("bitcoin", "btc").with_name("Bitcoin");
        let series = SyntheticProvider::ending_at(now())
            .fetch(&asset, "usd", 260)
            .unwrap();

        let entry = evaluate_asset(&asset, &series, &config, now());
        let result = entry.as_result().unwrap();
        assert_eq!(result.symbol, "BTC");
        assert_eq!(result.name, "Bitcoin");
        assert_eq!(result.vs_currency, "usd");
        assert_eq!(result.current_price, *series.prices().last().unwrap());
        assert_eq!(result.signals.len(), 2);
        assert!(result.indicators.long_ma.is_some());
        assert!(result.signal(ClassifierKind::LongHorizon).is_some());
    }

    #[test]
    fn empty_series_is_failure() {
        let config = WatchConfig::with_assets(vec![]);
        let asset = AssetSpec::new("ghost", "gh");
        let entry = evaluate_asset(&asset, &PriceSeries::default(), &config, now());
        assert!(entry.is_failed());
    }

    #[test]
    fn single_sample_still_evaluates() {
        let config = WatchConfig::with_assets(vec![]);
        let asset = AssetSpec::new("new", "nw");
        let series = PriceSeries::from_points(vec![PricePoint::new(now(), 5.0)]);
        let result = evaluate_asset(&asset, &series, &config, now());
        let result = result.as_result().unwrap();
        assert_eq!(result.current_price, 5.0);
        assert!(result.signals.iter().all(|s| s.is_insufficient_data()));
    }

    #[test]
    fn run_appends_to_store() {
        let config = WatchConfig::with_assets(vec![
            AssetSpec::new("bitcoin", "btc"),
            AssetSpec::new("ethereum", "eth"),
        ]);
        let provider = SyntheticProvider::ending_at(now());
        let store = MemoryHistoryStore::new(config.history_retention);

        let runner = Runner::new(&config, &provider, &store).without_report_file();
        let outcome = runner.run_at(now()).unwrap();
        assert_eq!(outcome.evaluated(), 2);
        assert_eq!(outcome.failed(), 0);
        assert_eq!(outcome.history_len, 1);
        assert!(outcome.report.contains("| bitcoin | BTC |"));

        runner.run_at(now()).unwrap();
        assert_eq!(store.snapshot().unwrap().len(), 2);
    }

    #[test]
    fn invalid_config_aborts() {
        let mut config = WatchConfig::with_assets(vec![AssetSpec::new("a", "a")]);
        config.classifiers.clear();
        let provider = SyntheticProvider::ending_at(now());
        let store = MemoryHistoryStore::new(5);
        let err = Runner::new(&config, &provider, &store)
            .without_report_file()
            .run_at(now())
            .unwrap_err();
        assert!(matches!(err, RunError::Config(_)));
        assert!(store.snapshot().is_none());
    }
}
