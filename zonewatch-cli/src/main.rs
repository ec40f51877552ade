//! Zonewatch CLI — run, evaluate, and history commands.
//!
//! Commands:
//! - `run` — fetch prices for every configured asset, classify, persist the
//!   summary document, and write the Markdown report
//! - `evaluate` — classify a single local `timestamp,price` CSV file
//! - `history` — print recent runs from the summary document

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use zonewatch_core::{evaluate_series, AssetEntry, ClassifierKind, IndicatorParams, PriceSeries};
use zonewatch_runner::provider::csv_dir::read_price_file;
use zonewatch_runner::report::{format_rsi, format_value};
use zonewatch_runner::{
    CircuitBreaker, CoinGeckoProvider, CsvDirectoryProvider, JsonHistoryStore, PriceProvider,
    RunOutcome, Runner, SyntheticProvider, WatchConfig,
};

#[derive(Parser)]
#[command(
    name = "zonewatch",
    about = "Zonewatch — daily RSI / moving-average / ActionZone signals"
)]
struct Cli {
    /// Debug-level logging (RUST_LOG overrides).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run once over every configured asset.
    Run {
        /// Path to a TOML (or legacy JSON) config file.
        #[arg(long, default_value = "zonewatch.toml")]
        config: PathBuf,

        /// Read `{id}.csv` files from this directory instead of CoinGecko.
        #[arg(long, conflicts_with = "synthetic")]
        csv_dir: Option<PathBuf>,

        /// Use deterministic synthetic prices (no network).
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Override the summary document path.
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Override the report path.
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Classify one local price file.
    Evaluate {
        /// CSV file with a `timestamp,price` header.
        #[arg(long)]
        csv: PathBuf,

        /// Classifier to run (repeatable): long_horizon, short_horizon, action_zone.
        #[arg(long = "classifier")]
        classifiers: Vec<ClassifierKind>,

        /// Take periods and default classifiers from this config.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print recent runs from the summary document.
    History {
        #[arg(long, default_value = "data/summary.json")]
        summary: PathBuf,

        /// Number of most recent runs to show.
        #[arg(long, default_value_t = 5)]
        last: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            config,
            csv_dir,
            synthetic,
            summary,
            report,
        } => run_cmd(&config, csv_dir, synthetic, summary, report),
        Commands::Evaluate {
            csv,
            classifiers,
            config,
        } => evaluate_cmd(&csv, classifiers, config.as_deref()),
        Commands::History { summary, last } => history_cmd(&summary, last),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run_cmd(
    config_path: &Path,
    csv_dir: Option<PathBuf>,
    synthetic: bool,
    summary: Option<PathBuf>,
    report: Option<PathBuf>,
) -> Result<()> {
    let mut config = WatchConfig::from_file(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    if let Some(path) = summary {
        config.output.summary_path = path;
    }
    if let Some(path) = report {
        config.output.report_path = path;
    }
    if config.assets.is_empty() {
        bail!("no assets configured in {}", config_path.display());
    }

    let provider: Box<dyn PriceProvider> = if let Some(dir) = csv_dir {
        Box::new(CsvDirectoryProvider::new(dir))
    } else if synthetic {
        Box::new(SyntheticProvider::new())
    } else {
        let breaker = Arc::new(CircuitBreaker::default_provider());
        Box::new(CoinGeckoProvider::new(&config.provider, breaker)?)
    };

    let store = JsonHistoryStore::new(&config.output.summary_path, config.history_retention);
    let outcome = Runner::new(&config, provider.as_ref(), &store).run()?;

    print_run_summary(&outcome, &config);
    println!();
    println!("Summary saved to: {}", store.path().display());
    println!("Report saved to:  {}", config.output.report_path.display());
    Ok(())
}

fn print_run_summary(outcome: &RunOutcome, config: &WatchConfig) {
    let params = config.params();
    println!();
    println!("=== Run {} ===", outcome.snapshot.run_at.to_rfc3339());
    for entry in &outcome.snapshot.data {
        print_entry(entry, &params);
    }
    println!();
    println!(
        "Evaluated: {}  Failed: {}  Runs kept: {}",
        outcome.evaluated(),
        outcome.failed(),
        outcome.history_len
    );
}

fn print_entry(entry: &AssetEntry, params: &IndicatorParams) {
    match entry {
        AssetEntry::Evaluated(r) => {
            let signals: Vec<String> = r
                .signals
                .iter()
                .map(|s| format!("{}={}", s.kind(), s.code()))
                .collect();
            println!(
                "{:<8} {:>14.2} {}  RSI {:<18} MA{} {:<12} {}",
                r.symbol,
                r.current_price,
                r.vs_currency.to_uppercase(),
                format_rsi(r.indicators.rsi),
                params.ma_window,
                format_value(r.indicators.long_ma),
                signals.join(" "),
            );
        }
        AssetEntry::Failed(f) => println!("{:<8} ERROR: {}", f.symbol, f.error),
    }
}

fn evaluate_cmd(
    csv: &Path,
    classifiers: Vec<ClassifierKind>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config_path
        .map(WatchConfig::from_file)
        .transpose()
        .context("loading config")?;
    let params = config
        .as_ref()
        .map(WatchConfig::params)
        .unwrap_or_default();
    params.validate()?;

    let kinds = if !classifiers.is_empty() {
        classifiers
    } else if let Some(config) = &config {
        config.classifiers.clone()
    } else {
        ClassifierKind::ALL.to_vec()
    };

    let series = PriceSeries::from_points(read_price_file(csv)?);
    info!(path = %csv.display(), samples = series.len(), "loaded price file");
    let Some(eval) = evaluate_series(&series.prices(), &params, &kinds) else {
        bail!("{} contains no usable prices", csv.display());
    };

    let i = &eval.indicators;
    println!();
    println!("=== {} ===", csv.display());
    println!("Samples:        {}", series.len());
    println!("Current price:  {:.2}", eval.current_price);
    println!("Previous price: {:.2}", eval.previous_price);
    println!("RSI({}):        {}", params.rsi_period, format_rsi(i.rsi));
    println!("MA{}:          {}", params.ma_window, format_value(i.long_ma));
    println!("MA{}:           {}", params.short_ma_window, format_value(i.short_ma));
    if kinds.contains(&ClassifierKind::ActionZone) {
        println!("EMA{}:          {}", params.fast_ema_period, format_value(i.fast_ema));
        println!("EMA{}:          {}", params.slow_ema_period, format_value(i.slow_ema));
    }
    println!();
    println!("--- Signals ---");
    for signal in &eval.signals {
        println!(
            "{:<14} {:<18} {}",
            signal.kind().as_str(),
            signal.code(),
            signal.describe(&params)
        );
    }
    Ok(())
}

fn history_cmd(summary: &Path, last: usize) -> Result<()> {
    let store = JsonHistoryStore::new(summary, usize::MAX);
    let Some(doc) = store
        .read_document()
        .with_context(|| format!("reading {}", summary.display()))?
    else {
        println!("No summary document at {}", summary.display());
        return Ok(());
    };

    let history = doc.into_history(usize::MAX);
    println!(
        "{} run(s) in {}, showing last {}",
        history.len(),
        summary.display(),
        last.min(history.len())
    );
    for run in history.recent(last) {
        let failed = run.data.iter().filter(|e| e.is_failed()).count();
        println!();
        println!(
            "=== {} ({} assets, {} failed) ===",
            run.run_at.to_rfc3339(),
            run.data.len(),
            failed
        );
        for entry in &run.data {
            match entry {
                AssetEntry::Evaluated(r) => {
                    let codes: Vec<&str> = r.signals.iter().map(|s| s.code()).collect();
                    println!(
                        "{:<8} {:>14.2} {}  {}",
                        r.symbol,
                        r.current_price,
                        r.vs_currency.to_uppercase(),
                        codes.join(" / ")
                    );
                }
                AssetEntry::Failed(f) => println!("{:<8} ERROR: {}", f.symbol, f.error),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_repeated_classifiers() {
        let cli = Cli::try_parse_from([
            "zonewatch",
            "evaluate",
            "--csv",
            "btc.csv",
            "--classifier",
            "cdc",
            "--classifier",
            "ma200",
        ])
        .unwrap();
        match cli.command {
            Commands::Evaluate { classifiers, .. } => assert_eq!(
                classifiers,
                vec![ClassifierKind::ActionZone, ClassifierKind::LongHorizon]
            ),
            _ => panic!("expected evaluate"),
        }
    }

    #[test]
    fn csv_dir_conflicts_with_synthetic() {
        let result = Cli::try_parse_from([
            "zonewatch",
            "run",
            "--csv-dir",
            "prices",
            "--synthetic",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn evaluate_reads_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("btc.csv");
        let mut body = String::from("timestamp,price\n");
        for day in 1..=28 {
            body.push_str(&format!("2024-02-{day:02},{}\n", 100 + day));
        }
        std::fs::write(&path, body).unwrap();
        evaluate_cmd(&path, vec![ClassifierKind::ShortHorizon], None).unwrap();
    }

    #[test]
    fn history_without_document_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        history_cmd(&dir.path().join("missing.json"), 3).unwrap();
    }
}
