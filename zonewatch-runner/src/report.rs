//! Markdown report generator.

use std::fmt::Write as _;
use std::io;
use std::path::Path;

use zonewatch_core::{AssetEntry, AssetResult, ClassifierKind, IndicatorParams, Signal};

use crate::config::WatchConfig;
use crate::history::RunSnapshot;

/// RSI at or above this is tagged `(Overbought)` in the report.
pub const REPORT_OVERBOUGHT: f64 = 70.0;
/// RSI at or below this is tagged `(Oversold)` in the report.
pub const REPORT_OVERSOLD: f64 = 30.0;

const DISCLAIMER: &str = "Note: signals are derived mechanically from moving averages and RSI. \
They are not investment advice.";

/// Renders one run as a Markdown table, one row per asset.
#[derive(Debug, Clone)]
pub struct MarkdownReport {
    params: IndicatorParams,
    classifiers: Vec<ClassifierKind>,
}

impl MarkdownReport {
    pub fn new(params: IndicatorParams, classifiers: Vec<ClassifierKind>) -> Self {
        Self {
            params,
            classifiers,
        }
    }

    pub fn from_config(config: &WatchConfig) -> Self {
        Self::new(config.params(), config.classifiers.clone())
    }

    fn column_title(&self, kind: ClassifierKind) -> String {
        let p = &self.params;
        match kind {
            ClassifierKind::LongHorizon => format!("Signal (MA{})", p.ma_window),
            ClassifierKind::ShortHorizon => format!("Signal (MA{} + RSI)", p.short_ma_window),
            ClassifierKind::ActionZone => {
                format!("ActionZone (EMA{}/{})", p.fast_ema_period, p.slow_ema_period)
            }
        }
    }

    pub fn render(&self, snapshot: &RunSnapshot) -> String {
        let p = &self.params;
        let mut report = format!(
            "# Crypto Daily Summary\n\nLast Update (UTC): {}\n\n",
            snapshot.run_at.to_rfc3339()
        );

        let mut header = format!(
            "| Coin | Symbol | Price (vs base) | RSI | MA{} | MA{} |",
            p.ma_window, p.short_ma_window
        );
        let mut divider = String::from("|------|--------|-----------------|-----|------|------|");
        for kind in &self.classifiers {
            let _ = write!(header, " {} |", self.column_title(*kind));
            divider.push_str("------|");
        }
        report.push_str(&header);
        report.push('\n');
        report.push_str(&divider);
        report.push('\n');

        for entry in &snapshot.data {
            match entry {
                AssetEntry::Evaluated(result) => report.push_str(&self.result_row(result)),
                AssetEntry::Failed(failure) => {
                    let mut row = format!(
                        "| {} | {} | ERROR | - | - | - |",
                        cell(&failure.name),
                        cell(&failure.symbol)
                    );
                    for i in 0..self.classifiers.len() {
                        if i == 0 {
                            let _ = write!(row, " {} |", cell(&failure.error));
                        } else {
                            row.push_str(" - |");
                        }
                    }
                    report.push_str(&row);
                }
            }
            report.push('\n');
        }

        report.push('\n');
        report.push_str(DISCLAIMER);
        report.push('\n');
        report
    }

    fn result_row(&self, r: &AssetResult) -> String {
        let mut row = format!(
            "| {} | {} | {:.2} {} | {} | {} | {} |",
            cell(&r.name),
            cell(&r.symbol),
            r.current_price,
            r.vs_currency.to_uppercase(),
            format_rsi(r.indicators.rsi),
            format_value(r.indicators.long_ma),
            format_value(r.indicators.short_ma),
        );
        for kind in &self.classifiers {
            let text = match r.signal(*kind) {
                Some(signal) => self.format_signal(signal, r),
                None => "N/A".to_string(),
            };
            let _ = write!(row, " {} |", text);
        }
        row
    }

    fn format_signal(&self, signal: &Signal, r: &AssetResult) -> String {
        if signal.is_insufficient_data() {
            return signal.code().to_string();
        }
        let mut text = format!("{} ({})", signal.code(), signal.describe(&self.params));
        if let Signal::ActionZone(_) = signal {
            let _ = write!(
                text,
                "; EMA{} {} / EMA{} {}",
                self.params.fast_ema_period,
                format_value(r.indicators.fast_ema),
                self.params.slow_ema_period,
                format_value(r.indicators.slow_ema),
            );
        }
        text
    }
}

/// RSI with overbought/oversold status, or `N/A`.
pub fn format_rsi(rsi: Option<f64>) -> String {
    match rsi {
        None => "N/A".into(),
        Some(v) if v >= REPORT_OVERBOUGHT => format!("{v:.2} (Overbought)"),
        Some(v) if v <= REPORT_OVERSOLD => format!("{v:.2} (Oversold)"),
        Some(v) => format!("{v:.2}"),
    }
}

/// Two-decimal number, or `N/A`.
pub fn format_value(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".into(), |v| format!("{v:.2}"))
}

// Pipes would split the table cell.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Write a rendered report, creating parent directories.
pub fn write_report(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)
}
