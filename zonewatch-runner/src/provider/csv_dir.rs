//! Offline provider reading `{dir}/{id}.csv` files.
//!
//! Expected header: `timestamp,price`. Timestamps may be RFC 3339, Unix
//! milliseconds, or a plain `YYYY-MM-DD` date (midnight UTC).

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use zonewatch_core::{PricePoint, PriceSeries};

use super::{FetchError, PriceProvider};
use crate::config::AssetSpec;

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    price: f64,
}

/// Reads one CSV file per asset from a directory.
#[derive(Debug, Clone)]
pub struct CsvDirectoryProvider {
    dir: PathBuf,
}

impl CsvDirectoryProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.csv"))
    }
}

/// Parse a timestamp cell. Accepts RFC 3339, Unix milliseconds, or `YYYY-MM-DD`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(ms) = raw.parse::<i64>() {
        return DateTime::from_timestamp_millis(ms);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Read every sample from a `timestamp,price` CSV file.
pub fn read_price_file(path: &Path) -> Result<Vec<PricePoint>, FetchError> {
    let file = std::fs::File::open(path).map_err(|source| FetchError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

    let mut points = Vec::new();
    for (line, row) in reader.deserialize::<CsvRow>().enumerate() {
        let row = row.map_err(|e| FetchError::Csv {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let timestamp = parse_timestamp(&row.timestamp).ok_or_else(|| FetchError::Csv {
            path: path.to_path_buf(),
            // +2: header line, 1-based numbering
            message: format!("line {}: bad timestamp '{}'", line + 2, row.timestamp),
        })?;
        points.push(PricePoint::new(timestamp, row.price));
    }
    Ok(points)
}

impl PriceProvider for CsvDirectoryProvider {
    fn name(&self) -> &str {
        "csv_directory"
    }

    fn fetch(
        &self,
        asset: &AssetSpec,
        _vs_currency: &str,
        days: u32,
    ) -> Result<PriceSeries, FetchError> {
        let path = self.path_for(&asset.id);
        if !path.exists() {
            return Err(FetchError::AssetNotFound {
                id: asset.id.clone(),
            });
        }

        let mut series = PriceSeries::from_points(read_price_file(&path)?);
        series.truncate_front(days as usize + 1);
        if series.is_empty() {
            return Err(FetchError::EmptySeries {
                id: asset.id.clone(),
            });
        }
        Ok(series)
    }
}
