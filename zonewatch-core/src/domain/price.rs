//! Price samples and chronological price series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One (timestamp, price) sample from a data provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self { timestamp, price }
    }
}

/// Chronological price series, oldest first.
///
/// Invariants after construction:
/// - timestamps strictly increasing (duplicates collapsed, last sample wins)
/// - every price is finite
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Canonicalize raw provider samples into a series.
    ///
    /// Sorts by timestamp, drops non-finite prices, and keeps the last sample
    /// seen for any repeated timestamp.
    pub fn from_points(mut points: Vec<PricePoint>) -> Self {
        points.retain(|p| p.price.is_finite());
        // Stable sort keeps provider order among equal timestamps.
        points.sort_by_key(|p| p.timestamp);

        let mut canonical: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match canonical.last_mut() {
                Some(last) if last.timestamp == point.timestamp => *last = point,
                _ => canonical.push(point),
            }
        }

        Self { points: canonical }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Price component only, in chronological order.
    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    /// Most recent sample.
    pub fn current(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Sample before the most recent one; the most recent one for a single-sample series.
    pub fn previous(&self) -> Option<&PricePoint> {
        match self.points.len() {
            0 => None,
            1 => self.points.last(),
            n => self.points.get(n - 2),
        }
    }

    /// Keep only the most recent `n` samples.
    pub fn truncate_front(&mut self, n: usize) {
        if self.points.len() > n {
            let excess = self.points.len() - n;
            self.points.drain(..excess);
        }
    }
}
