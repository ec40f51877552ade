//! Price providers and their structured error type.
//!
//! `PriceProvider` abstracts over where daily prices come from (CoinGecko,
//! a directory of CSV files, a deterministic random walk) so the run
//! orchestrator can swap sources and tests can use stubs.

pub mod circuit_breaker;
pub mod coingecko;
pub mod csv_dir;
pub mod synthetic;

use std::path::PathBuf;

use thiserror::Error;

use zonewatch_core::PriceSeries;

use crate::config::AssetSpec;

pub use circuit_breaker::CircuitBreaker;
pub use coingecko::CoinGeckoProvider;
pub use csv_dir::CsvDirectoryProvider;
pub use synthetic::SyntheticProvider;

/// Why a price series could not be obtained.
///
/// Displayed verbatim in failure entries and report rows.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("asset not found: {id}")]
    AssetNotFound { id: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("hard stop: provider has blocked requests (circuit breaker open)")]
    CircuitBreakerTripped,

    #[error("HTTP {status} for {id}")]
    Http { status: u16, id: String },

    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse {path}: {message}")]
    Csv { path: PathBuf, message: String },

    #[error("empty price series for {id}")]
    EmptySeries { id: String },

    #[error("provider error: {0}")]
    Other(String),
}

/// Source of daily price series.
pub trait PriceProvider: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Fetch roughly `days` of daily prices for `asset`, quoted in
    /// `vs_currency`. The returned series is never empty.
    fn fetch(
        &self,
        asset: &AssetSpec,
        vs_currency: &str,
        days: u32,
    ) -> Result<PriceSeries, FetchError>;

    /// False while the provider is refusing requests (breaker open).
    fn is_available(&self) -> bool {
        true
    }
}

impl<P: PriceProvider + ?Sized> PriceProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch(
        &self,
        asset: &AssetSpec,
        vs_currency: &str,
        days: u32,
    ) -> Result<PriceSeries, FetchError> {
        (**self).fetch(asset, vs_currency, days)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_asset() {
        let err = FetchError::AssetNotFound {
            id: "dogecoin".into(),
        };
        assert_eq!(err.to_string(), "asset not found: dogecoin");

        let err = FetchError::Http {
            status: 502,
            id: "bitcoin".into(),
        };
        assert_eq!(err.to_string(), "HTTP 502 for bitcoin");
    }

    #[test]
    fn boxed_provider_delegates() {
        let provider: Box<dyn PriceProvider> = Box::new(SyntheticProvider::new());
        assert_eq!(provider.name(), "synthetic");
        assert!(provider.is_available());
        let series = provider
            .fetch(&AssetSpec::new("bitcoin", "btc"), "usd", 10)
            .unwrap();
        assert_eq!(series.len(), 11);
    }
}
