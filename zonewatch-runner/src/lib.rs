//! Zonewatch Runner — run orchestration on top of `zonewatch-core`.
//!
//! This crate provides:
//! - Watch configuration (TOML or legacy JSON)
//! - Price providers: CoinGecko over HTTP, CSV directory, synthetic walk
//! - Circuit breaker for the HTTP provider
//! - Rolling run history behind a load/save store
//! - Markdown report rendering
//! - The run orchestrator tying them together

pub mod config;
pub mod history;
pub mod provider;
pub mod report;
pub mod runner;

pub use config::{AssetSpec, ConfigError, OutputConfig, ProviderConfig, WatchConfig};
pub use history::{
    HistoryError, HistoryStore, JsonHistoryStore, MemoryHistoryStore, RunHistory, RunSnapshot,
    SummaryDocument,
};
pub use provider::{
    CircuitBreaker, CoinGeckoProvider, CsvDirectoryProvider, FetchError, PriceProvider,
    SyntheticProvider,
};
pub use report::{write_report, MarkdownReport};
pub use runner::{evaluate_asset, RunError, RunOutcome, Runner};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<WatchConfig>();
        assert_sync::<WatchConfig>();
        assert_send::<AssetSpec>();
        assert_sync::<AssetSpec>();
    }

    #[test]
    fn history_types_are_send_sync() {
        assert_send::<RunHistory>();
        assert_sync::<RunHistory>();
        assert_send::<JsonHistoryStore>();
        assert_sync::<JsonHistoryStore>();
        assert_send::<MemoryHistoryStore>();
        assert_sync::<MemoryHistoryStore>();
    }

    #[test]
    fn providers_are_send_sync() {
        assert_send::<CoinGeckoProvider>();
        assert_sync::<CoinGeckoProvider>();
        assert_send::<CsvDirectoryProvider>();
        assert_sync::<CsvDirectoryProvider>();
        assert_send::<CircuitBreaker>();
        assert_sync::<CircuitBreaker>();
        assert_send::<FetchError>();
        assert_sync::<FetchError>();
    }
}
