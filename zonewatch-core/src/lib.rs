//! Zonewatch Core — indicators, signal classifiers, and domain types.
//!
//! This crate is the pure computational part of the system:
//! - Domain types (price series, indicator sets, asset results)
//! - Indicator library (RSI, SMA, EMA, series smoothing)
//! - Three classifier strategies behind one input contract
//! - Series evaluation that ties indicators and classifiers together
//!
//! Nothing here performs I/O. Insufficient history is always reported as an
//! absent value or an `INSUFFICIENT_DATA` label, never as an error.

pub mod classify;
pub mod domain;
pub mod evaluate;
pub mod indicators;
pub mod params;

pub use classify::{
    ActionZone, Classification, Classifier, ClassifierKind, LongSignal, SeriesInput, ShortSignal,
    Signal, UnknownClassifier, Zone,
};
pub use domain::{AssetEntry, AssetFailure, AssetResult, IndicatorSet, PricePoint, PriceSeries};
pub use evaluate::{evaluate_series, Evaluation};
pub use params::{IndicatorParams, ParamError};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: core types can cross thread boundaries.
    ///
    /// The runner evaluates assets on a rayon pool, so every type that flows
    /// out of the core must be Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<PriceSeries>();
        require_sync::<PriceSeries>();
        require_send::<IndicatorSet>();
        require_sync::<IndicatorSet>();
        require_send::<AssetResult>();
        require_sync::<AssetResult>();
        require_send::<AssetEntry>();
        require_sync::<AssetEntry>();
        require_send::<Signal>();
        require_sync::<Signal>();
        require_send::<IndicatorParams>();
        require_sync::<IndicatorParams>();
        require_send::<Evaluation>();
        require_sync::<Evaluation>();
        require_send::<Box<dyn Classifier>>();
        require_sync::<Box<dyn Classifier>>();
    }

    /// Architecture contract: classifiers see prices and parameters only.
    ///
    /// `classify()` takes a `SeriesInput` and nothing else, so a classifier
    /// cannot remember state between calls or reach persisted history.
    #[test]
    fn classifier_trait_takes_series_input_only() {
        fn _check_trait_object_builds(
            classifier: &dyn Classifier,
            input: &SeriesInput<'_>,
        ) -> Classification {
            classifier.classify(input)
        }
    }
}
