//! Evaluation of one price series against the selected classifiers.

use crate::classify::{ClassifierKind, SeriesInput, Signal};
use crate::domain::IndicatorSet;
use crate::indicators::{compute_rsi, moving_average};
use crate::params::IndicatorParams;

/// Everything computed from one price series.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub current_price: f64,
    pub previous_price: f64,
    pub indicators: IndicatorSet,
    /// One signal per requested classifier, in request order.
    pub signals: Vec<Signal>,
}

/// Evaluate a price series (oldest first).
///
/// RSI and both simple moving averages are always reported; classifier
/// specific values (EMAs, smoothed price) are added for the classifiers that
/// ran. Returns `None` only for an empty series.
pub fn evaluate_series(
    prices: &[f64],
    params: &IndicatorParams,
    kinds: &[ClassifierKind],
) -> Option<Evaluation> {
    let input = SeriesInput::new(prices);
    let current_price = input.current()?;
    let previous_price = input.previous()?;

    let base = IndicatorSet {
        rsi: compute_rsi(prices, params.rsi_period),
        long_ma: moving_average(prices, params.ma_window),
        short_ma: moving_average(prices, params.short_ma_window),
        ..IndicatorSet::default()
    };

    let mut indicators = base;
    let mut signals = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let classification = kind.build(params).classify(&input);
        indicators = indicators.merge(classification.indicators);
        signals.push(classification.signal);
    }

    Some(Evaluation {
        current_price,
        previous_price,
        indicators,
        signals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{LongSignal, ShortSignal, Zone};

    fn rising(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn empty_series_has_no_evaluation() {
        assert!(evaluate_series(&[], &IndicatorParams::default(), &ClassifierKind::ALL).is_none());
    }

    #[test]
    fn signals_follow_requested_order() {
        let eval = evaluate_series(
            &rising(250),
            &IndicatorParams::default(),
            &[ClassifierKind::ActionZone, ClassifierKind::LongHorizon],
        )
        .unwrap();
        assert_eq!(
            eval.signals,
            vec![
                Signal::ActionZone(Zone::Buy),
                Signal::LongHorizon(LongSignal::Uptrend)
            ]
        );
    }

    #[test]
    fn base_indicators_always_present() {
        let eval = evaluate_series(&rising(250), &IndicatorParams::default(), &[]).unwrap();
        assert!(eval.signals.is_empty());
        assert_eq!(eval.indicators.rsi, Some(100.0));
        assert!(eval.indicators.long_ma.is_some());
        assert!(eval.indicators.short_ma.is_some());
        assert_eq!(eval.indicators.fast_ema, None);
        assert_eq!(eval.current_price, 349.0);
        assert_eq!(eval.previous_price, 348.0);
    }

    #[test]
    fn short_history_degrades_per_classifier() {
        // 199 samples: MA200 absent, MA20 and EMAs available.
        let eval =
            evaluate_series(&rising(199), &IndicatorParams::default(), &ClassifierKind::ALL)
                .unwrap();
        assert_eq!(eval.indicators.long_ma, None);
        assert_eq!(
            eval.signals,
            vec![
                Signal::LongHorizon(LongSignal::InsufficientData),
                Signal::ShortHorizon(ShortSignal::Overbought),
                Signal::ActionZone(Zone::Buy),
            ]
        );
        assert!(eval.indicators.fast_ema.is_some());
    }

    #[test]
    fn single_sample_uses_itself_as_previous() {
        let eval =
            evaluate_series(&[42.0], &IndicatorParams::default(), &ClassifierKind::ALL).unwrap();
        assert_eq!(eval.previous_price, 42.0);
        assert!(eval.signals.iter().all(|s| s.is_insufficient_data()));
    }
}
