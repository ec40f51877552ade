//! Domain types: price series in, per-asset results out.

pub mod price;
pub mod result;

pub use price::{PricePoint, PriceSeries};
pub use result::{AssetEntry, AssetFailure, AssetResult, IndicatorSet};
