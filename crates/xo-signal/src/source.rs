//! External indicator source.
//!
//! A remote service may supply EMA values that match the exchange's own
//! charting. It is optional: the engine falls back to local computation
//! whenever the source is absent or fails.

use serde::{Deserialize, Serialize};

use crate::error::SourceResult;

/// Parameters sent with an indicator request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorParams {
    pub period: usize,
}

impl IndicatorParams {
    pub fn period(period: usize) -> Self {
        Self { period }
    }
}

/// Source of precomputed indicator series.
#[cfg_attr(test, mockall::automock)]
pub trait IndicatorSource: Send + Sync {
    /// Fetch the last `count` values of `indicator` for `symbol` (e.g.
    /// `"BTC/USDT"`) on `interval`, newest first.
    fn fetch_series(
        &self,
        indicator: &str,
        symbol: &str,
        interval: &str,
        count: usize,
        params: &IndicatorParams,
    ) -> SourceResult<Vec<f64>>;
}
