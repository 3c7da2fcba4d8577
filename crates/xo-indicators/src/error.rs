//! Indicator error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndicatorError {
    #[error("Unknown MA filter type: {0} (expected EMA, SMA, WMA or None)")]
    UnknownMaFilter(String),
}

pub type IndicatorResult<T> = Result<T, IndicatorError>;
