//! Signal engine error types.

use thiserror::Error;

/// Rejected [`SignalConfig`](crate::SignalConfig) values.
#[derive(Debug, Error, PartialEq)]
pub enum SignalConfigError {
    #[error("{0} must be greater than zero")]
    ZeroPeriod(&'static str),

    #[error("Stochastic bands must satisfy 0 <= lower ({lower}) < middle ({middle}) < upper ({upper}) <= 100")]
    InvalidBands { lower: f64, middle: f64, upper: f64 },

    #[error("stop_loss_percent ({0}) must be in [0, 100)")]
    InvalidStopLoss(f64),
}

/// Failure reported by an external indicator source.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SourceError {
    #[error("Indicator source unavailable: {0}")]
    Unavailable(String),

    #[error("Indicator request failed: {0}")]
    Request(String),

    #[error("Invalid indicator response: {0}")]
    InvalidResponse(String),
}

pub type SourceResult<T> = Result<T, SourceError>;
