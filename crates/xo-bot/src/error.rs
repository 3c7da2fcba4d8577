//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("Signal configuration error: {0}")]
    SignalConfig(#[from] xo_signal::SignalConfigError),

    #[error("Quote error: {0}")]
    Quote(#[from] xo_mm::QuoteError),
}

pub type AppResult<T> = Result<T, AppError>;
