//! Quote engine error types.

use thiserror::Error;
use xo_core::Price;

#[derive(Debug, Error, PartialEq)]
pub enum QuoteError {
    #[error("Invalid quote configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid top of book: bid={bid} ask={ask}")]
    InvalidBook { bid: Price, ask: Price },
}

pub type QuoteResult<T> = Result<T, QuoteError>;
