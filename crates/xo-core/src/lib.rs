//! Core domain types for the Trader XO bot.
//!
//! This crate provides the types shared by every other crate:
//! - `Price`, `Size`: Precision-safe numeric types for quoting
//! - `Signal`, `SignalResult`, `StochRsi`: Output of one signal evaluation

pub mod decimal;
pub mod error;
pub mod signal;

pub use decimal::{Price, Size};
pub use error::{CoreError, Result};
pub use signal::{Signal, SignalResult, StochRsi};
