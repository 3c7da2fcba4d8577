//! Indicator library for the Trader XO strategy.
//!
//! Stateless functions over a close-price series (oldest first):
//! - `ema`, `sma`, `wma`: moving averages, `None` until the period is filled
//! - `rsi`: simple-average RSI over the trailing period
//! - `stochastic_rsi`: K/D cascade used for momentum confirmation
//! - `MaFilterType`: the moving average selected for the trend filter

pub mod error;
pub mod moving_average;
pub mod rsi;

pub use error::{IndicatorError, IndicatorResult};
pub use moving_average::{ema, ema_series, sma, wma, MaFilterType};
pub use rsi::{rsi, stochastic_rsi, StochRsiParams};
