//! Trader XO signal state machine.
//!
//! Turns a close-price history into buy/sell/hold decisions from a fast/slow
//! EMA crossover, debounced per asset, with optional MA-filter and
//! Stochastic RSI confirmation gates.

pub mod config;
pub mod engine;
pub mod error;
pub mod source;
pub mod state;

pub use config::SignalConfig;
pub use engine::SignalEngine;
pub use error::{SignalConfigError, SourceError, SourceResult};
pub use source::{IndicatorParams, IndicatorSource};
pub use state::{AssetSignalState, DebounceState, SignalStateStore};
