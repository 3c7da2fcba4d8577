//! Trader XO strategy runner.
//!
//! Wires the signal engine and the quote manager together:
//! - Application configuration (TOML)
//! - Per-asset trade decisions with exit plans
//! - Strategy context summaries of the stored indicator state

pub mod config;
pub mod error;
pub mod integration;

pub use config::{AppConfig, TelemetryConfig};
pub use error::{AppError, AppResult};
pub use integration::{MarketData, StrategyIntegration, TradeDecision, TRADER_XO};
