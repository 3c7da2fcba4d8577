//! Prometheus metrics and structured logging for the Trader XO bot.
//!
//! - Prometheus counters for signal outcomes, gate blocks and quote plans
//! - Structured JSON/pretty logging with tracing

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;

/// Default `EnvFilter` directive when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,xo=debug";
