//! Prometheus metrics for the Trader XO bot.
//!
//! Counts what the signal engine and the quote manager decide, so an
//! operator can see how often each gate blocks and how often the external
//! indicator source has to be bypassed.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. If registration fails,
//! it indicates a fatal configuration error (e.g., duplicate metric names)
//! that should cause an immediate crash at startup rather than silent failure.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge_vec, CounterVec, Encoder, GaugeVec, TextEncoder,
};

use crate::error::{TelemetryError, TelemetryResult};

/// Signal evaluations by outcome.
/// Labels: asset, signal (buy/sell/hold)
pub static SIGNALS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "xo_signals_total",
        "Total signal evaluations by outcome",
        &["asset", "signal"]
    )
    .unwrap()
});

/// Fresh crossovers that a confirmation gate suppressed.
/// Labels: asset, gate (ma_filter/stoch_rsi)
pub static SIGNAL_BLOCKED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "xo_signal_blocked_total",
        "Total crossover signals blocked by a confirmation gate",
        &["asset", "gate"]
    )
    .unwrap()
});

/// Indicator source failures absorbed by local recomputation.
pub static INDICATOR_FALLBACK_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "xo_indicator_fallback_total",
        "Total indicator source failures recovered by local calculation",
        &["asset"]
    )
    .unwrap()
});

/// Quote plans generated.
/// Labels: asset, bias (buy/sell/neutral)
pub static QUOTE_PLANS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "xo_quote_plans_total",
        "Total quote plans generated",
        &["asset", "bias"]
    )
    .unwrap()
});

/// Last fast-minus-slow EMA gap per asset.
pub static EMA_GAP: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "xo_ema_gap",
        "Fast EMA minus slow EMA at the last evaluation",
        &["asset"]
    )
    .unwrap()
});

/// Metrics facade.
pub struct Metrics;

impl Metrics {
    /// Record a finished evaluation.
    pub fn signal(asset: &str, signal: &str) {
        SIGNALS_TOTAL.with_label_values(&[asset, signal]).inc();
    }

    /// Record a crossover blocked by `gate`.
    pub fn signal_blocked(asset: &str, gate: &str) {
        SIGNAL_BLOCKED_TOTAL.with_label_values(&[asset, gate]).inc();
    }

    /// Record an indicator source fallback.
    pub fn indicator_fallback(asset: &str) {
        INDICATOR_FALLBACK_TOTAL.with_label_values(&[asset]).inc();
    }

    /// Record a generated quote plan.
    pub fn quote_plan(asset: &str, bias: &str) {
        QUOTE_PLANS_TOTAL.with_label_values(&[asset, bias]).inc();
    }

    /// Record the latest EMA gap.
    pub fn ema_gap(asset: &str, gap: f64) {
        EMA_GAP.with_label_values(&[asset]).set(gap);
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn render() -> TelemetryResult<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&prometheus::gather(), &mut buffer)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}
