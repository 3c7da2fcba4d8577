//! Quote plan management.
//!
//! Wraps the ladder calculation with per-asset refresh timing and the
//! bookkeeping a caller needs to place orders:
//! - Refresh clock (one timestamp per asset, updated only by `mark_refreshed`)
//! - Quote plans with side totals and a rationale
//! - Hybrid plans carrying the Trader XO signal that biased them

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use xo_core::{Price, Signal, SignalResult};
use xo_telemetry::Metrics;

use crate::config::QuoteConfig;
use crate::quote_engine::{compute_levels, QuoteLevel};

/// Per-asset last-refresh timestamps.
#[derive(Debug, Clone, Default)]
pub struct RefreshClock {
    last_refresh: HashMap<String, DateTime<Utc>>,
}

impl RefreshClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `asset` was never refreshed or at least `interval_sec`
    /// elapsed by `now`.
    pub fn is_due(&self, asset: &str, interval_sec: u64, now: DateTime<Utc>) -> bool {
        match self.last_refresh.get(asset) {
            None => true,
            Some(last) => {
                let interval = i64::try_from(interval_sec).unwrap_or(i64::MAX);
                (now - *last).num_seconds() >= interval
            }
        }
    }

    pub fn mark(&mut self, asset: &str, now: DateTime<Utc>) {
        self.last_refresh.insert(asset.to_string(), now);
    }

    pub fn last_refresh(&self, asset: &str) -> Option<DateTime<Utc>> {
        self.last_refresh.get(asset).copied()
    }
}

/// Market making plan for one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotePlan {
    pub asset: String,
    pub timestamp: DateTime<Utc>,
    pub mid_price: Price,
    /// `buy` or `sell` when a directional signal biased the sizes.
    pub directional_signal: Option<Signal>,
    pub bids: Vec<QuoteLevel>,
    pub asks: Vec<QuoteLevel>,
    pub total_bid_usd: Decimal,
    pub total_ask_usd: Decimal,
    /// Whether the refresh interval had elapsed when the plan was built.
    pub refresh_due: bool,
    pub rationale: String,
    /// Set once inventory adjustment resized the ladder.
    #[serde(default)]
    pub inventory_adjustment: Option<String>,
}

/// The signal fields attached to a hybrid plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalContext {
    pub signal: Signal,
    pub rationale: String,
    pub fast_ema: Option<f64>,
    pub slow_ema: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

impl From<&SignalResult> for SignalContext {
    fn from(result: &SignalResult) -> Self {
        Self {
            signal: result.signal,
            rationale: result.rationale.clone(),
            fast_ema: result.fast_ema,
            slow_ema: result.slow_ema,
            stop_loss: result.stop_loss,
            take_profit: result.take_profit,
        }
    }
}

/// Quote plan combined with the signal that biased it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridPlan {
    #[serde(flatten)]
    pub plan: QuotePlan,
    pub signal_context: SignalContext,
    pub combined_rationale: String,
}

/// Builds quote plans and tracks refresh timing across assets.
pub struct QuoteManager {
    config: QuoteConfig,
    clock: RefreshClock,
}

impl QuoteManager {
    /// Create a new quote manager.
    pub fn new(config: QuoteConfig) -> Self {
        info!(
            spread_bps = %config.spread_bps,
            levels = config.num_levels,
            size_usd = %config.order_size_usd,
            "Market making quote manager initialized"
        );
        Self {
            config,
            clock: RefreshClock::new(),
        }
    }

    pub fn config(&self) -> &QuoteConfig {
        &self.config
    }

    pub fn clock(&self) -> &RefreshClock {
        &self.clock
    }

    pub fn should_refresh(&self, asset: &str) -> bool {
        self.should_refresh_at(asset, Utc::now())
    }

    pub fn should_refresh_at(&self, asset: &str, now: DateTime<Utc>) -> bool {
        self.clock
            .is_due(asset, self.config.refresh_interval_sec, now)
    }

    pub fn mark_refreshed(&mut self, asset: &str) {
        self.mark_refreshed_at(asset, Utc::now());
    }

    pub fn mark_refreshed_at(&mut self, asset: &str, now: DateTime<Utc>) {
        debug!(asset, %now, "Quotes refreshed");
        self.clock.mark(asset, now);
    }

    /// Build a quote plan for `asset` around `mid_price`.
    ///
    /// Only a `buy` or `sell` signal biases the ladder; hold or no signal
    /// quotes neutrally.
    pub fn generate_plan(
        &self,
        asset: &str,
        mid_price: Price,
        signal: Option<&SignalResult>,
    ) -> QuotePlan {
        self.generate_plan_at(asset, mid_price, signal, Utc::now())
    }

    pub fn generate_plan_at(
        &self,
        asset: &str,
        mid_price: Price,
        signal: Option<&SignalResult>,
        now: DateTime<Utc>,
    ) -> QuotePlan {
        let directional_signal = signal
            .map(|s| s.signal)
            .filter(|s| s.is_directional());

        let ladder = compute_levels(mid_price, directional_signal, &self.config);
        let total_bid_usd = ladder.total_bid_usd();
        let total_ask_usd = ladder.total_ask_usd();

        let bias = directional_signal.map_or("neutral".to_string(), |s| s.to_string());
        Metrics::quote_plan(asset, &bias);
        debug!(
            asset,
            mid = %mid_price,
            bias = %bias,
            total_bid_usd = %total_bid_usd,
            total_ask_usd = %total_ask_usd,
            "Quote plan generated"
        );

        QuotePlan {
            asset: asset.to_string(),
            timestamp: now,
            mid_price,
            directional_signal,
            bids: ladder.bids,
            asks: ladder.asks,
            total_bid_usd,
            total_ask_usd,
            refresh_due: self.should_refresh_at(asset, now),
            rationale: self.build_rationale(directional_signal, mid_price),
            inventory_adjustment: None,
        }
    }

    /// Quote plan biased by `signal`, with the signal attached.
    pub fn combine_with_signal(
        &self,
        asset: &str,
        mid_price: Price,
        signal: &SignalResult,
    ) -> HybridPlan {
        self.combine_with_signal_at(asset, mid_price, signal, Utc::now())
    }

    pub fn combine_with_signal_at(
        &self,
        asset: &str,
        mid_price: Price,
        signal: &SignalResult,
        now: DateTime<Utc>,
    ) -> HybridPlan {
        let plan = self.generate_plan_at(asset, mid_price, Some(signal), now);

        let mut combined_rationale = plan.rationale.clone();
        if !signal.rationale.is_empty() {
            combined_rationale.push_str(" | Trader XO: ");
            combined_rationale.push_str(&signal.rationale);
        }

        HybridPlan {
            plan,
            signal_context: SignalContext::from(signal),
            combined_rationale,
        }
    }

    fn build_rationale(&self, directional_signal: Option<Signal>, mid_price: Price) -> String {
        let mut parts = vec![format!(
            "Market making with {} levels, {}bps spread",
            self.config.num_levels, self.config.spread_bps
        )];

        match directional_signal {
            Some(signal) => {
                let side = if signal == Signal::Buy { "bid" } else { "ask" };
                let skew_pct = self.config.skew_amount * dec!(100);
                parts.push(format!(
                    "Directional bias: {} (skewing {side} sizes by {skew_pct:.0}%)",
                    signal.label()
                ));
            }
            None => parts.push("Neutral (no directional signal)".to_string()),
        }

        parts.push(format!("Mid price: ${mid_price:.2}"));
        parts.join(". ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn mid() -> Price {
        Price::new(dec!(100))
    }

    fn buy_signal() -> SignalResult {
        SignalResult {
            signal: Signal::Buy,
            rationale: "BUY: Fast EMA(12)=101.00 crossed above Slow EMA(25)=100.00. ".to_string(),
            stop_loss: Some(93.0),
            take_profit: Some(114.0),
            fast_ema: Some(101.0),
            slow_ema: Some(100.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_refresh_clock_lifecycle() {
        let mut mgr = QuoteManager::new(QuoteConfig::default());

        // Never refreshed
        assert!(mgr.should_refresh_at("BTC", t0()));

        mgr.mark_refreshed_at("BTC", t0());
        assert!(!mgr.should_refresh_at("BTC", t0()));
        assert!(!mgr.should_refresh_at("BTC", t0() + Duration::seconds(29)));
        assert!(mgr.should_refresh_at("BTC", t0() + Duration::seconds(30)));

        // Other assets are independent
        assert!(mgr.should_refresh_at("ETH", t0()));
        assert_eq!(mgr.clock().last_refresh("BTC"), Some(t0()));
    }

    #[test]
    fn test_plan_does_not_mark_refresh() {
        let mgr = QuoteManager::new(QuoteConfig::default());
        let plan = mgr.generate_plan_at("BTC", mid(), None, t0());
        assert!(plan.refresh_due);
        assert!(mgr.should_refresh_at("BTC", t0()));
    }

    #[test]
    fn test_neutral_plan() {
        let mut mgr = QuoteManager::new(QuoteConfig::default());
        mgr.mark_refreshed_at("BTC", t0());
        let plan = mgr.generate_plan_at("BTC", mid(), None, t0() + Duration::seconds(5));

        assert_eq!(plan.asset, "BTC");
        assert!(plan.directional_signal.is_none());
        assert_eq!(plan.bids.len(), 3);
        assert_eq!(plan.total_bid_usd, dec!(300));
        assert_eq!(plan.total_ask_usd, dec!(300));
        assert!(!plan.refresh_due);
        assert!(plan.inventory_adjustment.is_none());
        assert_eq!(
            plan.rationale,
            "Market making with 3 levels, 10bps spread. Neutral (no directional signal). Mid price: $100.00"
        );
    }

    #[test]
    fn test_hold_signal_is_neutral() {
        let mgr = QuoteManager::new(QuoteConfig::default());
        let hold = SignalResult::hold("HOLD: EMAs aligned, no clear trend");
        let plan = mgr.generate_plan_at("BTC", mid(), Some(&hold), t0());
        assert!(plan.directional_signal.is_none());
        assert_eq!(plan.total_bid_usd, plan.total_ask_usd);
    }

    #[test]
    fn test_buy_plan_rationale_and_totals() {
        let mgr = QuoteManager::new(QuoteConfig::default());
        let plan = mgr.generate_plan_at("ETH", mid(), Some(&buy_signal()), t0());

        assert_eq!(plan.directional_signal, Some(Signal::Buy));
        assert_eq!(plan.total_bid_usd, dec!(390));
        assert_eq!(plan.total_ask_usd, dec!(210));
        assert_eq!(
            plan.rationale,
            "Market making with 3 levels, 10bps spread. Directional bias: BUY (skewing bid sizes by 30%). Mid price: $100.00"
        );
    }

    #[test]
    fn test_sell_plan_rationale() {
        let mgr = QuoteManager::new(QuoteConfig::default());
        let sell = SignalResult {
            signal: Signal::Sell,
            ..Default::default()
        };
        let plan = mgr.generate_plan_at("ETH", Price::new(dec!(2500.5)), Some(&sell), t0());
        assert!(plan
            .rationale
            .contains("Directional bias: SELL (skewing ask sizes by 30%)"));
        assert!(plan.rationale.ends_with("Mid price: $2500.50"));
    }

    #[test]
    fn test_combine_with_signal() {
        let mgr = QuoteManager::new(QuoteConfig::default());
        let signal = buy_signal();
        let hybrid = mgr.combine_with_signal_at("BTC", mid(), &signal, t0());

        assert_eq!(hybrid.plan.directional_signal, Some(Signal::Buy));
        assert_eq!(hybrid.signal_context.signal, Signal::Buy);
        assert_eq!(hybrid.signal_context.stop_loss, Some(93.0));
        assert_eq!(hybrid.signal_context.take_profit, Some(114.0));
        assert_eq!(
            hybrid.combined_rationale,
            format!("{} | Trader XO: {}", hybrid.plan.rationale, signal.rationale)
        );
        // The plan carried inside is not inventory-adjusted
        assert!(hybrid.plan.inventory_adjustment.is_none());
    }

    #[test]
    fn test_combine_with_empty_rationale() {
        let mgr = QuoteManager::new(QuoteConfig::default());
        let signal = SignalResult::default();
        let hybrid = mgr.combine_with_signal_at("BTC", mid(), &signal, t0());
        assert_eq!(hybrid.combined_rationale, hybrid.plan.rationale);
    }

    #[test]
    fn test_hybrid_plan_serializes_flat() {
        let mgr = QuoteManager::new(QuoteConfig::default());
        let hybrid = mgr.combine_with_signal_at("BTC", mid(), &buy_signal(), t0());
        let json = serde_json::to_value(&hybrid).unwrap();

        assert_eq!(json["asset"], "BTC");
        assert_eq!(json["directional_signal"], "buy");
        assert_eq!(json["signal_context"]["signal"], "buy");
        assert!(json["combined_rationale"]
            .as_str()
            .unwrap()
            .contains(" | Trader XO: BUY"));
    }
}
