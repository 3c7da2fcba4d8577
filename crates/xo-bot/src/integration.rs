//! Strategy integration.
//!
//! Turns per-asset market data into trade decision records that an order
//! layer can act on. Allocation is left to the caller.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};
use xo_core::{Signal, SignalResult, StochRsi};
use xo_signal::{IndicatorSource, SignalConfig, SignalEngine};

use crate::error::{AppError, AppResult};

/// Name of the Trader XO strategy.
pub const TRADER_XO: &str = "trader_xo";

/// Market data for one asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    #[serde(default)]
    pub current_price: Option<f64>,
    /// Closes, oldest first.
    #[serde(default)]
    pub price_history: Vec<f64>,
}

impl MarketData {
    pub fn new(current_price: f64, price_history: Vec<f64>) -> Self {
        Self {
            current_price: Some(current_price),
            price_history,
        }
    }

    /// Current price when it is usable and history is present.
    fn usable_price(&self) -> Option<f64> {
        self.current_price
            .filter(|p| p.is_finite() && *p > 0.0)
            .filter(|_| !self.price_history.is_empty())
    }
}

/// Trade decision for one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeDecision {
    pub asset: String,
    pub action: Signal,
    /// Always 0.0; sizing belongs to the allocation layer.
    pub allocation_usd: f64,
    pub tp_price: Option<f64>,
    pub sl_price: Option<f64>,
    pub exit_plan: String,
    pub rationale: String,
    pub strategy: String,
    pub fast_ema: Option<f64>,
    pub slow_ema: Option<f64>,
    pub stoch_rsi: Option<StochRsi>,
}

impl TradeDecision {
    /// The signal fields of this decision, e.g. to bias a quote plan.
    pub fn to_signal_result(&self) -> SignalResult {
        SignalResult {
            signal: self.action,
            rationale: self.rationale.clone(),
            stop_loss: self.sl_price,
            take_profit: self.tp_price,
            fast_ema: self.fast_ema,
            slow_ema: self.slow_ema,
            ma_filter: None,
            stoch_rsi: self.stoch_rsi,
        }
    }
}

/// Runs a named strategy across assets.
pub struct StrategyIntegration {
    strategy_name: String,
    engine: SignalEngine,
}

impl StrategyIntegration {
    /// Create an integration for `strategy_name`.
    ///
    /// Only [`TRADER_XO`] is supported. `config` is validated here.
    pub fn new(strategy_name: &str, config: SignalConfig) -> AppResult<Self> {
        if strategy_name != TRADER_XO {
            return Err(AppError::UnknownStrategy(strategy_name.to_string()));
        }
        config.validate()?;

        info!(strategy = strategy_name, "Strategy integration initialized");
        Ok(Self {
            strategy_name: strategy_name.to_string(),
            engine: SignalEngine::new(config),
        })
    }

    pub fn strategy_name(&self) -> &str {
        &self.strategy_name
    }

    pub fn engine(&self) -> &SignalEngine {
        &self.engine
    }

    /// One decision per entry of `assets`, in order.
    ///
    /// Each asset is evaluated once; call once per completed bar.
    pub fn generate_trade_decisions(
        &self,
        assets: &[String],
        market_data: &HashMap<String, MarketData>,
        source: Option<&dyn IndicatorSource>,
        interval: &str,
    ) -> Vec<TradeDecision> {
        assets
            .iter()
            .map(|asset| self.decide(asset, market_data.get(asset), source, interval))
            .collect()
    }

    fn decide(
        &self,
        asset: &str,
        data: Option<&MarketData>,
        source: Option<&dyn IndicatorSource>,
        interval: &str,
    ) -> TradeDecision {
        let Some((data, price)) = data.and_then(|d| d.usable_price().map(|p| (d, p))) else {
            warn!(asset, "Insufficient market data, skipping");
            return TradeDecision {
                asset: asset.to_string(),
                action: Signal::Hold,
                allocation_usd: 0.0,
                tp_price: None,
                sl_price: None,
                exit_plan: String::new(),
                rationale: format!("Insufficient market data for {asset}"),
                strategy: self.strategy_name.clone(),
                fast_ema: None,
                slow_ema: None,
                stoch_rsi: None,
            };
        };

        let analysis = self
            .engine
            .analyze(asset, price, &data.price_history, source, interval);

        info!(
            asset,
            action = analysis.signal.label(),
            rationale = %analysis.rationale,
            "Trade decision"
        );

        TradeDecision {
            asset: asset.to_string(),
            action: analysis.signal,
            allocation_usd: 0.0,
            tp_price: analysis.take_profit,
            sl_price: analysis.stop_loss,
            exit_plan: self.exit_plan(&analysis),
            rationale: analysis.rationale,
            strategy: self.strategy_name.clone(),
            fast_ema: analysis.fast_ema,
            slow_ema: analysis.slow_ema,
            stoch_rsi: analysis.stoch_rsi,
        }
    }

    fn exit_plan(&self, analysis: &SignalResult) -> String {
        let config = self.engine.config();
        let mut parts = Vec::new();

        if let Some(sl) = analysis.stop_loss {
            parts.push(format!("SL at {sl:.2}"));
        }
        if let Some(tp) = analysis.take_profit {
            parts.push(format!("TP at {tp:.2}"));
        }

        let reversal = match analysis.signal {
            Signal::Buy => Some("below"),
            Signal::Sell => Some("above"),
            Signal::Hold => None,
        };
        if let Some(direction) = reversal {
            parts.push(format!(
                "Exit if Fast EMA({}) crosses {direction} Slow EMA({})",
                config.fast_ema_period, config.slow_ema_period
            ));
        }

        if parts.is_empty() {
            "Hold until signal reversal".to_string()
        } else {
            parts.join("; ")
        }
    }

    /// Human-readable summary of the stored indicators for `asset`.
    pub fn format_strategy_context(&self, asset: &str) -> String {
        let config = self.engine.config();
        let mut lines = vec![format!("\n=== Trader XO Strategy Indicators for {asset} ===")];

        let Some(state) = self.engine.state(asset) else {
            return lines.join("\n");
        };

        if let (Some(fast), Some(slow)) = (state.last_fast_ema, state.last_slow_ema) {
            lines.push(format!("Fast EMA({}): {fast:.2}", config.fast_ema_period));
            lines.push(format!("Slow EMA({}): {slow:.2}", config.slow_ema_period));
            let trend = if fast > slow { "Bullish" } else { "Bearish" };
            lines.push(format!("EMA Trend: {trend}"));
        }

        if let Some(stoch) = state.last_stoch_rsi {
            lines.push(format!("Stochastic RSI K: {:.2}", stoch.k));
            lines.push(format!("Stochastic RSI D: {:.2}", stoch.d));

            let momentum = if stoch.k > config.stoch_upper_band {
                "Overbought"
            } else if stoch.k < config.stoch_lower_band {
                "Oversold"
            } else {
                "Neutral"
            };
            lines.push(format!("Momentum: {momentum}"));
        }

        lines.join("\n")
    }
}
