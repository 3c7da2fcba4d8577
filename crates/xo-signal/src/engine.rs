//! Trader XO signal engine.
//!
//! Emits a buy on the first evaluation after the fast EMA crosses above the
//! slow EMA, a sell on the mirror, and hold otherwise. Two optional gates can
//! suppress a fresh crossover:
//! - MA filter: buys need price above the trend average, sells below.
//! - Stochastic RSI: the K line must cross D on the right side of the middle
//!   band relative to the previous evaluation's K/D.
//!
//! Callers must evaluate each asset at most once per completed bar. The
//! debounce counters advance on every call, so evaluating the same bar twice
//! can suppress a crossover.

use tracing::{debug, info, warn};
use xo_core::{Signal, SignalResult, StochRsi};
use xo_indicators::{ema, stochastic_rsi};
use xo_telemetry::Metrics;

use crate::config::SignalConfig;
use crate::source::{IndicatorParams, IndicatorSource};
use crate::state::{AssetSignalState, SignalStateStore};

/// Fallback risk as a fraction of price when no stop is placed.
const DEFAULT_RISK_FRACTION: f64 = 0.07;

/// Take-profit distance in multiples of risk.
const REWARD_RISK_RATIO: f64 = 2.0;

/// Current and previous-bar value of one EMA.
#[derive(Debug, Clone, Copy, PartialEq)]
struct EmaPair {
    current: Option<f64>,
    previous: Option<f64>,
}

impl EmaPair {
    fn local(prices: &[f64], period: usize) -> Self {
        let without_last = prices.split_last().map(|(_, rest)| rest).unwrap_or(&[]);
        Self {
            current: ema(prices, period),
            previous: ema(without_last, period),
        }
    }

    /// From a newest-first series; `None` with fewer than two values.
    fn from_series(series: &[f64]) -> Option<Self> {
        match series {
            [current, previous, ..] => Some(Self {
                current: Some(*current),
                previous: Some(*previous),
            }),
            _ => None,
        }
    }
}

/// Stochastic K/D crosses relative to the previous evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct StochCross {
    up: bool,
    down: bool,
}

impl StochCross {
    /// Without a stored reading the previous K/D equals the current one, so
    /// no cross is reported.
    fn detect(previous: Option<StochRsi>, current: StochRsi, middle_band: f64) -> Self {
        let prev = previous.unwrap_or(current);
        let (k, d) = (current.k, current.d);
        Self {
            up: prev.k <= prev.d && k > d && (k < middle_band || d < middle_band),
            down: prev.k >= prev.d && k < d && (k > middle_band || d > middle_band),
        }
    }
}

/// Trader XO signal engine.
///
/// Holds per-asset debounce state; one engine should own each asset's
/// evaluations for the lifetime of the process.
pub struct SignalEngine {
    config: SignalConfig,
    states: SignalStateStore,
}

impl SignalEngine {
    pub fn new(config: SignalConfig) -> Self {
        info!(
            fast = config.fast_ema_period,
            slow = config.slow_ema_period,
            ma_filter = %config.ma_filter_type,
            ma_filter_period = config.ma_filter_period,
            stoch_confirmation = config.use_stoch_confirmation,
            "Initialized Trader XO signal engine"
        );
        Self {
            config,
            states: SignalStateStore::new(),
        }
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Snapshot of the stored state for `asset`.
    pub fn state(&self, asset: &str) -> Option<AssetSignalState> {
        self.states.get(asset)
    }

    /// Forget `asset`; its next evaluation starts from idle.
    pub fn reset(&self, asset: &str) -> bool {
        self.states.remove(asset)
    }

    /// Evaluate one completed bar for `asset`.
    ///
    /// `prices` are closes oldest first; `current_price` is checked against
    /// the MA filter and anchors stops. Never fails: missing history or a
    /// failing `source` degrade to hold or to local computation.
    ///
    /// Every call advances the asset's debounce state, so call at most once
    /// per completed bar.
    pub fn analyze(
        &self,
        asset: &str,
        current_price: f64,
        prices: &[f64],
        source: Option<&dyn IndicatorSource>,
        interval: &str,
    ) -> SignalResult {
        let cfg = &self.config;

        let needed = cfg.min_history();
        if prices.is_empty() || prices.len() < needed {
            let result =
                SignalResult::hold(format!("Insufficient price data (need {needed} bars)"));
            debug!(asset, bars = prices.len(), needed, "Not enough history for signal");
            Metrics::signal(asset, "hold");
            return result;
        }

        let entry = self.states.entry(asset);
        let mut state = entry.lock();

        let (fast, slow) = self.resolve_emas(asset, prices, source, interval);
        let (Some(fast_cur), Some(fast_prev), Some(slow_cur), Some(slow_prev)) =
            (fast.current, fast.previous, slow.current, slow.previous)
        else {
            Metrics::signal(asset, "hold");
            return SignalResult::hold("Unable to calculate EMAs");
        };

        let mut result = SignalResult {
            fast_ema: Some(fast_cur),
            slow_ema: Some(slow_cur),
            ..Default::default()
        };
        Metrics::ema_gap(asset, fast_cur - slow_cur);

        let bullish_cross = fast_prev <= slow_prev && fast_cur > slow_cur;
        let bearish_cross = fast_prev >= slow_prev && fast_cur < slow_cur;

        let debounce = state.debounce.advance(fast_cur, slow_cur);
        let buy_signal = debounce.buy_eligible() && bullish_cross;
        let sell_signal = debounce.sell_eligible() && bearish_cross;

        let mut stoch_confirmed = true;
        let stoch = if cfg.use_stoch_confirmation {
            stochastic_rsi(prices, &cfg.stoch_params())
        } else {
            None
        };
        if let Some(current) = stoch {
            result.stoch_rsi = Some(current);
            let cross =
                StochCross::detect(state.last_stoch_rsi, current, cfg.stoch_middle_band);
            if (buy_signal && !cross.up) || (sell_signal && !cross.down) {
                stoch_confirmed = false;
            }
        }

        let candidate = if buy_signal {
            Some(Signal::Buy)
        } else if sell_signal {
            Some(Signal::Sell)
        } else {
            None
        };

        if let Some(side) = candidate {
            self.resolve_candidate(asset, side, current_price, prices, stoch_confirmed, &mut result);
        } else {
            result.rationale = if fast_cur > slow_cur {
                "HOLD: Bullish trend (Fast EMA > Slow EMA), waiting for signal".to_string()
            } else if fast_cur < slow_cur {
                "HOLD: Bearish trend (Fast EMA < Slow EMA), waiting for signal".to_string()
            } else {
                "HOLD: EMAs aligned, no clear trend".to_string()
            };
            debug!(
                asset,
                fast_ema = fast_cur,
                slow_ema = slow_cur,
                buy_count = debounce.buy_count(),
                sell_count = debounce.sell_count(),
                "No crossover"
            );
        }

        *state = AssetSignalState {
            debounce,
            last_fast_ema: Some(fast_cur),
            last_slow_ema: Some(slow_cur),
            last_stoch_rsi: stoch.or(state.last_stoch_rsi),
        };

        Metrics::signal(asset, &result.signal.to_string());
        result
    }

    /// Fast and slow EMA pairs, preferring `source` when given.
    fn resolve_emas(
        &self,
        asset: &str,
        prices: &[f64],
        source: Option<&dyn IndicatorSource>,
        interval: &str,
    ) -> (EmaPair, EmaPair) {
        let fast_period = self.config.fast_ema_period;
        let slow_period = self.config.slow_ema_period;

        let Some(source) = source else {
            return (
                EmaPair::local(prices, fast_period),
                EmaPair::local(prices, slow_period),
            );
        };

        let symbol = format!("{asset}/USDT");
        let fetch = |period: usize| {
            source.fetch_series("ema", &symbol, interval, 2, &IndicatorParams::period(period))
        };

        match fetch(fast_period).and_then(|fast| Ok((fast, fetch(slow_period)?))) {
            Ok((fast_series, slow_series)) => {
                let fast = EmaPair::from_series(&fast_series).unwrap_or_else(|| {
                    debug!(asset, period = fast_period, "Short EMA series, computing locally");
                    EmaPair::local(prices, fast_period)
                });
                let slow = EmaPair::from_series(&slow_series).unwrap_or_else(|| {
                    debug!(asset, period = slow_period, "Short EMA series, computing locally");
                    EmaPair::local(prices, slow_period)
                });
                (fast, slow)
            }
            Err(e) => {
                warn!(asset, error = %e, "Indicator source EMA fetch failed, using local calculation");
                Metrics::indicator_fallback(asset);
                (
                    EmaPair::local(prices, fast_period),
                    EmaPair::local(prices, slow_period),
                )
            }
        }
    }

    /// Trend filter check. Returns whether `side` passes and the filter value.
    fn check_ma_filter(
        &self,
        asset: &str,
        current_price: f64,
        prices: &[f64],
        side: Signal,
    ) -> (bool, Option<f64>) {
        let filter = self.config.ma_filter_type;
        if !filter.is_enabled() {
            return (true, None);
        }

        let Some(value) = filter.compute(prices, self.config.ma_filter_period) else {
            warn!(
                asset,
                filter = %filter,
                period = self.config.ma_filter_period,
                bars = prices.len(),
                "MA filter value unavailable, allowing trade"
            );
            return (true, None);
        };

        let pass = match side {
            Signal::Buy => current_price > value,
            Signal::Sell => current_price < value,
            Signal::Hold => true,
        };
        (pass, Some(value))
    }

    /// Apply the gates to a fresh crossover and fill in `result`.
    fn resolve_candidate(
        &self,
        asset: &str,
        side: Signal,
        current_price: f64,
        prices: &[f64],
        stoch_confirmed: bool,
        result: &mut SignalResult,
    ) {
        let cfg = &self.config;
        let (ma_pass, ma_value) = self.check_ma_filter(asset, current_price, prices, side);
        result.ma_filter = ma_value;

        let direction = if side == Signal::Sell { "below" } else { "above" };

        if !(ma_pass && stoch_confirmed) {
            let mut reasons = Vec::new();
            if !ma_pass {
                // A blocked buy sits below the filter, a blocked sell above it.
                let position = if side == Signal::Sell { "above" } else { "below" };
                reasons.push(format!(
                    "price {position} {}({})",
                    cfg.ma_filter_type, cfg.ma_filter_period
                ));
                Metrics::signal_blocked(asset, "ma_filter");
            }
            if !stoch_confirmed {
                reasons.push("StochRSI not confirmed".to_string());
                Metrics::signal_blocked(asset, "stoch_rsi");
            }
            result.rationale = format!(
                "{} signal filtered out: {}",
                side.label(),
                reasons.join(", ")
            );
            info!(asset, signal = %side, rationale = %result.rationale, "Crossover blocked");
            return;
        }

        let (Some(fast), Some(slow)) = (result.fast_ema, result.slow_ema) else {
            return;
        };

        let mut rationale = format!(
            "{}: Fast EMA({})={:.2} crossed {direction} Slow EMA({})={:.2}. ",
            side.label(),
            cfg.fast_ema_period,
            fast,
            cfg.slow_ema_period,
            slow
        );
        if cfg.ma_filter_type.is_enabled() {
            rationale.push_str(&format!(
                "Price {direction} {}({}). ",
                cfg.ma_filter_type, cfg.ma_filter_period
            ));
        }
        if cfg.use_stoch_confirmation && result.stoch_rsi.is_some() {
            rationale.push_str("StochRSI K/D crossover confirmed. ");
        }

        let (stop_loss, take_profit) = self.exit_levels(side, current_price);

        result.signal = side;
        result.rationale = rationale;
        result.stop_loss = stop_loss;
        result.take_profit = Some(take_profit);

        info!(
            asset,
            signal = %side,
            price = current_price,
            fast_ema = fast,
            slow_ema = slow,
            stop_loss = ?stop_loss,
            take_profit,
            "Trader XO signal"
        );
    }

    /// Stop and target for an entry at `price`.
    ///
    /// Target sits at twice the stop distance; without a stop, risk is 7% of
    /// price.
    fn exit_levels(&self, side: Signal, price: f64) -> (Option<f64>, f64) {
        let sl = self.config.stop_loss_percent / 100.0;
        let (stop_loss, sign) = match side {
            Signal::Sell => (price * (1.0 + sl), -1.0),
            _ => (price * (1.0 - sl), 1.0),
        };
        let stop_loss = self.config.use_stop_loss.then_some(stop_loss);

        let risk = match stop_loss {
            Some(stop) if stop != 0.0 => (price - stop).abs(),
            _ => price * DEFAULT_RISK_FRACTION,
        };
        (stop_loss, price + sign * REWARD_RISK_RATIO * risk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::source::MockIndicatorSource;
    use crate::state::DebounceState;
    use xo_indicators::MaFilterType;

    const EPS: f64 = 1e-9;

    fn no_filter() -> SignalConfig {
        SignalConfig {
            ma_filter_type: MaFilterType::Off,
            ..Default::default()
        }
    }

    /// Linear path through `points`, `steps` bars per leg.
    fn path(points: &[f64], steps: usize) -> Vec<f64> {
        let mut prices = vec![points[0]];
        for pair in points.windows(2) {
            let step = (pair[1] - pair[0]) / steps as f64;
            for i in 1..=steps {
                prices.push(pair[0] + step * i as f64);
            }
        }
        prices
    }

    /// Evaluate every prefix of `prices` as one bar each.
    fn replay(engine: &SignalEngine, asset: &str, prices: &[f64]) -> Vec<SignalResult> {
        (1..=prices.len())
            .map(|n| engine.analyze(asset, prices[n - 1], &prices[..n], None, "5m"))
            .collect()
    }

    fn first_index(results: &[SignalResult], signal: Signal) -> Option<usize> {
        results.iter().position(|r| r.signal == signal)
    }

    #[test]
    fn test_insufficient_history_leaves_state_untouched() {
        let engine = SignalEngine::new(SignalConfig::default());
        let prices = vec![100.0; 24];

        let result = engine.analyze("BTC", 100.0, &prices, None, "5m");
        assert!(result.is_hold());
        assert_eq!(result.rationale, "Insufficient price data (need 25 bars)");
        assert!(result.fast_ema.is_none());
        assert!(engine.state("BTC").is_none());

        let result = engine.analyze("BTC", 100.0, &[], None, "5m");
        assert!(result.is_hold());
    }

    #[test]
    fn test_exactly_slow_period_cannot_compute_previous_ema() {
        let engine = SignalEngine::new(SignalConfig::default());
        let prices = vec![100.0; 25];

        let result = engine.analyze("BTC", 100.0, &prices, None, "5m");
        assert!(result.is_hold());
        assert_eq!(result.rationale, "Unable to calculate EMAs");
        assert_eq!(engine.state("BTC").unwrap(), AssetSignalState::default());
    }

    #[test]
    fn test_flat_prices_hold_aligned() {
        let engine = SignalEngine::new(SignalConfig::default());
        let prices = vec![100.0; 40];

        let result = engine.analyze("BTC", 100.0, &prices, None, "5m");
        assert!(result.is_hold());
        assert_eq!(result.rationale, "HOLD: EMAs aligned, no clear trend");
        assert!((result.fast_ema.unwrap() - 100.0).abs() < EPS);
        assert_eq!(engine.state("BTC").unwrap().debounce, DebounceState::Idle);
    }

    #[test]
    fn test_rise_then_fall_emits_one_buy_then_one_sell() {
        let engine = SignalEngine::new(no_filter());
        let prices = path(&[100.0, 80.0, 120.0, 80.0], 60);
        let results = replay(&engine, "BTC", &prices);

        let buys = results.iter().filter(|r| r.signal == Signal::Buy).count();
        let sells = results.iter().filter(|r| r.signal == Signal::Sell).count();
        assert_eq!(buys, 1);
        assert_eq!(sells, 1);

        let buy_at = first_index(&results, Signal::Buy).unwrap();
        let sell_at = first_index(&results, Signal::Sell).unwrap();
        assert!(buy_at > 60, "buy must follow the first low");
        assert!(sell_at > 120, "sell must follow the high");
        assert!(buy_at < sell_at);

        let buy = &results[buy_at];
        assert!(buy.rationale.starts_with("BUY: Fast EMA(12)="));
        assert!(buy.rationale.contains("crossed above Slow EMA(25)="));
        assert!(!buy.rationale.contains("Price above"));

        // Regime continues after the flip without re-firing
        assert_eq!(
            results[buy_at + 1].rationale,
            "HOLD: Bullish trend (Fast EMA > Slow EMA), waiting for signal"
        );
        assert_eq!(
            results[sell_at + 1].rationale,
            "HOLD: Bearish trend (Fast EMA < Slow EMA), waiting for signal"
        );

        let state = engine.state("BTC").unwrap();
        assert!(state.sell_count() > 1);
        assert_eq!(state.buy_count(), 0);
    }

    #[test]
    fn test_stops_on_buy() {
        let engine = SignalEngine::new(no_filter());
        let prices = path(&[100.0, 80.0, 120.0], 60);
        let results = replay(&engine, "ETH", &prices);
        let buy = &results[first_index(&results, Signal::Buy).unwrap()];
        let price = prices[first_index(&results, Signal::Buy).unwrap()];

        let stop = buy.stop_loss.unwrap();
        assert!((stop - price * 0.93).abs() < EPS);
        assert!((buy.take_profit.unwrap() - (price + 2.0 * (price - stop))).abs() < EPS);
    }

    #[test]
    fn test_stops_on_sell_without_stop_loss() {
        let config = SignalConfig {
            use_stop_loss: false,
            ..no_filter()
        };
        let engine = SignalEngine::new(config);
        let prices = path(&[80.0, 100.0, 70.0], 60);
        let results = replay(&engine, "ETH", &prices);
        let sell_at = first_index(&results, Signal::Sell).unwrap();
        let sell = &results[sell_at];
        let price = prices[sell_at];

        assert!(sell.stop_loss.is_none());
        assert!((sell.take_profit.unwrap() - price * (1.0 - 2.0 * 0.07)).abs() < EPS);
    }

    #[test]
    fn test_ma_filter_blocks_counter_trend_buy() {
        let config = SignalConfig {
            ma_filter_period: 100,
            ..Default::default()
        };
        let engine = SignalEngine::new(config);
        // Long decline keeps EMA(100) far above price through the bounce
        let mut prices = path(&[200.0, 100.0], 150);
        prices.extend(path(&[100.0, 130.0], 30).into_iter().skip(1));
        let results = replay(&engine, "SOL", &prices);

        assert!(first_index(&results, Signal::Buy).is_none());
        let blocked = results
            .iter()
            .find(|r| r.rationale.starts_with("BUY signal filtered out"))
            .unwrap();
        assert_eq!(
            blocked.rationale,
            "BUY signal filtered out: price below EMA(100)"
        );
        assert!(blocked.ma_filter.unwrap() > prices[prices.len() - 1] - 30.0);
    }

    #[test]
    fn test_ma_filter_unavailable_passes() {
        // Default EMA(200) cannot be computed on 121 bars
        let engine = SignalEngine::new(SignalConfig::default());
        let prices = path(&[100.0, 80.0, 120.0], 60);
        let results = replay(&engine, "BTC", &prices);

        let buy = &results[first_index(&results, Signal::Buy).unwrap()];
        assert!(buy.ma_filter.is_none());
        assert!(buy.rationale.contains("Price above EMA(200). "));
    }

    #[test]
    fn test_stoch_confirmation_blocks_cold_start_cross() {
        // Locate the crossover bar with the gate off
        let prices = path(&[100.0, 80.0, 120.0], 60);
        let plain = SignalEngine::new(no_filter());
        let buy_at = first_index(&replay(&plain, "BTC", &prices), Signal::Buy).unwrap();

        // A fresh engine sees the same cross with no stored K/D
        let config = SignalConfig {
            use_stoch_confirmation: true,
            ..no_filter()
        };
        let engine = SignalEngine::new(config);
        let bar = &prices[..=buy_at];
        let result = engine.analyze("BTC", prices[buy_at], bar, None, "5m");

        assert!(result.is_hold());
        assert_eq!(result.rationale, "BUY signal filtered out: StochRSI not confirmed");
        assert!(result.stoch_rsi.is_some());
        assert_eq!(engine.state("BTC").unwrap().last_stoch_rsi, result.stoch_rsi);
    }

    /// Source serving fixed newest-first EMA pairs for the fast and slow periods.
    fn ema_source(fast: [f64; 2], slow: [f64; 2]) -> MockIndicatorSource {
        let mut source = MockIndicatorSource::new();
        source
            .expect_fetch_series()
            .times(2)
            .returning(move |_, _, _, _, params| match params.period {
                12 => Ok(fast.to_vec()),
                _ => Ok(slow.to_vec()),
            });
        source
    }

    #[test]
    fn test_stoch_confirmation_uses_previous_reading() {
        // RSI(1) is 100 on flat or rising bars and 0 on falling ones, so with
        // a 2-bar stochastic, K=1 and D=2 the readings are:
        //   ..., 100, 99 -> K 0, D 25
        //   ..., 99, 98  -> K 50, D 25 (K crosses above D below the middle band)
        let config = SignalConfig {
            use_stoch_confirmation: true,
            stoch_rsi_length: 1,
            stoch_length: 2,
            stoch_rsi_k: 1,
            stoch_rsi_d: 2,
            ..no_filter()
        };
        let engine = SignalEngine::new(config);
        let mut prices = vec![100.0; 30];

        prices.push(99.0);
        let below = ema_source([99.0, 99.0], [100.0, 100.0]);
        let first = engine.analyze(
            "BTC",
            99.0,
            &prices,
            Some(&below as &dyn IndicatorSource),
            "5m",
        );
        assert!(first.is_hold());
        assert_eq!(first.stoch_rsi, Some(StochRsi { k: 0.0, d: 25.0 }));

        prices.push(98.0);
        let crossing = ema_source([101.0, 99.0], [100.0, 100.0]);
        let second = engine.analyze(
            "BTC",
            98.0,
            &prices,
            Some(&crossing as &dyn IndicatorSource),
            "5m",
        );

        assert_eq!(second.signal, Signal::Buy);
        assert_eq!(second.stoch_rsi, Some(StochRsi { k: 50.0, d: 25.0 }));
        assert_eq!(
            second.rationale,
            "BUY: Fast EMA(12)=101.00 crossed above Slow EMA(25)=100.00. \
             StochRSI K/D crossover confirmed. "
        );
        assert!((second.stop_loss.unwrap() - 98.0 * 0.93).abs() < EPS);
        assert_eq!(
            engine.state("BTC").unwrap().last_stoch_rsi,
            Some(StochRsi { k: 50.0, d: 25.0 })
        );
    }

    #[test]
    fn test_ma_filter_blocks_counter_trend_sell() {
        let config = SignalConfig {
            ma_filter_period: 5,
            ..Default::default()
        };
        let engine = SignalEngine::new(config);
        let prices = vec![100.0; 30];

        let above = ema_source([101.0, 101.0], [100.0, 100.0]);
        let first = engine.analyze(
            "ETH",
            105.0,
            &prices,
            Some(&above as &dyn IndicatorSource),
            "5m",
        );
        assert!(first.is_hold());

        let crossing = ema_source([99.0, 101.0], [100.0, 100.0]);
        let second = engine.analyze(
            "ETH",
            105.0,
            &prices,
            Some(&crossing as &dyn IndicatorSource),
            "5m",
        );

        assert!(second.is_hold());
        assert_eq!(second.rationale, "SELL signal filtered out: price above EMA(5)");
        assert!((second.ma_filter.unwrap() - 100.0).abs() < EPS);
        assert!(second.stop_loss.is_none());
        assert!(second.take_profit.is_none());
        assert_eq!(engine.state("ETH").unwrap().sell_count(), 1);
    }

    #[test]
    fn test_stoch_cross_detection() {
        let mid = 50.0;
        let low_up = StochRsi { k: 30.0, d: 25.0 };

        // No previous reading: never a cross
        assert_eq!(StochCross::detect(None, low_up, mid), StochCross::default());

        let cross = StochCross::detect(Some(StochRsi { k: 20.0, d: 25.0 }), low_up, mid);
        assert!(cross.up);
        assert!(!cross.down);

        // Crossing up entirely above the middle band does not count
        let high_up = StochRsi { k: 80.0, d: 75.0 };
        let cross = StochCross::detect(Some(StochRsi { k: 70.0, d: 75.0 }), high_up, mid);
        assert!(!cross.up);

        let high_down = StochRsi { k: 70.0, d: 75.0 };
        let cross = StochCross::detect(Some(StochRsi { k: 80.0, d: 75.0 }), high_down, mid);
        assert!(cross.down);
    }

    #[test]
    fn test_source_values_preferred() {
        let mut source = MockIndicatorSource::new();
        source
            .expect_fetch_series()
            .times(2)
            .returning(|_, symbol, _, count, params| {
                assert_eq!(symbol, "BTC/USDT");
                assert_eq!(count, 2);
                match params.period {
                    12 => Ok(vec![101.0, 99.0]),
                    _ => Ok(vec![100.0, 100.0]),
                }
            });

        let engine = SignalEngine::new(no_filter());
        let prices = vec![100.0; 30];
        let result = engine.analyze(
            "BTC",
            100.0,
            &prices,
            Some(&source as &dyn IndicatorSource),
            "5m",
        );

        assert_eq!(result.signal, Signal::Buy);
        assert_eq!(result.fast_ema, Some(101.0));
        assert_eq!(result.slow_ema, Some(100.0));
    }

    #[test]
    fn test_source_short_series_falls_back_per_ema() {
        let mut source = MockIndicatorSource::new();
        source
            .expect_fetch_series()
            .returning(|_, _, _, _, params| match params.period {
                12 => Ok(vec![105.0]),
                _ => Ok(vec![90.0, 110.0]),
            });

        let engine = SignalEngine::new(no_filter());
        let prices = vec![100.0; 30];
        let result = engine.analyze(
            "BTC",
            100.0,
            &prices,
            Some(&source as &dyn IndicatorSource),
            "5m",
        );

        // Fast computed locally from flat prices, slow taken from the source
        assert!((result.fast_ema.unwrap() - 100.0).abs() < EPS);
        assert_eq!(result.slow_ema, Some(90.0));
    }

    #[test]
    fn test_source_error_falls_back_to_local() {
        let mut source = MockIndicatorSource::new();
        source
            .expect_fetch_series()
            .returning(|_, _, _, _, _| Err(SourceError::Request("HTTP 503".to_string())));

        let prices = path(&[100.0, 80.0, 120.0], 60);
        let with_source = SignalEngine::new(no_filter());
        let local = SignalEngine::new(no_filter());

        for n in 26..=prices.len() {
            let a = with_source.analyze(
                "BTC",
                prices[n - 1],
                &prices[..n],
                Some(&source as &dyn IndicatorSource),
                "5m",
            );
            let b = local.analyze("BTC", prices[n - 1], &prices[..n], None, "5m");
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_reset_clears_state() {
        let engine = SignalEngine::new(no_filter());
        let prices = path(&[100.0, 80.0], 40);
        replay(&engine, "BTC", &prices);
        assert!(engine.state("BTC").unwrap().sell_count() > 0);

        assert!(engine.reset("BTC"));
        assert!(engine.state("BTC").is_none());
    }

    #[test]
    fn test_assets_are_independent() {
        let engine = SignalEngine::new(no_filter());
        replay(&engine, "BTC", &path(&[100.0, 80.0], 40));
        replay(&engine, "ETH", &path(&[80.0, 100.0], 40));

        assert!(engine.state("BTC").unwrap().sell_count() > 0);
        assert!(engine.state("ETH").unwrap().buy_count() > 0);
    }
}
