//! RSI and Stochastic RSI.
//!
//! RSI = 100 - (100 / (1 + RS)), RS = average gain / average loss over the
//! trailing `period` price changes (simple averages, no Wilder smoothing).

use serde::{Deserialize, Serialize};
use xo_core::StochRsi;

/// RSI at the last price.
///
/// Returns `None` with fewer than `period + 1` prices. Returns 100.0 when
/// there were no losses in the window.
pub fn rsi(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period + 1 {
        return None;
    }

    let window = &prices[prices.len() - (period + 1)..];
    let (gains, losses) = window
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .fold((0.0, 0.0), |(gain, loss), change| {
            if change > 0.0 {
                (gain + change, loss)
            } else {
                (gain, loss + change.abs())
            }
        });

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}

/// Stochastic RSI lookbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StochRsiParams {
    /// RSI window.
    pub rsi_length: usize,
    /// Rolling max/min window over the RSI series.
    pub stoch_length: usize,
    /// K smoothing.
    pub k: usize,
    /// D smoothing.
    pub d: usize,
}

impl Default for StochRsiParams {
    fn default() -> Self {
        Self {
            rsi_length: 14,
            stoch_length: 14,
            k: 3,
            d: 3,
        }
    }
}

/// Stochastic RSI K/D at the last price.
///
/// Built in four stages, and the exact cascade matters to the confirmation
/// gate downstream:
/// 1. RSI over every growing prefix of `prices` with `rsi_length`.
/// 2. Raw stochastic of that series over a rolling `stoch_length` window;
///    a flat window yields 50.0.
/// 3. K = mean of the last `k` raw values.
/// 4. D = mean of the last `d` values of the rolling K series. When there
///    are fewer than `k + d` raw values, D equals K.
///
/// Returns `None` if `prices` is shorter than `rsi_length + stoch_length`
/// or any stage lacks history.
pub fn stochastic_rsi(prices: &[f64], params: &StochRsiParams) -> Option<StochRsi> {
    if params.stoch_length == 0 || params.k == 0 || params.d == 0 {
        return None;
    }
    if prices.len() < params.rsi_length + params.stoch_length {
        return None;
    }

    let rsi_values: Vec<f64> = (params.rsi_length..=prices.len())
        .filter_map(|end| rsi(&prices[..end], params.rsi_length))
        .collect();

    if rsi_values.len() < params.stoch_length {
        return None;
    }

    let raw: Vec<f64> = rsi_values
        .windows(params.stoch_length)
        .map(|window| {
            let highest = window.iter().copied().fold(f64::MIN, f64::max);
            let lowest = window.iter().copied().fold(f64::MAX, f64::min);
            let last = window[window.len() - 1];
            if highest == lowest {
                50.0
            } else {
                100.0 * (last - lowest) / (highest - lowest)
            }
        })
        .collect();

    if raw.len() < params.k {
        return None;
    }

    let k = mean(&raw[raw.len() - params.k..]);

    // Cold start: not enough raw values to smooth K itself.
    let d = if raw.len() < params.k + params.d {
        k
    } else {
        let k_series: Vec<f64> = raw.windows(params.k).map(mean).collect();
        mean(&k_series[k_series.len() - params.d..])
    };

    Some(StochRsi { k, d })
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
