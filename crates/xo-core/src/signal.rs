//! Trading signal types shared by the signal engine and the quote engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Trading decision produced by one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Buy,
    Sell,
    #[default]
    Hold,
}

impl Signal {
    /// True for `Buy` and `Sell`.
    pub fn is_directional(&self) -> bool {
        !matches!(self, Self::Hold)
    }

    /// Upper-case label used in rationales ("BUY", "SELL", "HOLD").
    pub fn label(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Hold => "HOLD",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
            Self::Hold => write!(f, "hold"),
        }
    }
}

impl FromStr for Signal {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            "hold" => Ok(Self::Hold),
            other => Err(CoreError::InvalidSignal(other.to_string())),
        }
    }
}

/// Stochastic RSI K/D pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochRsi {
    pub k: f64,
    pub d: f64,
}

/// Outcome of one signal evaluation.
///
/// Immutable once returned. `fast_ema`/`slow_ema` are only `None` when the
/// evaluation bailed out for lack of history.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SignalResult {
    pub signal: Signal,
    /// Human-readable reason, names the blocking gate when a signal was filtered.
    pub rationale: String,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub fast_ema: Option<f64>,
    pub slow_ema: Option<f64>,
    /// Moving-average filter value, when one was computed.
    #[serde(default)]
    pub ma_filter: Option<f64>,
    pub stoch_rsi: Option<StochRsi>,
}

impl SignalResult {
    /// A `hold` result carrying only a rationale.
    pub fn hold(rationale: impl Into<String>) -> Self {
        Self {
            rationale: rationale.into(),
            ..Default::default()
        }
    }

    pub fn is_hold(&self) -> bool {
        self.signal == Signal::Hold
    }
}
