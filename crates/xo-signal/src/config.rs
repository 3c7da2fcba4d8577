//! Signal engine configuration.

use serde::{Deserialize, Serialize};
use xo_indicators::{MaFilterType, StochRsiParams};

use crate::error::SignalConfigError;

/// Configuration for the Trader XO signal engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Fast EMA period.
    #[serde(default = "default_fast_ema_period")]
    pub fast_ema_period: usize,
    /// Slow EMA period.
    #[serde(default = "default_slow_ema_period")]
    pub slow_ema_period: usize,
    /// Trend filter period.
    #[serde(default = "default_ma_filter_period")]
    pub ma_filter_period: usize,
    /// Trend filter type ("EMA", "SMA", "WMA" or "None").
    #[serde(default)]
    pub ma_filter_type: MaFilterType,
    /// Stochastic K smoothing.
    #[serde(default = "default_stoch_smoothing")]
    pub stoch_rsi_k: usize,
    /// Stochastic D smoothing.
    #[serde(default = "default_stoch_smoothing")]
    pub stoch_rsi_d: usize,
    /// RSI length feeding the stochastic.
    #[serde(default = "default_stoch_length")]
    pub stoch_rsi_length: usize,
    /// Stochastic lookback over the RSI series.
    #[serde(default = "default_stoch_length")]
    pub stoch_length: usize,
    /// Overbought band.
    #[serde(default = "default_stoch_upper_band")]
    pub stoch_upper_band: f64,
    /// K/D crosses must happen on the right side of this band.
    #[serde(default = "default_stoch_middle_band")]
    pub stoch_middle_band: f64,
    /// Oversold band.
    #[serde(default = "default_stoch_lower_band")]
    pub stoch_lower_band: f64,
    /// Stop distance in percent of entry.
    #[serde(default = "default_stop_loss_percent")]
    pub stop_loss_percent: f64,
    #[serde(default = "default_true")]
    pub use_stop_loss: bool,
    /// Require a fresh Stochastic RSI K/D cross before emitting.
    #[serde(default)]
    pub use_stoch_confirmation: bool,
}

fn default_fast_ema_period() -> usize {
    12
}

fn default_slow_ema_period() -> usize {
    25
}

fn default_ma_filter_period() -> usize {
    200
}

fn default_stoch_smoothing() -> usize {
    3
}

fn default_stoch_length() -> usize {
    14
}

fn default_stoch_upper_band() -> f64 {
    80.0
}

fn default_stoch_middle_band() -> f64 {
    50.0
}

fn default_stoch_lower_band() -> f64 {
    20.0
}

fn default_stop_loss_percent() -> f64 {
    7.0
}

fn default_true() -> bool {
    true
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            fast_ema_period: default_fast_ema_period(),
            slow_ema_period: default_slow_ema_period(),
            ma_filter_period: default_ma_filter_period(),
            ma_filter_type: MaFilterType::default(),
            stoch_rsi_k: default_stoch_smoothing(),
            stoch_rsi_d: default_stoch_smoothing(),
            stoch_rsi_length: default_stoch_length(),
            stoch_length: default_stoch_length(),
            stoch_upper_band: default_stoch_upper_band(),
            stoch_middle_band: default_stoch_middle_band(),
            stoch_lower_band: default_stoch_lower_band(),
            stop_loss_percent: default_stop_loss_percent(),
            use_stop_loss: true,
            use_stoch_confirmation: false,
        }
    }
}

impl SignalConfig {
    /// Validate configuration values.
    ///
    /// Returns Err if:
    /// - any EMA or stochastic period is zero
    /// - the MA filter is enabled with a zero period
    /// - the stochastic bands are not strictly ordered within [0, 100]
    /// - the stop-loss percent is negative or at least 100
    pub fn validate(&self) -> Result<(), SignalConfigError> {
        let periods = [
            ("fast_ema_period", self.fast_ema_period),
            ("slow_ema_period", self.slow_ema_period),
            ("stoch_rsi_k", self.stoch_rsi_k),
            ("stoch_rsi_d", self.stoch_rsi_d),
            ("stoch_rsi_length", self.stoch_rsi_length),
            ("stoch_length", self.stoch_length),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, period)| *period == 0) {
            return Err(SignalConfigError::ZeroPeriod(name));
        }

        if self.ma_filter_type.is_enabled() && self.ma_filter_period == 0 {
            return Err(SignalConfigError::ZeroPeriod("ma_filter_period"));
        }

        let (lower, middle, upper) = (
            self.stoch_lower_band,
            self.stoch_middle_band,
            self.stoch_upper_band,
        );
        if !(0.0 <= lower && lower < middle && middle < upper && upper <= 100.0) {
            return Err(SignalConfigError::InvalidBands {
                lower,
                middle,
                upper,
            });
        }

        if !(0.0..100.0).contains(&self.stop_loss_percent) {
            return Err(SignalConfigError::InvalidStopLoss(self.stop_loss_percent));
        }

        Ok(())
    }

    /// Bars required before any EMA can be evaluated.
    pub fn min_history(&self) -> usize {
        self.fast_ema_period.max(self.slow_ema_period)
    }

    /// Stochastic RSI lookbacks for the confirmation gate.
    pub fn stoch_params(&self) -> StochRsiParams {
        StochRsiParams {
            rsi_length: self.stoch_rsi_length,
            stoch_length: self.stoch_length,
            k: self.stoch_rsi_k,
            d: self.stoch_rsi_d,
        }
    }
}
