//! Market making configuration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{QuoteError, QuoteResult};

/// Quote ladder configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteConfig {
    /// Distance from mid to the tightest level on each side, in basis points.
    #[serde(default = "default_spread_bps")]
    pub spread_bps: Decimal,

    /// Size per level in USD before skew.
    #[serde(default = "default_order_size_usd")]
    pub order_size_usd: Decimal,

    /// Number of quote levels per side.
    #[serde(default = "default_num_levels")]
    pub num_levels: u32,

    /// Additional offset per level in basis points.
    #[serde(default = "default_level_spacing_bps")]
    pub level_spacing_bps: Decimal,

    /// Minimum seconds between ladder refreshes per asset.
    #[serde(default = "default_refresh_interval_sec")]
    pub refresh_interval_sec: u64,

    /// Skew level sizes toward a directional signal.
    #[serde(default = "default_true")]
    pub skew_on_signal: bool,

    /// Size skew as a fraction: the favored side gets `1 + skew_amount`,
    /// the other `1 - skew_amount`.
    #[serde(default = "default_skew_amount")]
    pub skew_amount: Decimal,
}

fn default_spread_bps() -> Decimal {
    dec!(10)
}

fn default_order_size_usd() -> Decimal {
    dec!(100)
}

fn default_num_levels() -> u32 {
    3
}

fn default_level_spacing_bps() -> Decimal {
    dec!(5)
}

fn default_refresh_interval_sec() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_skew_amount() -> Decimal {
    dec!(0.3)
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            spread_bps: default_spread_bps(),
            order_size_usd: default_order_size_usd(),
            num_levels: default_num_levels(),
            level_spacing_bps: default_level_spacing_bps(),
            refresh_interval_sec: default_refresh_interval_sec(),
            skew_on_signal: true,
            skew_amount: default_skew_amount(),
        }
    }
}

impl QuoteConfig {
    /// Validate configuration values.
    ///
    /// Returns Err if:
    /// - num_levels is zero
    /// - spread_bps or level_spacing_bps is negative
    /// - order_size_usd is not positive
    /// - skew_amount is outside [0, 1]
    pub fn validate(&self) -> QuoteResult<()> {
        if self.num_levels == 0 {
            return Err(QuoteError::InvalidConfig(
                "num_levels must be at least 1".to_string(),
            ));
        }

        if self.spread_bps.is_sign_negative() {
            return Err(QuoteError::InvalidConfig(format!(
                "spread_bps ({}) must be non-negative",
                self.spread_bps
            )));
        }

        // Offsets must not shrink with level index
        if self.level_spacing_bps.is_sign_negative() {
            return Err(QuoteError::InvalidConfig(format!(
                "level_spacing_bps ({}) must be non-negative",
                self.level_spacing_bps
            )));
        }

        if self.order_size_usd <= Decimal::ZERO {
            return Err(QuoteError::InvalidConfig(format!(
                "order_size_usd ({}) must be positive",
                self.order_size_usd
            )));
        }

        if self.skew_amount < Decimal::ZERO || self.skew_amount > Decimal::ONE {
            return Err(QuoteError::InvalidConfig(format!(
                "skew_amount ({}) must be in [0, 1]",
                self.skew_amount
            )));
        }

        Ok(())
    }
}
