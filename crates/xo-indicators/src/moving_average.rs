//! Moving averages over a close-price series.
//!
//! All functions take prices oldest first and return `None` until
//! `period` prices are available.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::IndicatorError;

/// Exponential moving average at the last price.
///
/// Seeded with the arithmetic mean of the first `period` prices, then
/// `ema' = (price - ema) * k + ema` with `k = 2 / (period + 1)` for every
/// remaining price.
pub fn ema(prices: &[f64], period: usize) -> Option<f64> {
    ema_series(prices, period).last().copied()
}

/// Every EMA value from the seed bar onwards.
///
/// `ema_series(prices, n)[i]` is the EMA at `prices[n - 1 + i]`.
pub fn ema_series(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() < period {
        return Vec::new();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let seed = prices[..period].iter().sum::<f64>() / period as f64;

    let mut values = Vec::with_capacity(prices.len() - period + 1);
    values.push(seed);

    let mut ema = seed;
    for &price in &prices[period..] {
        ema = (price - ema) * k + ema;
        values.push(ema);
    }

    values
}

/// Simple moving average of the last `period` prices.
pub fn sma(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }
    let window = &prices[prices.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Weighted moving average of the last `period` prices.
///
/// Weights run 1..=period, so the newest price carries the most weight.
pub fn wma(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }
    let window = &prices[prices.len() - period..];
    let weighted: f64 = window
        .iter()
        .enumerate()
        .map(|(i, &p)| p * (i + 1) as f64)
        .sum();
    let weight_sum = (period * (period + 1) / 2) as f64;
    Some(weighted / weight_sum)
}

/// Moving average used by the trend filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaFilterType {
    #[default]
    #[serde(rename = "EMA", alias = "ema")]
    Ema,
    #[serde(rename = "SMA", alias = "sma")]
    Sma,
    #[serde(rename = "WMA", alias = "wma")]
    Wma,
    /// Filter disabled; every price passes.
    #[serde(rename = "None", alias = "none")]
    Off,
}

impl MaFilterType {
    /// Filter value over `prices`, or `None` when disabled or history is short.
    pub fn compute(&self, prices: &[f64], period: usize) -> Option<f64> {
        match self {
            Self::Ema => ema(prices, period),
            Self::Sma => sma(prices, period),
            Self::Wma => wma(prices, period),
            Self::Off => None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Off)
    }
}

impl fmt::Display for MaFilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ema => write!(f, "EMA"),
            Self::Sma => write!(f, "SMA"),
            Self::Wma => write!(f, "WMA"),
            Self::Off => write!(f, "None"),
        }
    }
}

impl FromStr for MaFilterType {
    type Err = IndicatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "EMA" => Ok(Self::Ema),
            "SMA" => Ok(Self::Sma),
            "WMA" => Ok(Self::Wma),
            "NONE" => Ok(Self::Off),
            _ => Err(IndicatorError::UnknownMaFilter(s.to_string())),
        }
    }
}
