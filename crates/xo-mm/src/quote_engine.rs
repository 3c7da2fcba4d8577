//! Quote ladder calculation.
//!
//! Computes bid/ask levels around a mid price:
//! - Fixed offset per level (`spread_bps + level * level_spacing_bps`)
//! - Size skew toward a directional signal

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use xo_core::{Price, Signal, Size};

use crate::config::QuoteConfig;
use crate::error::{QuoteError, QuoteResult};

/// A single quote level (one side).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteLevel {
    /// Quote price.
    pub price: Price,
    /// Quote size in base units.
    pub size: Size,
    /// Quote size in USD.
    pub size_usd: Decimal,
    /// Level index (0 = tightest).
    pub level: u32,
    /// Distance from mid in basis points.
    pub offset_bps: Decimal,
}

impl QuoteLevel {
    /// Scale size and USD size by `factor`, saturating at the `Decimal` range.
    pub fn scale(&mut self, factor: Decimal) {
        self.size = Size::new(self.size.inner().saturating_mul(factor));
        self.size_usd = self.size_usd.saturating_mul(factor);
    }
}

/// Computed quotes for one asset (both sides).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteLadder {
    /// Bid levels (price descending, tightest first).
    pub bids: Vec<QuoteLevel>,
    /// Ask levels (price ascending, tightest first).
    pub asks: Vec<QuoteLevel>,
}

impl QuoteLadder {
    pub fn total_bid_usd(&self) -> Decimal {
        total_usd(&self.bids)
    }

    pub fn total_ask_usd(&self) -> Decimal {
        total_usd(&self.asks)
    }
}

pub(crate) fn total_usd(levels: &[QuoteLevel]) -> Decimal {
    levels
        .iter()
        .fold(Decimal::ZERO, |acc, l| acc.saturating_add(l.size_usd))
}

/// Bid and ask size multipliers for a directional signal.
///
/// Buy favors bids, sell favors asks; hold, no signal, or skew disabled
/// leaves both sides at 1.
pub fn size_multipliers(signal: Option<Signal>, config: &QuoteConfig) -> (Decimal, Decimal) {
    if !config.skew_on_signal {
        return (Decimal::ONE, Decimal::ONE);
    }

    let favored = Decimal::ONE + config.skew_amount;
    let other = Decimal::ONE - config.skew_amount;
    match signal {
        Some(Signal::Buy) => (favored, other),
        Some(Signal::Sell) => (other, favored),
        _ => (Decimal::ONE, Decimal::ONE),
    }
}

/// Calculate the quote ladder for one asset.
///
/// # Arguments
/// * `mid_price` - Current mid price; callers supply a positive value
/// * `directional_signal` - Optional signal used to skew sizes
/// * `config` - Quote configuration
pub fn compute_levels(
    mid_price: Price,
    directional_signal: Option<Signal>,
    config: &QuoteConfig,
) -> QuoteLadder {
    let mid = mid_price.inner();
    let bps_divisor = dec!(10000);

    let (bid_mult, ask_mult) = size_multipliers(directional_signal, config);
    let bid_size_usd = config.order_size_usd * bid_mult;
    let ask_size_usd = config.order_size_usd * ask_mult;

    let mut bids = Vec::with_capacity(config.num_levels as usize);
    let mut asks = Vec::with_capacity(config.num_levels as usize);

    for level in 0..config.num_levels {
        let offset_bps = config.spread_bps + config.level_spacing_bps * Decimal::from(level);

        let bid_price = Price::new(mid * (dec!(1) - offset_bps / bps_divisor));
        let ask_price = Price::new(mid * (dec!(1) + offset_bps / bps_divisor));

        bids.push(QuoteLevel {
            price: bid_price,
            size: Size::from_usd(bid_size_usd, mid_price),
            size_usd: bid_size_usd,
            level,
            offset_bps,
        });

        asks.push(QuoteLevel {
            price: ask_price,
            size: Size::from_usd(ask_size_usd, mid_price),
            size_usd: ask_size_usd,
            level,
            offset_bps,
        });
    }

    QuoteLadder { bids, asks }
}

/// Mid price from a top of book.
///
/// Rejects non-positive prices and crossed books instead of quoting
/// around a bad mid.
pub fn mid_from_book(best_bid: Price, best_ask: Price) -> QuoteResult<Price> {
    if !best_bid.is_positive() || !best_ask.is_positive() || best_bid > best_ask {
        return Err(QuoteError::InvalidBook {
            bid: best_bid,
            ask: best_ask,
        });
    }
    Ok((best_bid + best_ask) / dec!(2))
}
