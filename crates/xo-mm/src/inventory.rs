//! Inventory-aware ladder sizing.
//!
//! Leans the ladder against the current position: when long, bids shrink and
//! asks grow so fills tend to flatten exposure; the mirror when short.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;

use crate::quote_engine::total_usd;
use crate::quote_manager::QuotePlan;

/// Position ratio (|position / max|) above which sizes are adjusted.
pub const INVENTORY_ADJUST_THRESHOLD: Decimal = dec!(0.3);

/// Largest fractional resize applied to either side.
pub const MAX_INVENTORY_ADJUSTMENT: Decimal = dec!(0.5);

/// Resize `plan` for the current inventory.
///
/// No-op when `max_position` is zero or the position ratio is within the
/// threshold. Otherwise every bid and ask is scaled by `1 ∓ adjustment`
/// with `adjustment = min(|ratio|, 0.5)`, side totals are recomputed, and
/// `inventory_adjustment` describes the change.
///
/// Returns true if the plan was changed.
pub fn adjust_for_inventory(
    plan: &mut QuotePlan,
    current_position: Decimal,
    max_position: Decimal,
) -> bool {
    if max_position.is_zero() {
        return false;
    }

    // Overflow means the position dwarfs the limit: full adjustment.
    let (long, adjustment) = match current_position.checked_div(max_position) {
        Some(ratio) => {
            if ratio.abs() <= INVENTORY_ADJUST_THRESHOLD {
                return false;
            }
            (ratio > Decimal::ZERO, ratio.abs().min(MAX_INVENTORY_ADJUSTMENT))
        }
        None => (
            current_position.is_sign_positive() == max_position.is_sign_positive(),
            MAX_INVENTORY_ADJUSTMENT,
        ),
    };
    let shrink = Decimal::ONE - adjustment;
    let grow = Decimal::ONE + adjustment;

    let (bid_factor, ask_factor, note) = if long {
        (
            shrink,
            grow,
            format!("Long position ({current_position:.4}): reducing bids, increasing asks"),
        )
    } else {
        (
            grow,
            shrink,
            format!("Short position ({current_position:.4}): increasing bids, reducing asks"),
        )
    };

    for bid in &mut plan.bids {
        bid.scale(bid_factor);
    }
    for ask in &mut plan.asks {
        ask.scale(ask_factor);
    }
    plan.total_bid_usd = total_usd(&plan.bids);
    plan.total_ask_usd = total_usd(&plan.asks);

    info!(
        asset = %plan.asset,
        position = %current_position,
        max_position = %max_position,
        %adjustment,
        "Inventory adjustment applied"
    );
    plan.inventory_adjustment = Some(note);
    true
}
