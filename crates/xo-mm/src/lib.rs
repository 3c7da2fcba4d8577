//! Market making quote ladder for the Trader XO bot.
//!
//! Provides signal-skewed market making plans:
//! - Ladder calculation with fixed per-level offsets
//! - Size skew toward the current Trader XO signal
//! - Per-asset refresh timing
//! - Inventory-aware resizing
//!
//! # Architecture
//!
//! ```text
//! mid price + SignalResult → QuoteManager.generate_plan()
//!                              ├─ compute_levels: bid/ask ladder
//!                              └─ RefreshClock: refresh_due
//!                                   ↓
//!                            adjust_for_inventory (optional)
//! ```

pub mod config;
pub mod error;
pub mod inventory;
pub mod quote_engine;
pub mod quote_manager;

pub use config::QuoteConfig;
pub use error::{QuoteError, QuoteResult};
pub use inventory::adjust_for_inventory;
pub use quote_engine::{compute_levels, mid_from_book, size_multipliers, QuoteLadder, QuoteLevel};
pub use quote_manager::{HybridPlan, QuoteManager, QuotePlan, RefreshClock, SignalContext};
