//! Per-asset signal state.
//!
//! Debounce counters and the last EMA / Stochastic RSI readings survive
//! between evaluations so a crossover fires once per regime flip.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use xo_core::StochRsi;

/// Streak of consecutive evaluations on one side of the slow EMA.
///
/// Equivalent to a `(buy_count, sell_count)` pair where at most one side is
/// non-zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DebounceState {
    /// No evaluation has seen the EMAs apart yet.
    #[default]
    Idle,
    /// Fast EMA above slow for `n` evaluations.
    BullStreak(u32),
    /// Fast EMA below slow for `n` evaluations.
    BearStreak(u32),
}

impl DebounceState {
    /// Transition on one evaluation.
    ///
    /// Fast above slow extends (or starts) a bull streak and clears any bear
    /// streak; the mirror for fast below slow. Equal EMAs leave the state
    /// unchanged.
    pub fn advance(self, fast: f64, slow: f64) -> Self {
        if fast > slow {
            match self {
                Self::BullStreak(n) => Self::BullStreak(n.saturating_add(1)),
                _ => Self::BullStreak(1),
            }
        } else if fast < slow {
            match self {
                Self::BearStreak(n) => Self::BearStreak(n.saturating_add(1)),
                _ => Self::BearStreak(1),
            }
        } else {
            self
        }
    }

    pub fn buy_count(&self) -> u32 {
        match self {
            Self::BullStreak(n) => *n,
            _ => 0,
        }
    }

    pub fn sell_count(&self) -> u32 {
        match self {
            Self::BearStreak(n) => *n,
            _ => 0,
        }
    }

    /// Buy eligibility: first evaluation of a bull streak.
    pub fn buy_eligible(&self) -> bool {
        let (buy, sell) = (self.buy_count(), self.sell_count());
        buy > 0 && buy < 2 && sell < 1
    }

    /// Sell eligibility: first evaluation of a bear streak.
    pub fn sell_eligible(&self) -> bool {
        let (buy, sell) = (self.buy_count(), self.sell_count());
        sell > 0 && sell < 2 && buy < 1
    }
}

/// State carried for one asset between evaluations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetSignalState {
    pub debounce: DebounceState,
    pub last_fast_ema: Option<f64>,
    pub last_slow_ema: Option<f64>,
    /// Last computed Stochastic RSI; kept when a later evaluation cannot compute one.
    pub last_stoch_rsi: Option<StochRsi>,
}

impl AssetSignalState {
    pub fn buy_count(&self) -> u32 {
        self.debounce.buy_count()
    }

    pub fn sell_count(&self) -> u32 {
        self.debounce.sell_count()
    }
}

type StateEntry = Arc<Mutex<AssetSignalState>>;

/// Per-asset state keyed by asset symbol.
///
/// Each asset sits behind its own mutex: evaluations of one asset are
/// serialized, different assets proceed in parallel.
#[derive(Debug, Default)]
pub struct SignalStateStore {
    assets: DashMap<String, StateEntry>,
}

impl SignalStateStore {
    pub fn new() -> Self {
        Self {
            assets: DashMap::new(),
        }
    }

    /// Get or create the entry for `asset`.
    pub(crate) fn entry(&self, asset: &str) -> StateEntry {
        if let Some(entry) = self.assets.get(asset) {
            return entry.clone();
        }
        self.assets
            .entry(asset.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(AssetSignalState::default())))
            .clone()
    }

    /// Snapshot of the stored state, `None` if the asset was never evaluated.
    pub fn get(&self, asset: &str) -> Option<AssetSignalState> {
        self.assets.get(asset).map(|entry| entry.lock().clone())
    }

    /// Drop the state for `asset`. Returns true if there was any.
    pub fn remove(&self, asset: &str) -> bool {
        self.assets.remove(asset).is_some()
    }

    /// Assets with stored state.
    pub fn assets(&self) -> Vec<String> {
        self.assets.iter().map(|e| e.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
