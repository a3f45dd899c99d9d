//! HOSE price-step ladder.
//!
//! Quoted prices on the Ho Chi Minh exchange move in steps that depend on the
//! price band: 10 VND below 10,000, 50 VND below 50,000, 100 VND above.

use serde::{Deserialize, Serialize};

/// Rounding direction when snapping a price onto the tick grid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TickPolicy {
    RoundNearest,
    RoundDown,
    RoundUp,
}

/// Tick size for a VND price.
pub fn tick_size(price: f64) -> f64 {
    if price < 10_000.0 {
        10.0
    } else if price < 50_000.0 {
        50.0
    } else {
        100.0
    }
}

/// Snap a VND price onto its tick grid.
pub fn round_to_tick(price: f64, policy: TickPolicy) -> f64 {
    let tick = tick_size(price);
    let ticks = price / tick;
    let rounded = match policy {
        TickPolicy::RoundNearest => ticks.round(),
        TickPolicy::RoundDown => ticks.floor(),
        TickPolicy::RoundUp => ticks.ceil(),
    };
    rounded * tick
}
