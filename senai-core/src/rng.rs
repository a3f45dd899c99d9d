//! Injected randomness for the fundamental-score fallback.
//!
//! When a symbol has no fundamentals, the health card shows a placeholder
//! score in `70..=89`. The draw lives behind `FallbackScoreSource` so the
//! scorer itself stays pure. `SeededFallback` derives one `StdRng` per
//! `(symbol, date)` via BLAKE3, so the placeholder is stable for a given
//! trading day no matter which thread or order computes it.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const FALLBACK_BASE: u8 = 70;
const FALLBACK_SPAN: f64 = 20.0;

/// Source of the placeholder fundamental score.
pub trait FallbackScoreSource: Send + Sync {
    /// A uniform draw in `[0, 1)` for this symbol and date.
    fn unit(&self, symbol: &str, date: NaiveDate) -> f64;

    /// `70 + floor(u * 20)`, always in `70..=89`.
    fn fallback_score(&self, symbol: &str, date: NaiveDate) -> u8 {
        let u = self.unit(symbol, date).clamp(0.0, 1.0 - f64::EPSILON);
        FALLBACK_BASE + (u * FALLBACK_SPAN).floor() as u8
    }
}

/// Deterministic per-(symbol, date) draws from a master seed.
#[derive(Debug, Clone)]
pub struct SeededFallback {
    master_seed: u64,
}

impl SeededFallback {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Sub-seed for a (symbol, date). Independent of derivation order.
    pub fn sub_seed(&self, symbol: &str, date: NaiveDate) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(symbol.as_bytes());
        hasher.update(date.to_string().as_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }

    pub fn rng_for(&self, symbol: &str, date: NaiveDate) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(symbol, date))
    }
}

impl FallbackScoreSource for SeededFallback {
    fn unit(&self, symbol: &str, date: NaiveDate) -> f64 {
        self.rng_for(symbol, date).gen::<f64>()
    }
}

/// Always returns the same draw. For tests and reproducible reports.
#[derive(Debug, Clone, Copy)]
pub struct FixedFallback(pub f64);

impl FallbackScoreSource for FixedFallback {
    fn unit(&self, _symbol: &str, _date: NaiveDate) -> f64 {
        self.0
    }
}
