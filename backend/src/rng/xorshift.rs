//! Seeded random stream
//!
//! One stream feeds every stochastic operation of a run: sector sampling,
//! markup jitter, workforce targets and contract terms. Draws happen in the
//! scheduler's iteration order, so a seed and a configuration replay the same
//! economy. The generator is xorshift64*.

use serde::{Deserialize, Serialize};

const MULTIPLIER: u64 = 0x2545_F491_4F6C_DD1D;

/// The simulation's random stream
///
/// # Example
/// ```
/// use macro_simulator_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let term = rng.range(6, 18);
/// assert!((6..18).contains(&term));
///
/// let jitter = rng.uniform(0.0, 0.05);
/// assert!((0.0..0.05).contains(&jitter));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngManager {
    state: u64,
}

impl RngManager {
    /// A zero seed would freeze the generator and is replaced by 1
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.max(1),
        }
    }

    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(MULTIPLIER)
    }

    /// Integer in `[min, max)`
    ///
    /// # Panics
    /// Panics if `min >= max`
    pub fn range(&mut self, min: i64, max: i64) -> i64 {
        assert!(min < max, "empty range [{}, {})", min, max);
        let width = max.abs_diff(min);
        min + (self.next() % width) as i64
    }

    /// Slot in `[0, bound)`, used to sample sector members
    ///
    /// # Panics
    /// Panics if `bound` is zero
    pub fn index(&mut self, bound: usize) -> usize {
        assert!(bound > 0, "cannot pick from an empty pool");
        (self.next() % bound as u64) as usize
    }

    /// Float in `[0, 1)` built from the top 53 bits of one draw
    pub fn next_f64(&mut self) -> f64 {
        (self.next() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Float in `[low, high)`, one draw
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64()
    }

    /// State recorded in snapshots
    pub fn get_state(&self) -> u64 {
        self.state
    }
}
