//! Period management for the simulation
//!
//! The simulation advances in discrete periods. Period 0 means "not started";
//! the first executed period is period 1. Dataset values recorded during a
//! period are keyed by this number.

use serde::{Deserialize, Serialize};

/// Counts executed periods
///
/// # Example
/// ```
/// use macro_simulator_core_rs::PeriodClock;
///
/// let mut clock = PeriodClock::new(12);
/// assert_eq!(clock.current_period(), 0);
///
/// clock.advance();
/// assert_eq!(clock.current_period(), 1);
/// assert!(!clock.is_finished());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodClock {
    /// Number of the period in progress (or last closed)
    current_period: usize,
    /// Total number of periods to simulate
    total_periods: usize,
}

impl PeriodClock {
    /// Create a clock for a run of `total_periods` periods
    ///
    /// # Panics
    /// Panics if `total_periods` is zero
    pub fn new(total_periods: usize) -> Self {
        assert!(total_periods > 0, "total_periods must be positive");
        Self {
            current_period: 0,
            total_periods,
        }
    }

    /// Move to the next period
    pub fn advance(&mut self) {
        self.current_period += 1;
    }

    /// Get the current period (1-based once started)
    pub fn current_period(&self) -> usize {
        self.current_period
    }

    /// Get the total number of periods configured
    pub fn total_periods(&self) -> usize {
        self.total_periods
    }

    /// Number of periods still to run
    ///
    /// # Example
    /// ```
    /// use macro_simulator_core_rs::PeriodClock;
    ///
    /// let mut clock = PeriodClock::new(3);
    /// clock.advance();
    /// assert_eq!(clock.remaining(), 2);
    /// ```
    pub fn remaining(&self) -> usize {
        self.total_periods.saturating_sub(self.current_period)
    }

    /// True once every configured period has been executed
    pub fn is_finished(&self) -> bool {
        self.current_period >= self.total_periods
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "total_periods must be positive")]
    fn test_zero_periods_panics() {
        PeriodClock::new(0);
    }

    #[test]
    fn test_finishes_after_total_periods() {
        let mut clock = PeriodClock::new(2);
        clock.advance();
        assert!(!clock.is_finished());
        clock.advance();
        assert!(clock.is_finished());
        assert_eq!(clock.remaining(), 0);
    }
}
