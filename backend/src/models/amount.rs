//! Non-negative money amount
//!
//! CRITICAL: All money values are i64 (integral currency units)

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur on amount arithmetic
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AmountError {
    #[error("Amount would become negative: {value} - {subtracted}")]
    WouldBeNegative { value: i64, subtracted: i64 },
}

/// A non-negative integral money quantity
///
/// Used for account balances and debts, and for per-period flows that are
/// reset at period start (`cancel`).
///
/// # Example
/// ```
/// use macro_simulator_core_rs::Amount;
///
/// let mut amount = Amount::new(100);
/// amount.plus(50);
/// amount.minus(30).unwrap();
/// assert_eq!(amount.value(), 120);
///
/// assert!(amount.minus(500).is_err());
/// assert_eq!(amount.value(), 120); // unchanged on failure
///
/// amount.cancel();
/// assert!(amount.is_zero());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(i64);

impl Amount {
    /// # Panics
    /// Panics if `value` is negative
    pub fn new(value: i64) -> Self {
        assert!(value >= 0, "amount must be non-negative");
        Self(value)
    }

    pub fn zero() -> Self {
        Self(0)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// # Panics
    /// Panics if `value` is negative
    pub fn plus(&mut self, value: i64) {
        assert!(value >= 0, "amount must be non-negative");
        self.0 += value;
    }

    /// Subtract `value`, refusing to go below zero
    pub fn minus(&mut self, value: i64) -> Result<(), AmountError> {
        assert!(value >= 0, "amount must be non-negative");
        if value > self.0 {
            return Err(AmountError::WouldBeNegative {
                value: self.0,
                subtracted: value,
            });
        }
        self.0 -= value;
        Ok(())
    }

    /// Reset to zero
    pub fn cancel(&mut self) {
        self.0 = 0;
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "amount must be non-negative")]
    fn test_negative_construction_panics() {
        Amount::new(-1);
    }

    #[test]
    fn test_minus_to_exactly_zero() {
        let mut amount = Amount::new(40);
        amount.minus(40).unwrap();
        assert!(amount.is_zero());
    }

    #[test]
    fn test_minus_reports_values() {
        let mut amount = Amount::new(10);
        assert_eq!(
            amount.minus(11),
            Err(AmountError::WouldBeNegative {
                value: 10,
                subtracted: 11
            })
        );
    }
}
