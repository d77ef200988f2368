//! Goods, inventories and supplies
//!
//! Goods are created by a factory, held in an inventory at cost, offered on
//! the goods market through a `Supply`, and destroyed when a household
//! consumes them.
//!
//! A supply's total value is always `floor(price × volume)`; purchases are
//! priced with the same function, so buying out a whole supply costs exactly
//! its total value.

use crate::agents::AgentId;
use crate::models::amount::Amount;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Accounting inconsistencies
///
/// Always fatal: they reveal a defect in matching arithmetic, and continuing
/// would corrupt the books.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AccountingError {
    #[error("Spending mismatch: price implies {expected}, cheque carries {actual}")]
    SpendingMismatch { expected: i64, actual: i64 },

    #[error("Volume mismatch: requested {requested}, delivered {delivered}")]
    VolumeMismatch { requested: i64, delivered: i64 },

    #[error("Requested volume {requested} exceeds supply {available}")]
    VolumeExceedsSupply { requested: i64, available: i64 },

    #[error("Requested volume {requested} exceeds inventory {available}")]
    InventoryShortfall { requested: i64, available: i64 },

    #[error("Volume must be positive, got {volume}")]
    InvalidVolume { volume: i64 },

    #[error("Supply has no price")]
    NoPrice,

    #[error("Spending {spent} exceeds budget {budget}")]
    BudgetExceeded { budget: i64, spent: i64 },

    #[error("Money not conserved: expected {expected}, found {actual}")]
    MoneyNotConserved { expected: i64, actual: i64 },
}

/// Value of `volume` units at `price`, floored to whole currency units
///
/// # Example
/// ```
/// use macro_simulator_core_rs::models::goods::value_at;
///
/// assert_eq!(value_at(20.0, 2), 40);
/// assert_eq!(value_at(2.5, 3), 7);
/// ```
pub fn value_at(price: f64, volume: i64) -> i64 {
    (price * volume as f64).floor() as i64
}

/// A batch of goods with its cost value
#[must_use = "goods must be stored or consumed"]
#[derive(Debug, PartialEq, Eq)]
pub struct Goods {
    volume: i64,
    value: i64,
}

impl Goods {
    /// # Panics
    /// Panics if volume or value is negative
    pub fn new(volume: i64, value: i64) -> Self {
        assert!(volume >= 0 && value >= 0, "goods must be non-negative");
        Self { volume, value }
    }

    pub fn volume(&self) -> i64 {
        self.volume
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    /// Destroy the goods
    pub fn consume(self) {}
}

/// Unsold goods, valued at cost
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    volume: i64,
    value: i64,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn volume(&self) -> i64 {
        self.volume
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn is_empty(&self) -> bool {
        self.volume == 0
    }

    /// Average cost of a unit, if any goods are held
    pub fn unit_cost(&self) -> Option<f64> {
        (self.volume > 0).then(|| self.value as f64 / self.volume as f64)
    }

    pub fn put(&mut self, goods: Goods) {
        self.volume += goods.volume;
        self.value += goods.value;
    }

    /// Remove `volume` units with their proportional share of value
    ///
    /// Taking the whole stock takes the whole value, so no value is stranded.
    ///
    /// # Example
    /// ```
    /// use macro_simulator_core_rs::models::goods::{Goods, Inventory};
    ///
    /// let mut inventory = Inventory::new();
    /// inventory.put(Goods::new(3, 10));
    ///
    /// let first = inventory.take(1).unwrap();
    /// assert_eq!(first.value(), 3); // floor(10 / 3)
    /// let rest = inventory.take(2).unwrap();
    /// assert_eq!(rest.value(), 7);
    /// assert!(inventory.is_empty());
    /// # first.consume();
    /// # rest.consume();
    /// ```
    pub fn take(&mut self, volume: i64) -> Result<Goods, AccountingError> {
        if volume <= 0 {
            return Err(AccountingError::InvalidVolume { volume });
        }
        if volume > self.volume {
            return Err(AccountingError::InventoryShortfall {
                requested: volume,
                available: self.volume,
            });
        }
        let value = if volume == self.volume {
            self.value
        } else {
            (self.value as i128 * volume as i128 / self.volume as i128) as i64
        };
        self.volume -= volume;
        self.value -= value;
        Ok(Goods { volume, value })
    }
}

/// A supplier's standing offer on the goods market
///
/// Replaced every period: reset at open, set by the production phase.
///
/// # Example
/// ```
/// use macro_simulator_core_rs::{AgentId, Supply};
///
/// let mut supply = Supply::new(AgentId::firm(0));
/// supply.update(10, 20.0);
/// assert_eq!(supply.total_value(), 200);
///
/// supply.purchase(2, 40).unwrap();
/// assert_eq!(supply.volume(), 8);
/// assert_eq!(supply.total_value(), 160);
///
/// // The cheque must match the price exactly
/// assert!(supply.purchase(1, 19).is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supply {
    supplier: AgentId,
    price: Option<f64>,
    volume: i64,
    total_value: i64,
    sales_volume: i64,
    /// Receipts of the current period
    sales_value: Amount,
}

impl Supply {
    pub fn new(supplier: AgentId) -> Self {
        Self {
            supplier,
            price: None,
            volume: 0,
            total_value: 0,
            sales_volume: 0,
            sales_value: Amount::zero(),
        }
    }

    pub fn supplier(&self) -> AgentId {
        self.supplier
    }

    /// Unit price; kept across periods until the next update
    pub fn price(&self) -> Option<f64> {
        self.price
    }

    pub fn volume(&self) -> i64 {
        self.volume
    }

    pub fn total_value(&self) -> i64 {
        self.total_value
    }

    pub fn sales_volume(&self) -> i64 {
        self.sales_volume
    }

    pub fn sales_value(&self) -> i64 {
        self.sales_value.value()
    }

    pub fn is_empty(&self) -> bool {
        self.volume == 0 || self.price.is_none()
    }

    /// Price of the offer if it can be bought from at all
    pub fn offered_price(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            self.price
        }
    }

    /// Withdraw the offer for a new period; the price is kept
    pub fn reset(&mut self) {
        self.volume = 0;
        self.total_value = 0;
        self.sales_volume = 0;
        self.sales_value.cancel();
    }

    /// # Panics
    /// Panics if `price` is not positive or `volume` is negative
    pub fn update(&mut self, volume: i64, price: f64) {
        assert!(price > 0.0 && price.is_finite(), "price must be positive");
        assert!(volume >= 0, "volume must be non-negative");
        self.price = Some(price);
        self.volume = volume;
        self.total_value = value_at(price, volume);
    }

    /// Sell `volume` units against a payment of `amount`
    ///
    /// `amount` must equal `floor(price × volume)`; no state changes on error.
    pub fn purchase(&mut self, volume: i64, amount: i64) -> Result<(), AccountingError> {
        let price = self.price.ok_or(AccountingError::NoPrice)?;
        if volume <= 0 {
            return Err(AccountingError::InvalidVolume { volume });
        }
        if volume > self.volume {
            return Err(AccountingError::VolumeExceedsSupply {
                requested: volume,
                available: self.volume,
            });
        }
        let expected = value_at(price, volume);
        if amount != expected {
            return Err(AccountingError::SpendingMismatch {
                expected,
                actual: amount,
            });
        }
        self.volume -= volume;
        self.total_value = value_at(price, self.volume);
        self.sales_volume += volume;
        self.sales_value.plus(amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_supply_costs_total_value() {
        let mut supply = Supply::new(AgentId::firm(0));
        supply.update(7, 3.3);
        let total = supply.total_value();
        supply.purchase(7, value_at(3.3, 7)).unwrap();
        assert_eq!(supply.sales_value(), total);
        assert_eq!(supply.total_value(), 0);
        assert!(supply.is_empty());
    }

    #[test]
    fn test_purchase_without_price() {
        let mut supply = Supply::new(AgentId::firm(0));
        assert_eq!(supply.purchase(1, 1), Err(AccountingError::NoPrice));
    }

    #[test]
    fn test_purchase_more_than_offered() {
        let mut supply = Supply::new(AgentId::firm(0));
        supply.update(2, 5.0);
        assert_eq!(
            supply.purchase(3, 15),
            Err(AccountingError::VolumeExceedsSupply {
                requested: 3,
                available: 2
            })
        );
        assert_eq!(supply.volume(), 2);
    }

    #[test]
    fn test_reset_keeps_price() {
        let mut supply = Supply::new(AgentId::firm(0));
        supply.update(4, 12.0);
        supply.purchase(1, 12).unwrap();
        supply.reset();
        assert!(supply.is_empty());
        assert_eq!(supply.sales_value(), 0);
        assert_eq!(supply.price(), Some(12.0));
        assert_eq!(supply.offered_price(), None);
    }

    #[test]
    fn test_inventory_take_more_than_held() {
        let mut inventory = Inventory::new();
        inventory.put(Goods::new(2, 20));
        assert_eq!(
            inventory.take(3),
            Err(AccountingError::InventoryShortfall {
                requested: 3,
                available: 2
            })
        );
        assert_eq!(inventory.unit_cost(), Some(10.0));
    }
}
