//! Factory: turns labor into goods valued at wage cost

use crate::core::params::{ConfigError, Parameters};
use crate::models::contract::LaborContract;
use crate::models::goods::{AccountingError, Goods, Inventory};
use serde::{Deserialize, Serialize};

/// Output of one production run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductionReport {
    /// Contracts that actually worked (bounded by capacity)
    pub labor: usize,
    pub volume: i64,
    /// Wage cost of the labor used
    pub value: i64,
}

/// Production capacity plus the inventory of unsold goods
///
/// # Example
/// ```
/// use macro_simulator_core_rs::{AccountId, AgentId, Factory, LaborContract};
///
/// let mut factory = Factory::new(2, 1.5);
/// let payroll: Vec<LaborContract> = (0..3)
///     .map(|i| {
///         let account = AccountId { bank: 0, slot: i };
///         LaborContract::new(i as u64, AgentId::firm(0), AgentId::worker(i), account, 10, 4, 1)
///     })
///     .collect();
///
/// let report = factory.production(&payroll);
/// assert_eq!(report.labor, 2); // capacity bound
/// assert_eq!(report.volume, 3); // floor(2 × 1.5)
/// assert_eq!(report.value, 20);
/// assert_eq!(factory.value(), 20);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Factory {
    capacity: usize,
    productivity: f64,
    inventory: Inventory,
}

impl Factory {
    /// # Panics
    /// Panics if `productivity` is not positive
    pub fn new(capacity: usize, productivity: f64) -> Self {
        assert!(productivity > 0.0, "productivity must be positive");
        Self {
            capacity,
            productivity,
            inventory: Inventory::new(),
        }
    }

    /// Reads `capacity` and `productivity` from the `production` group
    pub fn from_params(params: &Parameters) -> Result<Self, ConfigError> {
        let capacity = params.get_usize("capacity")?;
        let productivity = params.get_f64("productivity")?;
        if productivity <= 0.0 || !productivity.is_finite() {
            return Err(ConfigError::InvalidValue {
                path: "production.productivity".to_string(),
                reason: format!("must be positive, got {}", productivity),
            });
        }
        Ok(Self::new(capacity, productivity))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn productivity(&self) -> f64 {
        self.productivity
    }

    /// Output at full capacity
    pub fn max_output(&self) -> f64 {
        self.capacity as f64 * self.productivity
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Inventory value (tangible assets)
    pub fn value(&self) -> i64 {
        self.inventory.value()
    }

    /// Run the valid contracts of `payroll`, in payroll order, up to capacity
    pub fn production(&mut self, payroll: &[LaborContract]) -> ProductionReport {
        let working: Vec<&LaborContract> = payroll
            .iter()
            .filter(|contract| contract.is_valid())
            .take(self.capacity)
            .collect();

        let labor = working.len();
        let volume = (labor as f64 * self.productivity).floor() as i64;
        let value = working.iter().map(|contract| contract.wage()).sum();

        self.inventory.put(Goods::new(volume, value));
        ProductionReport {
            labor,
            volume,
            value,
        }
    }

    /// Remove goods from inventory for a sale
    pub fn take(&mut self, volume: i64) -> Result<Goods, AccountingError> {
        self.inventory.take(volume)
    }
}
