//! Per-agent, per-period named facts
//!
//! Agents `put` numeric facts during their phases. `close` seals the period:
//! from then on its values are immutable and visible through `get_data`.
//! Values of the period in progress are never returned by `get_data`, so a
//! reader only ever sees fully closed periods.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Data key vocabulary
pub mod keys {
    pub const COUNT: &str = "count";
    pub const MONEY: &str = "money";
    pub const ASSETS: &str = "assets";
    pub const TANGIBLE_ASSETS: &str = "tangibleAssets";
    pub const LIABILITIES: &str = "liabilities";
    pub const BORROWING: &str = "borrowing";

    // Firms
    pub const JOB_OFFERS: &str = "jobOffers";
    pub const WORKFORCE: &str = "workforce";
    pub const WORKFORCE_TARGET: &str = "workforceTarget";
    pub const LAYOFFS: &str = "layoffs";
    pub const PRODUCTION: &str = "production";
    pub const PRODUCTION_VALUE: &str = "productionValue";
    pub const SUPPLY_VOLUME: &str = "supplyVolume";
    pub const SUPPLY_VALUE: &str = "supplyValue";
    pub const SUPPLY_COST: &str = "supplyCost";
    pub const SALES_VOLUME: &str = "salesVolume";
    pub const SALES_VALUE: &str = "salesValue";
    pub const WAGE_BILL: &str = "wageBill";
    pub const DIVIDENDS: &str = "dividends";
    pub const MARKUP: &str = "markup";
    pub const DELTA_MARKUP: &str = "deltaMarkup";
    pub const PRICE: &str = "price";
    pub const INVENTORIES_VOLUME: &str = "inventoriesVolume";
    pub const INVENTORIES_NORMAL_VOLUME: &str = "inventoriesNormalVolume";
    pub const INVENTORIES_VALUE: &str = "inventoriesValue";

    // Households
    pub const EMPLOYED: &str = "employed";
    pub const WAGES: &str = "wages";
    pub const CONSUMPTION_BUDGET: &str = "consumptionBudget";
    pub const CONSUMPTION_VOLUME: &str = "consumptionVolume";
    pub const CONSUMPTION_VALUE: &str = "consumptionValue";
    pub const SUPPLIERS: &str = "suppliers";
    pub const SUPPLIER_SAMPLE: &str = "supplierSample";
    pub const UNSPENT_BUDGET: &str = "unspentBudget";

    // Banks
    pub const ACCOUNTS: &str = "accounts";
    pub const DEPOSITS: &str = "deposits";
    pub const LOANS: &str = "loans";
    pub const CLEARING: &str = "clearing";
}

/// Named numeric facts of one agent, one map per closed period
///
/// # Example
/// ```
/// use macro_simulator_core_rs::AgentDataset;
///
/// let mut dataset = AgentDataset::new();
/// dataset.open(1);
/// dataset.put("money", 120.0);
/// assert_eq!(dataset.get_data("money", 1), None); // period 1 not closed yet
///
/// dataset.close();
/// assert_eq!(dataset.get_data("money", 1), Some(120.0));
/// assert_eq!(dataset.get_data("markup", 1), None);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentDataset {
    /// Period currently being recorded (0 = none yet)
    period: usize,

    /// Facts of the period in progress
    current: BTreeMap<String, f64>,

    /// Sealed facts by period
    closed: BTreeMap<usize, BTreeMap<String, f64>>,
}

impl AgentDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start recording `period`
    pub fn open(&mut self, period: usize) {
        self.period = period;
        self.current.clear();
    }

    /// Record a fact; a later `put` of the same key in the same period overwrites it
    pub fn put(&mut self, key: &str, value: f64) {
        self.current.insert(key.to_string(), value);
    }

    /// Add to a fact, starting from zero
    pub fn add(&mut self, key: &str, value: f64) {
        *self.current.entry(key.to_string()).or_insert(0.0) += value;
    }

    /// Value recorded so far in the period in progress
    pub fn current(&self, key: &str) -> Option<f64> {
        self.current.get(key).copied()
    }

    /// Seal the period in progress
    pub fn close(&mut self) {
        let facts = std::mem::take(&mut self.current);
        self.closed.insert(self.period, facts);
    }

    /// Value of `key` in a closed period
    pub fn get_data(&self, key: &str, period: usize) -> Option<f64> {
        self.closed.get(&period).and_then(|facts| facts.get(key)).copied()
    }

    /// All facts of a closed period
    pub fn period_facts(&self, period: usize) -> Option<&BTreeMap<String, f64>> {
        self.closed.get(&period)
    }

    /// Last closed period, if any
    pub fn last_closed_period(&self) -> Option<usize> {
        self.closed.keys().next_back().copied()
    }
}
