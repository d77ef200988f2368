//! Checkpoint - period snapshots for reporting and replay comparison
//!
//! A snapshot is taken between periods, so it only ever shows fully closed
//! state. It records the config hash, which lets a reader check that two
//! snapshots come from the same model.
//!
//! # Critical Invariants
//!
//! - **Determinism**: Same seed + config produces identical snapshots
//! - **Money Conservation**: Σ balances + outstanding = Σ lent − Σ repaid
//! - **Clearing Balance**: interbank positions sum to zero
//! - **Config Matching**: snapshots are only comparable under the same config hash

use crate::agents::AgentId;
use crate::models::bank::AccountId;
use crate::orchestrator::engine::{Simulation, SimulationError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

// ============================================================================
// Snapshot Structures
// ============================================================================

/// State of the economy after a closed period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSnapshot {
    /// Last closed period (0 before the first)
    pub period: usize,

    /// RNG state at time of snapshot (CRITICAL for determinism)
    pub rng_state: u64,

    /// SHA256 hash of the configuration
    pub config_hash: String,

    pub accounts: Vec<AccountSnapshot>,
    pub banks: Vec<BankSnapshot>,
    pub firms: Vec<FirmSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub account: AccountId,
    pub holder: AgentId,
    pub balance: i64,
    pub debt: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankSnapshot {
    pub bank: AgentId,
    pub lent: i64,
    pub repaid: i64,
    pub clearing: i64,
    pub outstanding_cheques: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirmSnapshot {
    pub firm: AgentId,
    pub payroll: usize,
    pub vacancies: usize,
    pub inventory_volume: i64,
    pub inventory_value: i64,
    pub price: Option<f64>,
    pub markup: f64,
    pub owners: usize,
}

impl PeriodSnapshot {
    pub fn capture(simulation: &Simulation) -> Self {
        let economy = simulation.economy();
        let banks = economy.banks();

        let accounts = banks
            .iter()
            .flat_map(|bank| bank.accounts().iter())
            .map(|account| AccountSnapshot {
                account: account.id(),
                holder: account.holder(),
                balance: account.balance(),
                debt: account.debt(),
            })
            .collect();

        let bank_snapshots = banks
            .iter()
            .map(|bank| BankSnapshot {
                bank: bank.id(),
                lent: bank.total_lent(),
                repaid: bank.total_repaid(),
                clearing: bank.clearing(),
                outstanding_cheques: bank.outstanding_cheques(),
            })
            .collect();

        let firms = economy
            .firms()
            .iter()
            .map(|firm| FirmSnapshot {
                firm: firm.id(),
                payroll: firm.payroll().len(),
                vacancies: firm.job_offer().vacancies(),
                inventory_volume: firm.factory().inventory().volume(),
                inventory_value: firm.factory().inventory().value(),
                price: firm.supply().price(),
                markup: firm.markup(),
                owners: firm.owners().len(),
            })
            .collect();

        Self {
            period: simulation.current_period(),
            rng_state: economy.rng().get_state(),
            config_hash: simulation.config_hash().to_string(),
            accounts,
            banks: bank_snapshots,
            firms,
        }
    }

    /// Σ balances + outstanding cheques
    pub fn total_money(&self) -> i64 {
        let balances: i64 = self.accounts.iter().map(|a| a.balance).sum();
        let outstanding: i64 = self.banks.iter().map(|b| b.outstanding_cheques).sum();
        balances + outstanding
    }

    pub fn to_json(&self) -> Result<String, SimulationError> {
        serde_json::to_string(self).map_err(|e| SimulationError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        serde_json::from_str(json).map_err(|e| SimulationError::Serialization(e.to_string()))
    }
}

// ============================================================================
// Config Hashing
// ============================================================================

/// Object keys sorted at every depth, so the hash ignores map ordering
fn canonical(value: serde_json::Value) -> serde_json::Value {
    use serde_json::Value;

    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, canonical(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonical).collect()),
        scalar => scalar,
    }
}

/// Hex SHA-256 of the canonical JSON form of a configuration
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, SimulationError> {
    let serialization = |e: serde_json::Error| {
        SimulationError::Serialization(format!("cannot hash configuration: {}", e))
    };
    let value = serde_json::to_value(config).map_err(serialization)?;
    let bytes = serde_json::to_vec(&canonical(value)).map_err(serialization)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Checks a snapshot's books: money matches lending net of repayments,
/// interbank clearing nets to zero, and no holder has two accounts at the
/// same bank.
pub fn validate_snapshot(snapshot: &PeriodSnapshot) -> Result<(), SimulationError> {
    // 1. Money conservation
    let created: i64 = snapshot.banks.iter().map(|b| b.lent - b.repaid).sum();
    let money = snapshot.total_money();
    if money != created {
        return Err(SimulationError::StateValidation(format!(
            "Money conservation violated: created {}, found {}",
            created, money
        )));
    }

    // 2. Clearing
    let clearing: i64 = snapshot.banks.iter().map(|b| b.clearing).sum();
    if clearing != 0 {
        return Err(SimulationError::StateValidation(format!(
            "Interbank clearing does not net to zero: {}",
            clearing
        )));
    }

    // 3. Account ownership
    let mut seen = HashSet::new();
    for account in &snapshot.accounts {
        if !seen.insert((account.account.bank, account.holder)) {
            return Err(SimulationError::StateValidation(format!(
                "{} holds two accounts at bank {}",
                account.holder, account.account.bank
            )));
        }
    }

    Ok(())
}
