//! Macro Simulator Core - Rust Engine
//!
//! Agent-based macroeconomic simulator with deterministic execution.
//! Firms hire workers, produce, price with a markup over unit cost, pay
//! wages and dividends; households search for jobs and consume. All money
//! is bank money and every payment goes through a cheque.
//!
//! # Architecture
//!
//! - **core**: Period clock and parameter lookup
//! - **models**: Domain types (Bank, Cheque, Goods, Sector, Economy)
//! - **agents**: Firm, Worker and Shareholder behavior
//! - **markets**: Labor and goods market matching
//! - **orchestrator**: Period scheduler and snapshots
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. All money values are i64
//! 2. All randomness is deterministic (seeded RNG)
//! 3. Money is only created by lending and destroyed by repayment
//! 4. FFI boundary is minimal and safe

// Module declarations
pub mod agents;
pub mod core;
pub mod markets;
pub mod models;
pub mod orchestrator;
pub mod rng;

// Re-exports for convenience
pub use agents::{
    AgentError, AgentId, Firm, FirmConfig, Phase, Role, Shareholder, ShareholderConfig,
    WorkforceTarget, Worker, WorkerConfig,
};
pub use core::params::{ConfigError, Parameters};
pub use core::time::PeriodClock;
pub use markets::{ConsumptionConfig, ConsumptionReport, Employment};
pub use models::{
    bank::{Account, AccountId, Bank, BankError, Banks, Cheque, Loan},
    contract::{JobOffer, LaborContract},
    dataset::AgentDataset,
    event::{Event, EventLog},
    factory::{Factory, ProductionReport},
    goods::{value_at, AccountingError, Goods, Inventory, Supply},
    sector::{Sector, Sectors},
    state::{Context, Economy},
    Amount, AmountError,
};
pub use orchestrator::{
    PeriodResult, PeriodSnapshot, PhaseConfig, SectorConfig, Simulation, SimulationConfig,
    SimulationError,
};
pub use rng::RngManager;

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn macro_simulator_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::simulation::PySimulation>()?;
    Ok(())
}
