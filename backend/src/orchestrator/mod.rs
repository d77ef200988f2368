//! Orchestrator - the period loop
//!
//! See `engine.rs` for the scheduler and `checkpoint.rs` for snapshots.

pub mod checkpoint;
pub mod engine;

// Re-export main types for convenience
pub use engine::{
    PeriodResult, PhaseConfig, SectorConfig, Simulation, SimulationConfig, SimulationError,
};

// Re-export checkpoint types
pub use checkpoint::{
    compute_config_hash, validate_snapshot, AccountSnapshot, BankSnapshot, FirmSnapshot,
    PeriodSnapshot,
};
