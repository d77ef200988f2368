//! Snapshot tests
//!
//! Snapshots capture closed state, validate the money invariants and carry
//! the config hash.

mod common;

use common::scenario;
use macro_simulator_core_rs::orchestrator::{compute_config_hash, validate_snapshot};
use macro_simulator_core_rs::{PeriodSnapshot, Simulation, SimulationError};

#[test]
fn test_config_hash_stable_and_sensitive() {
    let a = Simulation::new(scenario(1, 4)).unwrap();
    let b = Simulation::new(scenario(1, 4)).unwrap();
    let c = Simulation::new(scenario(2, 4)).unwrap();

    assert_eq!(a.config_hash(), b.config_hash());
    assert_ne!(a.config_hash(), c.config_hash());
    assert_eq!(a.config_hash().len(), 64);
    assert_eq!(
        a.config_hash(),
        compute_config_hash(&scenario(1, 4)).unwrap()
    );
}

#[test]
fn test_snapshot_validates_after_every_period() {
    let mut simulation = Simulation::new(scenario(42, 10)).unwrap();
    validate_snapshot(&simulation.snapshot().unwrap()).unwrap();

    while !simulation.is_finished() {
        simulation.run_period().unwrap();
        let snapshot = simulation.snapshot().unwrap();
        assert_eq!(snapshot.period, simulation.current_period());
        assert_eq!(snapshot.config_hash, simulation.config_hash());
        validate_snapshot(&snapshot).unwrap();
    }
}

#[test]
fn test_snapshot_covers_every_account_and_firm() {
    let mut simulation = Simulation::new(scenario(42, 3)).unwrap();
    simulation.run().unwrap();
    let snapshot = simulation.snapshot().unwrap();

    // 5 shareholders + 3 firms + 20 workers
    assert_eq!(snapshot.accounts.len(), 28);
    assert_eq!(snapshot.banks.len(), 1);
    assert_eq!(snapshot.firms.len(), 3);
    assert_eq!(snapshot.total_money(), simulation.economy().total_money());
    for firm in &snapshot.firms {
        assert_eq!(firm.owners, 5);
        assert!(firm.vacancies < 10);
    }
}

#[test]
fn test_snapshot_json_round_trip() {
    let mut simulation = Simulation::new(scenario(8, 2)).unwrap();
    simulation.run().unwrap();
    let snapshot = simulation.snapshot().unwrap();

    let json = snapshot.to_json().unwrap();
    assert_eq!(PeriodSnapshot::from_json(&json).unwrap(), snapshot);
}

#[test]
fn test_tampered_snapshot_rejected() {
    let mut simulation = Simulation::new(scenario(8, 2)).unwrap();
    simulation.run().unwrap();

    let mut snapshot = simulation.snapshot().unwrap();
    snapshot.accounts[0].balance += 1;
    assert!(matches!(
        validate_snapshot(&snapshot),
        Err(SimulationError::StateValidation(_))
    ));

    let mut snapshot = simulation.snapshot().unwrap();
    let mut duplicate = snapshot.accounts[0].clone();
    duplicate.balance = 0;
    snapshot.accounts.push(duplicate);
    let error = validate_snapshot(&snapshot).unwrap_err();
    assert!(error.to_string().contains("two accounts"), "{}", error);
}
