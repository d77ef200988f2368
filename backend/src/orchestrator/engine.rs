//! Simulation engine: the period scheduler
//!
//! The engine owns the [`Economy`] and drives it one period at a time:
//!
//! ```text
//! For each period p:
//! 1. Advance the clock
//! 2. open() every agent, sectors in declaration order
//! 3. For each scheduled phase, for each listed sector, for each member:
//!    run the member's action for that phase
//! 4. close() every agent (datasets of p become immutable)
//! 5. Check money conservation across all banks
//! ```
//!
//! A period is atomic: any error aborts the run and names the period, the
//! phase and the agent it occurred in.
//!
//! # Determinism
//!
//! All randomness comes from one seeded `RngManager`. Its draw order is
//! creation order (bank picks), then per period the opens, then the phases
//! in schedule order. Same seed + same config = identical results.
//!
//! # Example
//!
//! ```rust
//! use macro_simulator_core_rs::{Simulation, SimulationConfig};
//!
//! let config = SimulationConfig::from_json(r#"{
//!     "seed": 42,
//!     "periods": 3,
//!     "sectors": [
//!         { "name": "Banks", "role": "bank", "agents": 1 },
//!         { "name": "Shareholders", "role": "shareholder", "agents": 5, "parameters": {
//!             "financing": { "bankSector": "Banks" },
//!             "goodMarket": { "suppliers": "Firms", "search": 3, "savingPropensity": 0.1 } } },
//!         { "name": "Firms", "role": "firm", "agents": 2, "parameters": {
//!             "financing": { "bankSector": "Banks" },
//!             "pricing": { "initialMarkup": 1.2, "markupFlexibility": 0.05 },
//!             "workforce": { "wage": 10, "jobContracts": { "min": 4, "max": 8 } },
//!             "inventories": { "normalVolumeRatio": 2.0 },
//!             "production": { "capacity": 10, "productivity": 1 } } },
//!         { "name": "Workers", "role": "worker", "agents": 10, "parameters": {
//!             "financing": { "bankSector": "Banks" },
//!             "laborMarket": { "employers": "Firms", "search": 2 },
//!             "goodMarket": { "suppliers": "Firms", "search": 2, "savingPropensity": 0.2 } } }
//!     ],
//!     "phases": [
//!         { "name": "planProduction", "sectors": ["Firms"] },
//!         { "name": "jobSearch", "sectors": ["Workers"] },
//!         { "name": "production", "sectors": ["Firms"] },
//!         { "name": "payWages", "sectors": ["Firms"] },
//!         { "name": "consumption", "sectors": ["Workers", "Shareholders"] },
//!         { "name": "payDividends", "sectors": ["Firms"] }
//!     ]
//! }"#).unwrap();
//!
//! let mut simulation = Simulation::new(config).unwrap();
//! let results = simulation.run().unwrap();
//! assert_eq!(results.len(), 3);
//! assert!(simulation.is_finished());
//! ```

use crate::agents::firm::{Firm, FirmConfig};
use crate::agents::shareholder::{Shareholder, ShareholderConfig};
use crate::agents::worker::{Worker, WorkerConfig};
use crate::agents::{AgentError, AgentId, Phase, Role};
use crate::core::params::{ConfigError, Parameters};
use crate::core::time::PeriodClock;
use crate::models::dataset::keys;
use crate::models::event::EventLog;
use crate::models::goods::AccountingError;
use crate::models::sector::Sector;
use crate::models::state::Economy;
use crate::orchestrator::checkpoint::{compute_config_hash, PeriodSnapshot};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Configuration Types
// ============================================================================

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// RNG seed for deterministic simulation
    pub seed: u64,

    /// Number of periods to simulate
    pub periods: usize,

    /// Sectors, created banks first, then in declaration order
    pub sectors: Vec<SectorConfig>,

    /// Phases in execution order
    pub phases: Vec<PhaseConfig>,
}

impl SimulationConfig {
    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        serde_json::from_str(json).map_err(|e| SimulationError::Serialization(e.to_string()))
    }
}

/// One sector: a named population of agents of one role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorConfig {
    pub name: String,

    /// `firm`, `worker`, `shareholder` or `bank`
    pub role: String,

    /// Number of agents created at start
    pub agents: usize,

    #[serde(default)]
    pub parameters: Parameters,
}

/// One scheduled phase and the sectors it applies to, in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseConfig {
    pub name: String,
    pub sectors: Vec<String>,
}

/// A phase resolved at setup
#[derive(Debug, Clone)]
struct ScheduledPhase {
    phase: Phase,
    sectors: Vec<String>,
}

/// Parsed behavior of a sector
#[derive(Debug, Clone)]
enum SectorSpec {
    Bank(Parameters),
    Firm(FirmConfig),
    Worker(WorkerConfig),
    Shareholder(ShareholderConfig),
}

// ============================================================================
// Results and Errors
// ============================================================================

/// Economy-wide totals of a closed period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodResult {
    pub period: usize,

    /// Σ balances + outstanding cheques
    pub money: i64,

    /// Σ debts
    pub debt: i64,

    pub production: f64,
    pub sales_value: f64,
    pub consumption_volume: f64,
    pub consumption_value: f64,
    pub wage_bill: f64,
    pub dividends: f64,
    pub employed: f64,
    pub job_offers: f64,

    /// Events logged during the period
    pub events: usize,
}

/// Simulation error types
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SimulationError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to create {agent}: {source}")]
    Setup { agent: AgentId, source: AgentError },

    #[error("Period {period}, phase {phase}, agent {agent}: {source}")]
    Phase {
        period: usize,
        phase: String,
        agent: AgentId,
        source: AgentError,
    },

    #[error("Period {period}: {source}")]
    Accounting {
        period: usize,
        source: AccountingError,
    },

    #[error("Simulation finished after {periods} periods")]
    Finished { periods: usize },

    #[error("Simulation aborted in period {period}")]
    Aborted { period: usize },

    #[error("State validation failed: {0}")]
    StateValidation(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

// ============================================================================
// Simulation
// ============================================================================

/// The period scheduler
///
/// Holds no business state of its own: everything lives in the [`Economy`].
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    config_hash: String,
    economy: Economy,
    clock: PeriodClock,
    schedule: Vec<ScheduledPhase>,

    /// Event log length at the start of the current period
    period_start_event: usize,

    /// Period whose failure stopped the run
    aborted: Option<usize>,
}

impl Simulation {
    /// Validate the configuration and create every agent
    ///
    /// # Errors
    /// Every configuration problem (unknown role or phase, phase scheduled on
    /// a sector whose role has no such action, missing or ill-typed
    /// parameter, dangling sector reference) fails here, before period 1.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        if config.periods == 0 {
            return Err(ConfigError::InvalidValue {
                path: "periods".to_string(),
                reason: "must be positive".to_string(),
            }
            .into());
        }

        let mut economy = Economy::new(config.seed);
        let mut specs = Vec::with_capacity(config.sectors.len());
        for sector in &config.sectors {
            let role = Role::from_name(&sector.role)?;
            if sector.agents == 0 {
                return Err(ConfigError::EmptySector {
                    name: sector.name.clone(),
                }
                .into());
            }
            economy
                .sectors_mut()
                .push(Sector::new(sector.name.clone(), role, sector.parameters.clone()))?;
            specs.push(Self::parse_sector(role, &sector.parameters)?);
        }

        Self::validate_references(&economy, &specs)?;
        let schedule = Self::resolve_schedule(&economy, &config.phases)?;

        // Banks first: every other agent needs one to open its account
        for (sector, spec) in config.sectors.iter().zip(&specs) {
            if let SectorSpec::Bank(params) = spec {
                for _ in 0..sector.agents {
                    economy.add_bank(&sector.name, params)?;
                }
            }
        }
        for (sector, spec) in config.sectors.iter().zip(&specs) {
            for _ in 0..sector.agents {
                Self::create_agent(&mut economy, &sector.name, spec)?;
            }
        }

        let config_hash = compute_config_hash(&config)?;
        log::info!(
            "simulation created: {} agents in {} sectors, {} periods",
            economy.num_agents(),
            economy.sectors().len(),
            config.periods
        );

        Ok(Self {
            clock: PeriodClock::new(config.periods),
            config,
            config_hash,
            economy,
            schedule,
            period_start_event: 0,
            aborted: None,
        })
    }

    fn parse_sector(role: Role, params: &Parameters) -> Result<SectorSpec, ConfigError> {
        Ok(match role {
            Role::Bank => SectorSpec::Bank(params.clone()),
            Role::Firm => SectorSpec::Firm(FirmConfig::from_params(params)?),
            Role::Worker => SectorSpec::Worker(WorkerConfig::from_params(params)?),
            Role::Shareholder => SectorSpec::Shareholder(ShareholderConfig::from_params(params)?),
        })
    }

    /// Every sector a configuration names must exist with the right role
    fn validate_references(economy: &Economy, specs: &[SectorSpec]) -> Result<(), ConfigError> {
        let sectors = economy.sectors();
        for spec in specs {
            match spec {
                SectorSpec::Bank(_) => {}
                SectorSpec::Firm(firm) => {
                    sectors.get_with_role(&firm.bank_sector, Role::Bank)?;
                    sectors.get_with_role(&firm.ownership_sector, Role::Shareholder)?;
                }
                SectorSpec::Worker(worker) => {
                    sectors.get_with_role(&worker.bank_sector, Role::Bank)?;
                    sectors.get_with_role(&worker.employers, Role::Firm)?;
                    sectors.get_with_role(&worker.consumption.suppliers, Role::Firm)?;
                }
                SectorSpec::Shareholder(shareholder) => {
                    sectors.get_with_role(&shareholder.bank_sector, Role::Bank)?;
                    sectors.get_with_role(&shareholder.consumption.suppliers, Role::Firm)?;
                }
            }
        }
        Ok(())
    }

    fn resolve_schedule(
        economy: &Economy,
        phases: &[PhaseConfig],
    ) -> Result<Vec<ScheduledPhase>, ConfigError> {
        phases
            .iter()
            .map(|config| {
                let phase = Phase::from_name(&config.name)?;
                for name in &config.sectors {
                    let sector = economy.sectors().get(name)?;
                    if !sector.role().supports(phase) {
                        return Err(ConfigError::UnsupportedPhase {
                            phase: config.name.clone(),
                            sector: name.clone(),
                            role: sector.role().to_string(),
                        });
                    }
                }
                Ok(ScheduledPhase {
                    phase,
                    sectors: config.sectors.clone(),
                })
            })
            .collect()
    }

    fn create_agent(economy: &mut Economy, sector: &str, spec: &SectorSpec) -> Result<(), SimulationError> {
        let (role, bank_sector) = match spec {
            SectorSpec::Bank(_) => return Ok(()),
            SectorSpec::Firm(config) => (Role::Firm, &config.bank_sector),
            SectorSpec::Worker(config) => (Role::Worker, &config.bank_sector),
            SectorSpec::Shareholder(config) => (Role::Shareholder, &config.bank_sector),
        };
        let index = economy.next_index(role);
        let agent = AgentId::new(role, index);
        let account = economy
            .open_account(agent, bank_sector)
            .map_err(|source| SimulationError::Setup { agent, source })?;

        match spec {
            SectorSpec::Firm(config) => {
                economy.add_firm(sector, Firm::new(index, account, config.clone()))?
            }
            SectorSpec::Worker(config) => {
                economy.add_worker(sector, Worker::new(index, account, config.clone()))?
            }
            SectorSpec::Shareholder(config) => {
                economy.add_shareholder(sector, Shareholder::new(index, account, config.clone()))?
            }
            SectorSpec::Bank(_) => return Ok(()),
        };
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Last period started (0 before the first)
    pub fn current_period(&self) -> usize {
        self.clock.current_period()
    }

    pub fn total_periods(&self) -> usize {
        self.clock.total_periods()
    }

    pub fn is_finished(&self) -> bool {
        self.clock.is_finished()
    }

    /// Period whose failure stopped the run, if any
    pub fn aborted_at(&self) -> Option<usize> {
        self.aborted
    }

    fn ensure_running(&self) -> Result<(), SimulationError> {
        match self.aborted {
            Some(period) => Err(SimulationError::Aborted { period }),
            None => Ok(()),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn config_hash(&self) -> &str {
        &self.config_hash
    }

    pub fn economy(&self) -> &Economy {
        &self.economy
    }

    pub fn event_log(&self) -> &EventLog {
        self.economy.events()
    }

    pub fn get_sector(&self, name: &str) -> Option<&Sector> {
        self.economy.sectors().get(name).ok()
    }

    /// Value of `key` for `agent` in a closed period
    pub fn get_data(&self, agent: AgentId, key: &str, period: usize) -> Option<f64> {
        self.economy
            .dataset(agent)
            .ok()
            .and_then(|dataset| dataset.get_data(key, period))
    }

    /// Sum of `key` over the members of a sector in a closed period
    ///
    /// `None` if the sector does not exist or no member recorded the key.
    pub fn sector_total(&self, sector: &str, key: &str, period: usize) -> Option<f64> {
        let sector = self.economy.sectors().get(sector).ok()?;
        let values: Vec<f64> = sector
            .members()
            .iter()
            .filter_map(|&agent| self.get_data(agent, key, period))
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum())
        }
    }

    // ------------------------------------------------------------------------
    // Period loop
    // ------------------------------------------------------------------------

    /// Run one complete period
    ///
    /// # Errors
    /// - `Phase` if any agent fails during open, a phase action or close
    /// - `Accounting` if money is not conserved at period end
    /// - `Finished` if every configured period has already run
    /// - `Aborted` once a period has failed: its books are left half
    ///   written, so the run cannot continue
    pub fn run_period(&mut self) -> Result<PeriodResult, SimulationError> {
        self.ensure_running()?;
        if self.clock.is_finished() {
            return Err(SimulationError::Finished {
                periods: self.clock.total_periods(),
            });
        }
        self.clock.advance();
        let period = self.clock.current_period();
        let result = self.execute_period(period);
        if let Err(error) = &result {
            log::error!("{}", error);
            self.aborted = Some(period);
        }
        result
    }

    /// Open, scheduled phases, close and the money check of one period
    fn execute_period(&mut self, period: usize) -> Result<PeriodResult, SimulationError> {
        self.period_start_event = self.economy.events().len();

        let agents: Vec<AgentId> = self
            .economy
            .sectors()
            .iter()
            .flat_map(|sector| sector.members().iter().copied())
            .collect();

        for &agent in &agents {
            self.economy
                .open(agent, period)
                .map_err(|source| SimulationError::Phase {
                    period,
                    phase: "open".to_string(),
                    agent,
                    source,
                })?;
        }

        for step in &self.schedule {
            for name in &step.sectors {
                let members = self.economy.sectors().get(name)?.members().to_vec();
                for agent in members {
                    self.economy
                        .act(step.phase, agent, period)
                        .map_err(|source| SimulationError::Phase {
                            period,
                            phase: step.phase.name().to_string(),
                            agent,
                            source,
                        })?;
                }
            }
        }

        for &agent in &agents {
            self.economy
                .close(agent)
                .map_err(|source| SimulationError::Phase {
                    period,
                    phase: "close".to_string(),
                    agent,
                    source,
                })?;
        }

        self.economy
            .check_conservation()
            .map_err(|source| SimulationError::Accounting { period, source })?;

        let result = self.period_result(period);
        log::info!(
            "period {}: money {}, debt {}, production {}, consumption {}, employed {}",
            period,
            result.money,
            result.debt,
            result.production,
            result.consumption_volume,
            result.employed
        );
        Ok(result)
    }

    /// Run every remaining period
    pub fn run(&mut self) -> Result<Vec<PeriodResult>, SimulationError> {
        self.ensure_running()?;
        let mut results = Vec::with_capacity(self.clock.remaining());
        while !self.clock.is_finished() {
            results.push(self.run_period()?);
        }
        Ok(results)
    }

    fn role_total(&self, role: Role, key: &str, period: usize) -> f64 {
        self.economy
            .sectors()
            .iter()
            .filter(|sector| sector.role() == role)
            .flat_map(|sector| sector.members().iter())
            .filter_map(|&agent| self.get_data(agent, key, period))
            .sum()
    }

    fn household_total(&self, key: &str, period: usize) -> f64 {
        self.role_total(Role::Worker, key, period) + self.role_total(Role::Shareholder, key, period)
    }

    fn period_result(&self, period: usize) -> PeriodResult {
        PeriodResult {
            period,
            money: self.economy.total_money(),
            debt: self.economy.total_debt(),
            production: self.role_total(Role::Firm, keys::PRODUCTION, period),
            sales_value: self.role_total(Role::Firm, keys::SALES_VALUE, period),
            consumption_volume: self.household_total(keys::CONSUMPTION_VOLUME, period),
            consumption_value: self.household_total(keys::CONSUMPTION_VALUE, period),
            wage_bill: self.role_total(Role::Firm, keys::WAGE_BILL, period),
            dividends: self.role_total(Role::Firm, keys::DIVIDENDS, period),
            employed: self.role_total(Role::Worker, keys::EMPLOYED, period),
            job_offers: self.role_total(Role::Firm, keys::JOB_OFFERS, period),
            events: self.economy.events().len() - self.period_start_event,
        }
    }

    /// Snapshot of the last closed period
    ///
    /// # Errors
    /// `Aborted` if a period failed: there is no consistent state to capture
    pub fn snapshot(&self) -> Result<PeriodSnapshot, SimulationError> {
        self.ensure_running()?;
        Ok(PeriodSnapshot::capture(self))
    }
}
