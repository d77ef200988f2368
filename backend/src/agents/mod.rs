//! Agent roles
//!
//! Agents are stored in one arena per role inside [`Economy`](crate::Economy)
//! and referred to by [`AgentId`]. Each role implements the shared lifecycle
//! (`open`, phase actions, `close`) plus the capabilities that make sense for
//! it: a firm is an employer and a supplier, workers and shareholders are
//! households, a bank keeps accounts.
//!
//! Phase names are resolved to [`Phase`] once, when the simulation is built;
//! [`Role::supports`] is the registration table checked at that point.

pub mod firm;
pub mod shareholder;
pub mod worker;

use crate::core::params::ConfigError;
use crate::models::amount::AmountError;
use crate::models::bank::BankError;
use crate::models::goods::AccountingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use firm::{Firm, FirmConfig, WorkforceTarget};
pub use shareholder::{Shareholder, ShareholderConfig};
pub use worker::{Worker, WorkerConfig};

/// Agent role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Firm,
    Worker,
    Shareholder,
    Bank,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Role::Firm => "firm",
            Role::Worker => "worker",
            Role::Shareholder => "shareholder",
            Role::Bank => "bank",
        }
    }

    pub fn from_name(name: &str) -> Result<Role, ConfigError> {
        match name {
            "firm" => Ok(Role::Firm),
            "worker" => Ok(Role::Worker),
            "shareholder" => Ok(Role::Shareholder),
            "bank" => Ok(Role::Bank),
            other => Err(ConfigError::UnknownRole {
                role: other.to_string(),
            }),
        }
    }

    /// Phase actions registered for this role
    pub fn phases(&self) -> &'static [Phase] {
        match self {
            Role::Firm => &[
                Phase::PlanProduction,
                Phase::Production,
                Phase::PayWages,
                Phase::PayDividends,
            ],
            Role::Worker => &[Phase::JobSearch, Phase::Consumption],
            Role::Shareholder => &[Phase::Consumption],
            Role::Bank => &[],
        }
    }

    /// # Example
    /// ```
    /// use macro_simulator_core_rs::{Phase, Role};
    ///
    /// assert!(Role::Firm.supports(Phase::PayWages));
    /// assert!(!Role::Shareholder.supports(Phase::Production));
    /// ```
    pub fn supports(&self, phase: Phase) -> bool {
        self.phases().contains(&phase)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Phase of a period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    PlanProduction,
    Production,
    PayWages,
    PayDividends,
    JobSearch,
    Consumption,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::PlanProduction,
        Phase::Production,
        Phase::PayWages,
        Phase::PayDividends,
        Phase::JobSearch,
        Phase::Consumption,
    ];

    /// Name used in configurations
    pub fn name(&self) -> &'static str {
        match self {
            Phase::PlanProduction => "planProduction",
            Phase::Production => "production",
            Phase::PayWages => "payWages",
            Phase::PayDividends => "payDividends",
            Phase::JobSearch => "jobSearch",
            Phase::Consumption => "consumption",
        }
    }

    /// # Example
    /// ```
    /// use macro_simulator_core_rs::Phase;
    ///
    /// assert_eq!(Phase::from_name("payWages").unwrap(), Phase::PayWages);
    /// assert!(Phase::from_name("investment").is_err());
    /// ```
    pub fn from_name(name: &str) -> Result<Phase, ConfigError> {
        Phase::ALL
            .iter()
            .copied()
            .find(|phase| phase.name() == name)
            .ok_or_else(|| ConfigError::UnknownPhase {
                phase: name.to_string(),
            })
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity of an agent: its role arena and its slot in it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId {
    pub role: Role,
    pub index: usize,
}

impl AgentId {
    pub fn new(role: Role, index: usize) -> Self {
        Self { role, index }
    }

    pub fn firm(index: usize) -> Self {
        Self::new(Role::Firm, index)
    }

    pub fn worker(index: usize) -> Self {
        Self::new(Role::Worker, index)
    }

    pub fn shareholder(index: usize) -> Self {
        Self::new(Role::Shareholder, index)
    }

    pub fn bank(index: usize) -> Self {
        Self::new(Role::Bank, index)
    }
}

/// Agent names look like `firm_3`
impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.role, self.index)
    }
}

impl FromStr for AgentId {
    type Err = ConfigError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidValue {
            path: "agent".to_string(),
            reason: format!("'{}' is not of the form role_index", name),
        };
        let (role, index) = name.rsplit_once('_').ok_or_else(invalid)?;
        let index = index.parse::<usize>().map_err(|_| invalid())?;
        Ok(AgentId::new(Role::from_name(role)?, index))
    }
}

/// Agent `id` in the arena of `role`
///
/// `capability` names what the caller needs the agent for; asking the
/// wrong role for it is a `CapabilityMisuse`.
pub(crate) fn arena<'a, T>(
    agents: &'a [T],
    id: AgentId,
    role: Role,
    capability: &'static str,
) -> Result<&'a T, AgentError> {
    if id.role != role {
        return Err(AgentError::CapabilityMisuse {
            agent: id,
            capability,
        });
    }
    agents
        .get(id.index)
        .ok_or(AgentError::UnknownAgent { agent: id })
}

pub(crate) fn arena_mut<'a, T>(
    agents: &'a mut [T],
    id: AgentId,
    role: Role,
    capability: &'static str,
) -> Result<&'a mut T, AgentError> {
    if id.role != role {
        return Err(AgentError::CapabilityMisuse {
            agent: id,
            capability,
        });
    }
    agents
        .get_mut(id.index)
        .ok_or(AgentError::UnknownAgent { agent: id })
}

/// Errors raised while an agent acts
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AgentError {
    #[error("Bank error: {0}")]
    Bank(#[from] BankError),

    #[error("Accounting inconsistency: {0}")]
    Accounting(#[from] AccountingError),

    #[error("Amount error: {0}")]
    Amount(#[from] AmountError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Agent {agent} does not support {capability}")]
    CapabilityMisuse {
        agent: AgentId,
        capability: &'static str,
    },

    #[error("Firm {agent} has no owners")]
    NoOwners { agent: AgentId },

    #[error("Agent {agent} has no vacancy")]
    NoVacancy { agent: AgentId },

    #[error("Unknown agent {agent}")]
    UnknownAgent { agent: AgentId },
}
