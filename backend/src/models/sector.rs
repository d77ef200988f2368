//! Sectors: agent registry and bounded random search
//!
//! A sector holds every agent of one role created from the same
//! configuration block. Market search never scans a whole sector; it asks
//! for a random sample with `select`.

use crate::agents::{AgentId, Role};
use crate::core::params::{ConfigError, Parameters};
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named group of agents sharing a role and parameters
///
/// # Example
/// ```
/// use macro_simulator_core_rs::{AgentId, Parameters, Role, RngManager, Sector};
///
/// let mut sector = Sector::new("Firms", Role::Firm, Parameters::empty());
/// sector.push(AgentId::firm(0));
/// sector.push(AgentId::firm(1));
///
/// let mut rng = RngManager::new(42);
/// let sample = sector.select(3, &mut rng);
/// assert_eq!(sample.len(), 3);
/// assert!(sample[0].is_some() && sample[1].is_some());
/// assert_eq!(sample[2], None); // fewer members than requested
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sector {
    name: String,
    role: Role,
    members: Vec<AgentId>,
    parameters: Parameters,
}

impl Sector {
    pub fn new(name: impl Into<String>, role: Role, parameters: Parameters) -> Self {
        Self {
            name: name.into(),
            role,
            members: Vec::new(),
            parameters,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Members in execution order
    pub fn members(&self) -> &[AgentId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// # Panics
    /// Panics if the agent's role differs from the sector's
    pub fn push(&mut self, agent: AgentId) {
        assert_eq!(agent.role, self.role, "agent role must match sector role");
        self.members.push(agent);
    }

    /// Sample `n` slots without replacement
    ///
    /// The result always has length `n`. When the sector has fewer than `n`
    /// members, every member appears once and the trailing slots are empty.
    /// Draws exactly `min(n, len)` values from `rng`.
    pub fn select(&self, n: usize, rng: &mut RngManager) -> Vec<Option<AgentId>> {
        let mut pool = self.members.clone();
        let picked = n.min(pool.len());

        // Partial Fisher-Yates
        for i in 0..picked {
            let j = i + rng.index(pool.len() - i);
            pool.swap(i, j);
        }

        let mut selection: Vec<Option<AgentId>> = pool[..picked].iter().copied().map(Some).collect();
        selection.resize(n, None);
        selection
    }
}

/// All sectors, in declaration order, with lookup by name
#[derive(Debug, Clone, Default)]
pub struct Sectors {
    sectors: Vec<Sector>,
    by_name: BTreeMap<String, usize>,
}

impl Sectors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sector; names are unique
    pub fn push(&mut self, sector: Sector) -> Result<usize, ConfigError> {
        if self.by_name.contains_key(sector.name()) {
            return Err(ConfigError::DuplicateSector {
                name: sector.name().to_string(),
            });
        }
        let index = self.sectors.len();
        self.by_name.insert(sector.name().to_string(), index);
        self.sectors.push(sector);
        Ok(index)
    }

    pub fn get(&self, name: &str) -> Result<&Sector, ConfigError> {
        self.by_name
            .get(name)
            .map(|&index| &self.sectors[index])
            .ok_or_else(|| ConfigError::UnknownSector {
                name: name.to_string(),
            })
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Sector, ConfigError> {
        match self.by_name.get(name) {
            Some(&index) => Ok(&mut self.sectors[index]),
            None => Err(ConfigError::UnknownSector {
                name: name.to_string(),
            }),
        }
    }

    /// Sector `name`, which must exist and hold agents of `role`
    pub fn get_with_role(&self, name: &str, role: Role) -> Result<&Sector, ConfigError> {
        let sector = self.get(name)?;
        if sector.role() != role {
            return Err(ConfigError::WrongSectorRole {
                sector: name.to_string(),
                expected: role.to_string(),
                found: sector.role().to_string(),
            });
        }
        Ok(sector)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sector> {
        self.sectors.iter()
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }
}
