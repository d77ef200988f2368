//! Labor contracts and job offers
//!
//! A contract is owned by its employer's payroll; the worker only keeps the
//! contract id and asks the employer whether it is still valid.

use crate::agents::{AgentError, AgentId};
use crate::models::bank::AccountId;
use serde::{Deserialize, Serialize};

/// A binding employment relationship with a finite, decrementing term
///
/// # Example
/// ```
/// use macro_simulator_core_rs::{AccountId, AgentId, LaborContract};
///
/// let account = AccountId { bank: 0, slot: 1 };
/// let mut contract = LaborContract::new(1, AgentId::firm(0), AgentId::worker(0), account, 10, 2, 1);
/// assert!(contract.is_valid());
///
/// contract.tick();
/// assert!(contract.is_valid());
/// contract.tick();
/// assert!(!contract.is_valid());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaborContract {
    id: u64,
    employer: AgentId,
    worker: AgentId,
    worker_account: AccountId,
    wage: i64,
    remaining_term: usize,
    start_period: usize,
    breached: bool,
}

impl LaborContract {
    /// # Panics
    /// Panics if `term` is zero or `wage` is not positive
    pub fn new(
        id: u64,
        employer: AgentId,
        worker: AgentId,
        worker_account: AccountId,
        wage: i64,
        term: usize,
        start_period: usize,
    ) -> Self {
        assert!(term > 0, "contract term must be positive");
        assert!(wage > 0, "wage must be positive");
        Self {
            id,
            employer,
            worker,
            worker_account,
            wage,
            remaining_term: term,
            start_period,
            breached: false,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn employer(&self) -> AgentId {
        self.employer
    }

    pub fn worker(&self) -> AgentId {
        self.worker
    }

    /// Account the wage cheques are payable to
    pub fn worker_account(&self) -> AccountId {
        self.worker_account
    }

    pub fn wage(&self) -> i64 {
        self.wage
    }

    pub fn remaining_term(&self) -> usize {
        self.remaining_term
    }

    pub fn start_period(&self) -> usize {
        self.start_period
    }

    pub fn is_breached(&self) -> bool {
        self.breached
    }

    /// Valid while not breached and at least one period remains
    pub fn is_valid(&self) -> bool {
        !self.breached && self.remaining_term >= 1
    }

    /// One period worked
    pub fn tick(&mut self) {
        self.remaining_term = self.remaining_term.saturating_sub(1);
    }

    /// Layoff: invalid immediately, whatever the remaining term
    pub fn breach(&mut self) {
        self.breached = true;
    }
}

/// An employer's standing labor-market offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOffer {
    employer: AgentId,
    wage: i64,
    vacancies: usize,
}

impl JobOffer {
    pub fn new(employer: AgentId, wage: i64) -> Self {
        Self {
            employer,
            wage,
            vacancies: 0,
        }
    }

    pub fn employer(&self) -> AgentId {
        self.employer
    }

    pub fn wage(&self) -> i64 {
        self.wage
    }

    pub fn vacancies(&self) -> usize {
        self.vacancies
    }

    pub fn is_empty(&self) -> bool {
        self.vacancies == 0
    }

    /// Withdraw all vacancies
    pub fn reset(&mut self) {
        self.vacancies = 0;
    }

    pub fn post(&mut self, wage: i64, vacancies: usize) {
        self.wage = wage;
        self.vacancies = vacancies;
    }

    /// Fill one vacancy
    pub fn accept(&mut self) -> Result<(), AgentError> {
        if self.vacancies == 0 {
            return Err(AgentError::NoVacancy {
                agent: self.employer,
            });
        }
        self.vacancies -= 1;
        Ok(())
    }
}
