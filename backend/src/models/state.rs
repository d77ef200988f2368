//! Economy state
//!
//! Holds every agent of the simulation in one arena per role, the banks,
//! the sectors, the random stream and the event log.
//!
//! Agents act on each other through [`Context`], built from disjoint borrows
//! of the economy's fields: while a worker is mutably borrowed from its arena
//! it can still reach the firms arena, the banks and the random stream.
//!
//! # Critical Invariants
//!
//! 1. **Money conservation**: Σ balances + outstanding cheques = Σ lent − Σ repaid
//! 2. **Identity**: `AgentId { role, index }` addresses slot `index` of the
//!    arena for `role`; agents are never removed

use crate::agents::{AgentError, AgentId, Firm, Phase, Role, Shareholder, Worker};
use crate::core::params::{ConfigError, Parameters};
use crate::models::bank::{AccountId, Bank, BankError, Banks, Cheque};
use crate::models::dataset::AgentDataset;
use crate::models::event::{Event, EventLog};
use crate::models::goods::AccountingError;
use crate::models::sector::Sectors;
use crate::rng::RngManager;

/// What an acting agent can reach besides itself
pub struct Context<'a> {
    pub period: usize,
    pub banks: &'a mut Banks,
    pub sectors: &'a Sectors,
    pub rng: &'a mut RngManager,
    pub events: &'a mut EventLog,
}

impl<'a> Context<'a> {
    pub fn new(
        period: usize,
        banks: &'a mut Banks,
        sectors: &'a Sectors,
        rng: &'a mut RngManager,
        events: &'a mut EventLog,
    ) -> Self {
        Self {
            period,
            banks,
            sectors,
            rng,
            events,
        }
    }

    /// Draw a cheque and record it
    pub fn issue_cheque(
        &mut self,
        drawer: AccountId,
        payee: AgentId,
        amount: i64,
    ) -> Result<Cheque, BankError> {
        let cheque = self.banks.issue_cheque(drawer, payee, amount, self.period)?;
        self.events.log(Event::ChequeIssued {
            period: self.period,
            serial: cheque.serial(),
            drawer: cheque.drawer_holder(),
            payee,
            amount,
        });
        Ok(cheque)
    }

    /// Deposit a cheque and record it
    pub fn deposit(&mut self, account: AccountId, cheque: Cheque) -> Result<i64, BankError> {
        let serial = cheque.serial();
        let payee = cheque.payee();
        let amount = self.banks.deposit(account, cheque)?;
        self.events.log(Event::ChequeDeposited {
            period: self.period,
            serial,
            payee,
            amount,
        });
        Ok(amount)
    }

    /// Borrow without collateral and record the loan
    pub fn borrow(
        &mut self,
        account: AccountId,
        borrower: AgentId,
        amount: i64,
        term: usize,
    ) -> Result<(), BankError> {
        self.banks.borrow(account, amount, term, false, self.period)?;
        log::debug!("{} borrows {} for {} periods", borrower, amount, term);
        self.events.log(Event::Loan {
            period: self.period,
            borrower,
            amount,
            term,
            collateralized: false,
        });
        Ok(())
    }

    /// Repay part of a debt and record it
    pub fn repay(
        &mut self,
        account: AccountId,
        borrower: AgentId,
        amount: i64,
    ) -> Result<(), BankError> {
        self.banks.repay(account, amount)?;
        self.events.log(Event::Repayment {
            period: self.period,
            borrower,
            amount,
        });
        Ok(())
    }

    pub fn balance(&self, account: AccountId) -> Result<i64, BankError> {
        self.banks.balance(account)
    }
}

/// Complete state of the economy
#[derive(Debug, Clone)]
pub struct Economy {
    firms: Vec<Firm>,
    workers: Vec<Worker>,
    shareholders: Vec<Shareholder>,
    banks: Banks,
    sectors: Sectors,
    rng: RngManager,
    events: EventLog,
}

impl Economy {
    pub fn new(seed: u64) -> Self {
        Self {
            firms: Vec::new(),
            workers: Vec::new(),
            shareholders: Vec::new(),
            banks: Banks::default(),
            sectors: Sectors::new(),
            rng: RngManager::new(seed),
            events: EventLog::new(),
        }
    }

    pub fn firms(&self) -> &[Firm] {
        &self.firms
    }

    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    pub fn shareholders(&self) -> &[Shareholder] {
        &self.shareholders
    }

    pub fn banks(&self) -> &Banks {
        &self.banks
    }

    pub fn sectors(&self) -> &Sectors {
        &self.sectors
    }

    pub fn sectors_mut(&mut self) -> &mut Sectors {
        &mut self.sectors
    }

    pub fn rng(&self) -> &RngManager {
        &self.rng
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn firm(&self, index: usize) -> Option<&Firm> {
        self.firms.get(index)
    }

    pub fn worker(&self, index: usize) -> Option<&Worker> {
        self.workers.get(index)
    }

    pub fn shareholder(&self, index: usize) -> Option<&Shareholder> {
        self.shareholders.get(index)
    }

    /// Number of agents of every role
    pub fn num_agents(&self) -> usize {
        self.firms.len() + self.workers.len() + self.shareholders.len() + self.banks.len()
    }

    /// Create a bank and register it in `sector`
    pub fn add_bank(&mut self, sector: &str, params: &Parameters) -> Result<AgentId, ConfigError> {
        let bank = Bank::from_params(self.banks.len(), params)?;
        let id = bank.id();
        self.register(sector, id)?;
        self.banks.push(bank);
        Ok(id)
    }

    /// Open an account for `holder` at a bank picked at random in `bank_sector`
    pub fn open_account(&mut self, holder: AgentId, bank_sector: &str) -> Result<AccountId, AgentError> {
        let sector = self.sectors.get_with_role(bank_sector, Role::Bank)?;
        let bank = sector
            .select(1, &mut self.rng)
            .into_iter()
            .flatten()
            .next()
            .ok_or_else(|| ConfigError::EmptySector {
                name: bank_sector.to_string(),
            })?;
        Ok(self.banks.open_account(bank.index, holder)?)
    }

    pub fn add_firm(&mut self, sector: &str, firm: Firm) -> Result<AgentId, ConfigError> {
        let id = firm.id();
        debug_assert_eq!(id.index, self.firms.len());
        self.register(sector, id)?;
        self.firms.push(firm);
        Ok(id)
    }

    pub fn add_worker(&mut self, sector: &str, worker: Worker) -> Result<AgentId, ConfigError> {
        let id = worker.id();
        debug_assert_eq!(id.index, self.workers.len());
        self.register(sector, id)?;
        self.workers.push(worker);
        Ok(id)
    }

    pub fn add_shareholder(&mut self, sector: &str, shareholder: Shareholder) -> Result<AgentId, ConfigError> {
        let id = shareholder.id();
        debug_assert_eq!(id.index, self.shareholders.len());
        self.register(sector, id)?;
        self.shareholders.push(shareholder);
        Ok(id)
    }

    /// Add `id` to `sector`, which must exist and hold agents of its role
    fn register(&mut self, sector: &str, id: AgentId) -> Result<(), ConfigError> {
        self.sectors.get_with_role(sector, id.role)?;
        self.sectors.get_mut(sector)?.push(id);
        Ok(())
    }

    /// Index the next agent of `role` will get
    pub fn next_index(&self, role: Role) -> usize {
        match role {
            Role::Firm => self.firms.len(),
            Role::Worker => self.workers.len(),
            Role::Shareholder => self.shareholders.len(),
            Role::Bank => self.banks.len(),
        }
    }

    fn unknown(agent: AgentId) -> AgentError {
        AgentError::UnknownAgent { agent }
    }

    /// Start a period for one agent
    pub fn open(&mut self, id: AgentId, period: usize) -> Result<(), AgentError> {
        let mut ctx = Context::new(
            period,
            &mut self.banks,
            &self.sectors,
            &mut self.rng,
            &mut self.events,
        );
        match id.role {
            Role::Firm => self
                .firms
                .get_mut(id.index)
                .ok_or_else(|| Self::unknown(id))?
                .open(&mut ctx),
            Role::Worker => {
                self.workers
                    .get_mut(id.index)
                    .ok_or_else(|| Self::unknown(id))?
                    .open(period);
                Ok(())
            }
            Role::Shareholder => {
                self.shareholders
                    .get_mut(id.index)
                    .ok_or_else(|| Self::unknown(id))?
                    .open(period);
                Ok(())
            }
            Role::Bank => {
                ctx.banks
                    .get_mut(id.index)
                    .ok_or_else(|| Self::unknown(id))?
                    .open(period);
                Ok(())
            }
        }
    }

    /// Run one phase action of one agent
    ///
    /// # Errors
    /// `CapabilityMisuse` when the agent's role has no action for `phase`
    pub fn act(&mut self, phase: Phase, id: AgentId, period: usize) -> Result<(), AgentError> {
        let mut ctx = Context::new(
            period,
            &mut self.banks,
            &self.sectors,
            &mut self.rng,
            &mut self.events,
        );
        match (id.role, phase) {
            (Role::Firm, Phase::PlanProduction) => self
                .firms
                .get_mut(id.index)
                .ok_or_else(|| Self::unknown(id))?
                .plan_production(&mut ctx),
            (Role::Firm, Phase::Production) => self
                .firms
                .get_mut(id.index)
                .ok_or_else(|| Self::unknown(id))?
                .production(&mut ctx),
            (Role::Firm, Phase::PayWages) => self
                .firms
                .get_mut(id.index)
                .ok_or_else(|| Self::unknown(id))?
                .pay_wages(&mut ctx, &mut self.workers),
            (Role::Firm, Phase::PayDividends) => self
                .firms
                .get_mut(id.index)
                .ok_or_else(|| Self::unknown(id))?
                .pay_dividends(&mut ctx, &mut self.shareholders),
            (Role::Worker, Phase::JobSearch) => self
                .workers
                .get_mut(id.index)
                .ok_or_else(|| Self::unknown(id))?
                .job_search(&mut ctx, &mut self.firms),
            (Role::Worker, Phase::Consumption) => self
                .workers
                .get_mut(id.index)
                .ok_or_else(|| Self::unknown(id))?
                .consumption(&mut ctx, &mut self.firms),
            (Role::Shareholder, Phase::Consumption) => self
                .shareholders
                .get_mut(id.index)
                .ok_or_else(|| Self::unknown(id))?
                .consumption(&mut ctx, &mut self.firms),
            (_, phase) => Err(AgentError::CapabilityMisuse {
                agent: id,
                capability: phase.name(),
            }),
        }
    }

    /// End the period for one agent, sealing its dataset
    pub fn close(&mut self, id: AgentId) -> Result<(), AgentError> {
        match id.role {
            Role::Firm => self
                .firms
                .get_mut(id.index)
                .ok_or_else(|| Self::unknown(id))?
                .close(&self.banks),
            Role::Worker => self
                .workers
                .get_mut(id.index)
                .ok_or_else(|| Self::unknown(id))?
                .close(&self.banks),
            Role::Shareholder => self
                .shareholders
                .get_mut(id.index)
                .ok_or_else(|| Self::unknown(id))?
                .close(&self.banks),
            Role::Bank => {
                self.banks
                    .get_mut(id.index)
                    .ok_or_else(|| Self::unknown(id))?
                    .close();
                Ok(())
            }
        }
    }

    pub fn dataset(&self, id: AgentId) -> Result<&AgentDataset, AgentError> {
        let dataset = match id.role {
            Role::Firm => self.firms.get(id.index).map(Firm::dataset),
            Role::Worker => self.workers.get(id.index).map(Worker::dataset),
            Role::Shareholder => self.shareholders.get(id.index).map(Shareholder::dataset),
            Role::Bank => self.banks.get(id.index).map(Bank::dataset),
        };
        dataset.ok_or_else(|| Self::unknown(id))
    }

    /// Balance-sheet total of a firm or a bank
    ///
    /// # Errors
    /// `CapabilityMisuse` for households, which carry no asset valuation
    pub fn asset_total_value(&self, id: AgentId) -> Result<i64, AgentError> {
        match id.role {
            Role::Firm => self
                .firms
                .get(id.index)
                .ok_or_else(|| Self::unknown(id))?
                .asset_total_value(&self.banks),
            Role::Bank => Ok(self
                .banks
                .get(id.index)
                .ok_or_else(|| Self::unknown(id))?
                .asset_total_value()),
            Role::Worker | Role::Shareholder => Err(AgentError::CapabilityMisuse {
                agent: id,
                capability: "asset valuation",
            }),
        }
    }

    /// Account of a non-bank agent
    pub fn account_of(&self, id: AgentId) -> Result<AccountId, AgentError> {
        let account = match id.role {
            Role::Firm => self.firms.get(id.index).map(Firm::account),
            Role::Worker => self.workers.get(id.index).map(Worker::account),
            Role::Shareholder => self.shareholders.get(id.index).map(Shareholder::account),
            Role::Bank => {
                return Err(AgentError::CapabilityMisuse {
                    agent: id,
                    capability: "account holding",
                })
            }
        };
        account.ok_or_else(|| Self::unknown(id))
    }

    /// Σ balances + outstanding cheques
    pub fn total_money(&self) -> i64 {
        self.banks.total_money()
    }

    pub fn total_debt(&self) -> i64 {
        self.banks.total_debt()
    }

    /// Per-bank and system-wide money conservation
    pub fn check_conservation(&self) -> Result<(), AccountingError> {
        self.banks.check_conservation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::firm::FirmConfig;
    use crate::models::sector::Sector;
    use serde_json::json;

    fn economy_with_bank() -> Economy {
        let mut economy = Economy::new(11);
        economy
            .sectors_mut()
            .push(Sector::new("Banks", Role::Bank, Parameters::empty()))
            .unwrap();
        economy.add_bank("Banks", &Parameters::empty()).unwrap();
        economy
    }

    #[test]
    fn test_agent_in_unknown_sector_is_rejected() {
        let mut economy = economy_with_bank();
        assert_eq!(
            economy.add_bank("Reserve", &Parameters::empty()),
            Err(ConfigError::UnknownSector {
                name: "Reserve".to_string()
            })
        );
        assert_eq!(economy.banks().len(), 1);
    }

    #[test]
    fn test_agent_in_sector_of_other_role_is_rejected() {
        let mut economy = economy_with_bank();
        economy
            .sectors_mut()
            .push(Sector::new("Firms", Role::Firm, Parameters::empty()))
            .unwrap();
        assert!(matches!(
            economy.add_bank("Firms", &Parameters::empty()),
            Err(ConfigError::WrongSectorRole { .. })
        ));
        assert_eq!(economy.banks().len(), 1);
        assert!(economy.sectors().get("Firms").unwrap().members().is_empty());
    }

    #[test]
    fn test_open_account_requires_bank_sector() {
        let mut economy = economy_with_bank();
        assert!(economy.open_account(AgentId::worker(0), "Banks").is_ok());
        assert!(matches!(
            economy.open_account(AgentId::worker(1), "Nowhere"),
            Err(AgentError::Config(ConfigError::UnknownSector { .. }))
        ));
    }

    #[test]
    fn test_households_have_no_asset_valuation() {
        let economy = economy_with_bank();
        assert_eq!(
            economy.asset_total_value(AgentId::worker(0)),
            Err(AgentError::CapabilityMisuse {
                agent: AgentId::worker(0),
                capability: "asset valuation",
            })
        );
    }

    #[test]
    fn test_act_rejects_phase_outside_role() {
        let mut economy = economy_with_bank();
        economy
            .sectors_mut()
            .push(Sector::new("Firms", Role::Firm, Parameters::empty()))
            .unwrap();
        let account = economy.open_account(AgentId::firm(0), "Banks").unwrap();
        let config = FirmConfig::from_params(&Parameters::new(json!({
            "financing": { "bankSector": "Banks" },
            "pricing": { "initialMarkup": 1.2, "markupFlexibility": 0.05 },
            "workforce": { "wage": 10, "jobContracts": { "min": 6, "max": 18 } },
            "inventories": { "normalVolumeRatio": 2.0 },
            "production": { "capacity": 10, "productivity": 1 },
        })))
        .unwrap();
        let id = economy.add_firm("Firms", Firm::new(0, account, config)).unwrap();

        assert_eq!(
            economy.act(Phase::Consumption, id, 1),
            Err(AgentError::CapabilityMisuse {
                agent: id,
                capability: "consumption",
            })
        );
    }
}
