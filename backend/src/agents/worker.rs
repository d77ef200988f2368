//! Worker: job seeker, wage earner and consumer

use super::firm::Firm;
use super::{arena, AgentError, AgentId, Role};
use crate::core::params::{ConfigError, Parameters};
use crate::markets::goods::{household_consumption, ConsumptionConfig};
use crate::markets::labor::{search_job, Employment};
use crate::models::bank::{AccountId, Banks};
use crate::models::dataset::{keys, AgentDataset};
use crate::models::state::Context;

/// Worker behavior parameters, read once per sector
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerConfig {
    pub bank_sector: String,
    /// Sector searched for employers
    pub employers: String,
    pub search: usize,
    pub consumption: ConsumptionConfig,
}

impl WorkerConfig {
    pub fn from_params(params: &Parameters) -> Result<Self, ConfigError> {
        Ok(Self {
            bank_sector: params.get_str("financing.bankSector")?.to_string(),
            employers: params.get_str("laborMarket.employers")?.to_string(),
            search: params.get_usize("laborMarket.search")?,
            consumption: ConsumptionConfig::from_params(params)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Worker {
    id: AgentId,
    account: AccountId,
    config: WorkerConfig,
    employment: Option<Employment>,
    dataset: AgentDataset,
}

impl Worker {
    pub fn new(index: usize, account: AccountId, config: WorkerConfig) -> Self {
        Self {
            id: AgentId::worker(index),
            account,
            config,
            employment: None,
            dataset: AgentDataset::new(),
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn account(&self) -> AccountId {
        self.account
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Contract held as of the last job search
    pub fn employment(&self) -> Option<Employment> {
        self.employment
    }

    pub fn dataset(&self) -> &AgentDataset {
        &self.dataset
    }

    pub fn open(&mut self, period: usize) {
        self.dataset.open(period);
    }

    /// Keep a still-valid contract, otherwise look for a new one
    pub fn job_search(&mut self, ctx: &mut Context, firms: &mut [Firm]) -> Result<(), AgentError> {
        if let Some(job) = self.employment {
            if arena(firms, job.employer, Role::Firm, "employer")?.has_valid_contract(job.contract_id) {
                return Ok(());
            }
            self.employment = None;
        }

        let candidates = ctx
            .sectors
            .get_with_role(&self.config.employers, Role::Firm)?
            .select(self.config.search, ctx.rng);
        self.employment = search_job(self.id, self.account, candidates, ctx, firms)?;
        Ok(())
    }

    /// Wages are deposited by the employer on the account named in the contract
    pub fn record_wage(&mut self, amount: i64) {
        self.dataset.add(keys::WAGES, amount as f64);
    }

    pub fn consumption(&mut self, ctx: &mut Context, firms: &mut [Firm]) -> Result<(), AgentError> {
        household_consumption(
            self.id,
            self.account,
            &self.config.consumption,
            ctx,
            firms,
            &mut self.dataset,
        )?;
        Ok(())
    }

    pub fn close(&mut self, banks: &Banks) -> Result<(), AgentError> {
        let money = banks.balance(self.account)?;
        self.dataset.put(keys::COUNT, 1.0);
        self.dataset
            .put(keys::EMPLOYED, if self.employment.is_some() { 1.0 } else { 0.0 });
        self.dataset.add(keys::WAGES, 0.0);
        self.dataset.put(keys::MONEY, money as f64);
        self.dataset.close();
        Ok(())
    }
}
