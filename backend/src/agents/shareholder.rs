//! Shareholder: receives dividends and consumes

use super::firm::Firm;
use super::{AgentError, AgentId};
use crate::core::params::{ConfigError, Parameters};
use crate::markets::goods::{household_consumption, ConsumptionConfig};
use crate::models::bank::{AccountId, Banks, Cheque};
use crate::models::dataset::{keys, AgentDataset};
use crate::models::state::Context;

#[derive(Debug, Clone, PartialEq)]
pub struct ShareholderConfig {
    pub bank_sector: String,
    pub consumption: ConsumptionConfig,
}

impl ShareholderConfig {
    pub fn from_params(params: &Parameters) -> Result<Self, ConfigError> {
        Ok(Self {
            bank_sector: params.get_str("financing.bankSector")?.to_string(),
            consumption: ConsumptionConfig::from_params(params)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Shareholder {
    id: AgentId,
    account: AccountId,
    config: ShareholderConfig,
    dataset: AgentDataset,
}

impl Shareholder {
    pub fn new(index: usize, account: AccountId, config: ShareholderConfig) -> Self {
        Self {
            id: AgentId::shareholder(index),
            account,
            config,
            dataset: AgentDataset::new(),
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn account(&self) -> AccountId {
        self.account
    }

    pub fn config(&self) -> &ShareholderConfig {
        &self.config
    }

    pub fn dataset(&self) -> &AgentDataset {
        &self.dataset
    }

    pub fn open(&mut self, period: usize) {
        self.dataset.open(period);
    }

    pub fn accept_dividend_cheque(&mut self, cheque: Cheque, ctx: &mut Context) -> Result<(), AgentError> {
        let amount = ctx.deposit(self.account, cheque)?;
        self.dataset.add(keys::DIVIDENDS, amount as f64);
        Ok(())
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
        self.dataset.add(keys::DIVIDENDS, 0.0);
        self.dataset.put(keys::MONEY, money as f64);
        self.dataset.close();
        Ok(())
    }
}
