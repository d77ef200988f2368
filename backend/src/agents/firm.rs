//! Firm: employer and supplier
//!
//! Per period, in schedule order:
//! 1. `open`: owners are assigned on first open, markup moves with inventories
//! 2. `plan_production`: purge expired contracts, hire or lay off toward a target
//! 3. `production`: run the factory, reprice the supply with hysteresis
//! 4. `pay_wages`: borrow any shortfall, then one cheque per contract
//! 5. `pay_dividends`: distribute excess capital evenly among owners
//! 6. `close`: contracts age by one period, balance sheet recorded
//!
//! Workers hire themselves through [`Firm::hire`] during their job search,
//! households buy through [`Firm::sell`] during consumption.

use super::{arena_mut, AgentError, AgentId, Role, Shareholder, Worker};
use crate::core::params::{ensure, ConfigError, Parameters};
use crate::models::bank::{AccountId, Banks, Cheque};
use crate::models::contract::{JobOffer, LaborContract};
use crate::models::dataset::{keys, AgentDataset};
use crate::models::event::Event;
use crate::models::factory::Factory;
use crate::models::goods::{Goods, Supply};
use crate::models::state::Context;

/// How the desired workforce is picked at each planning phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorkforceTarget {
    /// Uniform draw in `[0, capacity)`
    Random,
    /// Fixed share of capacity
    Fraction(f64),
}

/// Firm behavior parameters, read once per sector
#[derive(Debug, Clone, PartialEq)]
pub struct FirmConfig {
    pub bank_sector: String,
    pub initial_markup: f64,
    pub markup_flexibility: f64,
    pub min_markup: f64,
    /// Relative price change below which the old price is kept
    pub price_threshold: f64,
    pub wage: i64,
    pub contract_min: usize,
    pub contract_max: usize,
    pub workforce_target: WorkforceTarget,
    pub normal_volume_ratio: f64,
    pub capacity: usize,
    pub productivity: f64,
    pub capital_ratio: f64,
    pub loan_term: usize,
    pub ownership_sector: String,
    pub ownership_search: usize,
}

impl FirmConfig {
    /// # Example
    /// ```
    /// use macro_simulator_core_rs::{FirmConfig, Parameters, WorkforceTarget};
    /// use serde_json::json;
    ///
    /// let config = FirmConfig::from_params(&Parameters::new(json!({
    ///     "financing": { "bankSector": "Banks" },
    ///     "pricing": { "initialMarkup": 1.2, "markupFlexibility": 0.05 },
    ///     "workforce": { "wage": 10, "jobContracts": { "min": 6, "max": 18 } },
    ///     "inventories": { "normalVolumeRatio": 2.0 },
    ///     "production": { "capacity": 100, "productivity": 1 },
    /// })))
    /// .unwrap();
    ///
    /// assert_eq!(config.workforce_target, WorkforceTarget::Random);
    /// assert_eq!(config.ownership_sector, "Shareholders");
    /// assert_eq!(config.price_threshold, 0.05);
    /// ```
    pub fn from_params(params: &Parameters) -> Result<Self, ConfigError> {
        let contracts = params.get("workforce.jobContracts")?;
        let contract_min = contracts.get_usize("min")?;
        let contract_max = contracts.get_usize("max")?;
        ensure(
            contract_min >= 1 && contract_max > contract_min,
            "workforce.jobContracts",
            "need 1 <= min < max",
        )?;

        let wage = params.get_i64("workforce.wage")?;
        ensure(wage > 0, "workforce.wage", "must be positive")?;

        let initial_markup = params.get_f64("pricing.initialMarkup")?;
        ensure(initial_markup > 0.0, "pricing.initialMarkup", "must be positive")?;
        let markup_flexibility = params.get_f64("pricing.markupFlexibility")?;
        ensure(
            markup_flexibility >= 0.0,
            "pricing.markupFlexibility",
            "must be non-negative",
        )?;
        let min_markup = params.get_f64_or("pricing.minMarkup", 0.1)?;
        ensure(min_markup > 0.0, "pricing.minMarkup", "must be positive")?;
        let price_threshold = params.get_f64_or("pricing.priceThreshold", 0.05)?;
        ensure(
            price_threshold >= 0.0,
            "pricing.priceThreshold",
            "must be non-negative",
        )?;

        let workforce_target = match params.get_str_or("workforce.target", "random") {
            Ok("random") => WorkforceTarget::Random,
            Ok(_) => {
                return Err(ConfigError::InvalidValue {
                    path: "workforce.target".to_string(),
                    reason: "expected \"random\" or a fraction of capacity".to_string(),
                })
            }
            Err(ConfigError::InvalidType { .. }) => {
                let fraction = params.get_f64("workforce.target")?;
                ensure(
                    (0.0..=1.0).contains(&fraction),
                    "workforce.target",
                    "fraction must lie in [0, 1]",
                )?;
                WorkforceTarget::Fraction(fraction)
            }
            Err(e) => return Err(e),
        };

        let factory = Factory::from_params(&params.get("production")?)?;

        let capital_ratio = params.get_f64_or("dividends.capitalRatio", 0.5)?;
        ensure(
            (0.0..=1.0).contains(&capital_ratio),
            "dividends.capitalRatio",
            "must lie in [0, 1]",
        )?;
        let loan_term = params.get_usize_or("financing.loanTerm", 12)?;
        ensure(loan_term >= 1, "financing.loanTerm", "must be positive")?;
        let ownership_search = params.get_usize_or("ownership.search", 10)?;
        ensure(ownership_search >= 1, "ownership.search", "must be positive")?;

        Ok(Self {
            bank_sector: params.get_str("financing.bankSector")?.to_string(),
            initial_markup,
            markup_flexibility,
            min_markup,
            price_threshold,
            wage,
            contract_min,
            contract_max,
            workforce_target,
            normal_volume_ratio: params.get_f64("inventories.normalVolumeRatio")?,
            capacity: factory.capacity(),
            productivity: factory.productivity(),
            capital_ratio,
            loan_term,
            ownership_sector: params
                .get_str_or("ownership.sector", "Shareholders")?
                .to_string(),
            ownership_search,
        })
    }
}

/// A firm: hires workers, produces, sells, pays wages and dividends
#[derive(Debug, Clone)]
pub struct Firm {
    id: AgentId,
    account: AccountId,
    config: FirmConfig,
    factory: Factory,

    /// Contracts in hiring order; the newest is laid off first
    payroll: Vec<LaborContract>,
    job_offer: JobOffer,
    supply: Supply,
    markup: f64,
    inventories_normal_volume: f64,

    /// Permanent owners, chosen on first open
    owners: Vec<AgentId>,
    next_contract_id: u64,
    dataset: AgentDataset,
}

impl Firm {
    pub fn new(index: usize, account: AccountId, config: FirmConfig) -> Self {
        let id = AgentId::firm(index);
        let factory = Factory::new(config.capacity, config.productivity);
        Self {
            id,
            account,
            inventories_normal_volume: factory.max_output() * config.normal_volume_ratio,
            factory,
            payroll: Vec::new(),
            job_offer: JobOffer::new(id, config.wage),
            supply: Supply::new(id),
            markup: config.initial_markup,
            owners: Vec::new(),
            next_contract_id: 0,
            dataset: AgentDataset::new(),
            config,
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn account(&self) -> AccountId {
        self.account
    }

    pub fn config(&self) -> &FirmConfig {
        &self.config
    }

    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    pub fn payroll(&self) -> &[LaborContract] {
        &self.payroll
    }

    pub fn job_offer(&self) -> &JobOffer {
        &self.job_offer
    }

    pub fn supply(&self) -> &Supply {
        &self.supply
    }

    pub fn markup(&self) -> f64 {
        self.markup
    }

    pub fn inventories_normal_volume(&self) -> f64 {
        self.inventories_normal_volume
    }

    pub fn owners(&self) -> &[AgentId] {
        &self.owners
    }

    pub fn dataset(&self) -> &AgentDataset {
        &self.dataset
    }

    /// Wage on offer, if any vacancy is open
    pub fn offered_wage(&self) -> Option<i64> {
        if self.job_offer.is_empty() {
            None
        } else {
            Some(self.job_offer.wage())
        }
    }

    pub fn has_valid_contract(&self, contract_id: u64) -> bool {
        self.payroll
            .iter()
            .any(|contract| contract.id() == contract_id && contract.is_valid())
    }

    pub fn open(&mut self, ctx: &mut Context) -> Result<(), AgentError> {
        if self.owners.is_empty() {
            self.init_owners(ctx)?;
        }
        self.job_offer.reset();
        self.dataset.open(ctx.period);
        self.supply.reset();
        self.update_markup(ctx);
        Ok(())
    }

    fn init_owners(&mut self, ctx: &mut Context) -> Result<(), AgentError> {
        let sector = ctx
            .sectors
            .get_with_role(&self.config.ownership_sector, Role::Shareholder)?;
        self.owners = sector
            .select(self.config.ownership_search, ctx.rng)
            .into_iter()
            .flatten()
            .collect();

        if self.owners.is_empty() {
            log::warn!("{} found no owners in {}", self.id, sector.name());
            return Ok(());
        }
        log::debug!("{} owned by {} shareholders", self.id, self.owners.len());
        ctx.events.log(Event::OwnersAssigned {
            period: ctx.period,
            firm: self.id,
            owners: self.owners.len(),
        });
        Ok(())
    }

    /// Random step, downward when inventories exceed their normal volume
    fn update_markup(&mut self, ctx: &mut Context) {
        let mut delta = ctx.rng.uniform(0.0, self.config.markup_flexibility);
        if self.factory.inventory().volume() as f64 > self.inventories_normal_volume {
            delta = -delta;
        }
        self.markup = (self.markup + delta).max(self.config.min_markup);
        self.dataset.put(keys::DELTA_MARKUP, delta);
    }

    pub fn plan_production(&mut self, ctx: &mut Context) -> Result<(), AgentError> {
        self.payroll.retain(LaborContract::is_valid);

        let capacity = self.factory.capacity() as f64;
        let target = match self.config.workforce_target {
            WorkforceTarget::Random => ctx.rng.uniform(0.0, capacity) as usize,
            WorkforceTarget::Fraction(share) => (share * capacity).floor() as usize,
        };
        self.adjust_workforce(target, ctx);
        Ok(())
    }

    /// Lay off the newest contracts down to `target`, or open vacancies up to it
    ///
    /// Returns the number of layoffs.
    pub fn adjust_workforce(&mut self, target: usize, ctx: &mut Context) -> usize {
        let mut layoffs = 0;
        if self.payroll.len() > target {
            let laid_off = self.payroll.split_off(target);
            for mut contract in laid_off.into_iter().rev() {
                contract.breach();
                log::debug!("{} lays off {}", self.id, contract.worker());
                ctx.events.log(Event::Layoff {
                    period: ctx.period,
                    employer: self.id,
                    worker: contract.worker(),
                    contract_id: contract.id(),
                });
                layoffs += 1;
            }
        } else if self.payroll.len() < target {
            self.job_offer
                .post(self.config.wage, target - self.payroll.len());
        }

        self.dataset.put(keys::WORKFORCE_TARGET, target as f64);
        self.dataset.put(keys::LAYOFFS, layoffs as f64);
        self.dataset
            .put(keys::JOB_OFFERS, self.job_offer.vacancies() as f64);
        layoffs
    }

    /// Accept an applicant: fills a vacancy and returns the new contract id
    ///
    /// The term is drawn uniformly in `[min, max)`.
    pub fn hire(
        &mut self,
        worker: AgentId,
        worker_account: AccountId,
        ctx: &mut Context,
    ) -> Result<u64, AgentError> {
        self.job_offer.accept()?;
        let term = ctx.rng.range(
            self.config.contract_min as i64,
            self.config.contract_max as i64,
        ) as usize;

        self.next_contract_id += 1;
        let contract = LaborContract::new(
            self.next_contract_id,
            self.id,
            worker,
            worker_account,
            self.job_offer.wage(),
            term,
            ctx.period,
        );
        ctx.events.log(Event::Hire {
            period: ctx.period,
            employer: self.id,
            worker,
            contract_id: contract.id(),
            wage: contract.wage(),
            term,
        });
        self.payroll.push(contract);
        Ok(self.next_contract_id)
    }

    pub fn production(&mut self, ctx: &mut Context) -> Result<(), AgentError> {
        let report = self.factory.production(&self.payroll);
        ctx.events.log(Event::Production {
            period: ctx.period,
            firm: self.id,
            volume: report.volume,
            value: report.value,
        });
        self.dataset.put(keys::PRODUCTION, report.volume as f64);
        self.dataset.put(keys::PRODUCTION_VALUE, report.value as f64);

        let inventory = self.factory.inventory();
        if inventory.volume() > 0 {
            let candidate = inventory
                .unit_cost()
                .map(|cost| self.markup * cost)
                .filter(|price| *price > 0.0 && price.is_finite());
            let price = match (candidate, self.supply.price()) {
                (Some(new), Some(old)) if (new / old - 1.0).abs() <= self.config.price_threshold => {
                    Some(old)
                }
                (Some(new), _) => Some(new),
                (None, old) => old,
            };

            if let Some(price) = price {
                self.supply.update(inventory.volume(), price);
                self.dataset.put(keys::PRICE, price);
            }
            self.dataset
                .put(keys::SUPPLY_VOLUME, self.supply.volume() as f64);
            self.dataset
                .put(keys::SUPPLY_VALUE, self.supply.total_value() as f64);
            self.dataset.put(keys::SUPPLY_COST, inventory.value() as f64);
        }
        Ok(())
    }

    pub fn pay_wages(&mut self, ctx: &mut Context, workers: &mut [Worker]) -> Result<(), AgentError> {
        let wage_bill: i64 = self
            .payroll
            .iter()
            .filter(|contract| contract.is_valid())
            .map(LaborContract::wage)
            .sum();

        let balance = ctx.balance(self.account)?;
        if wage_bill > balance {
            let shortfall = wage_bill - balance;
            if shortfall > balance {
                log::warn!(
                    "{} borrows {} to pay wages with only {} in cash",
                    self.id,
                    shortfall,
                    balance
                );
            }
            ctx.borrow(self.account, self.id, shortfall, self.config.loan_term)?;
            self.dataset.add(keys::BORROWING, shortfall as f64);
        }

        for contract in self.payroll.iter().filter(|contract| contract.is_valid()) {
            let cheque = ctx.issue_cheque(self.account, contract.worker(), contract.wage())?;
            let paid = ctx.deposit(contract.worker_account(), cheque)?;
            arena_mut(workers, contract.worker(), Role::Worker, "wage receipt")?.record_wage(paid);
        }
        self.dataset.put(keys::WAGE_BILL, wage_bill as f64);
        Ok(())
    }

    /// Pay out capital above `capitalRatio × assets`, evenly across owners
    ///
    /// # Errors
    /// `NoOwners` if the firm has no owners when dividends are due
    pub fn pay_dividends(
        &mut self,
        ctx: &mut Context,
        shareholders: &mut [Shareholder],
    ) -> Result<(), AgentError> {
        if self.owners.is_empty() {
            return Err(AgentError::NoOwners { agent: self.id });
        }

        let cash = ctx.balance(self.account)?;
        let assets = cash + self.factory.value();
        let liabilities = ctx.banks.debt(self.account)?;
        let capital = assets - liabilities;
        let capital_target = (assets as f64 * self.config.capital_ratio).floor() as i64;
        let excess = (capital - capital_target).max(0);
        let owners = self.owners.len() as i64;

        let mut paid = 0;
        if excess > owners {
            let dividend = cash.min(excess) / owners;
            if dividend > 0 {
                for &owner in &self.owners {
                    let cheque = ctx.issue_cheque(self.account, owner, dividend)?;
                    arena_mut(shareholders, owner, Role::Shareholder, "dividend receipt")?
                        .accept_dividend_cheque(cheque, ctx)?;
                    ctx.events.log(Event::Dividend {
                        period: ctx.period,
                        firm: self.id,
                        shareholder: owner,
                        amount: dividend,
                    });
                    paid += dividend;
                }
            }
        }
        self.dataset.put(keys::DIVIDENDS, paid as f64);
        Ok(())
    }

    /// Deliver `volume` units against `cheque`
    ///
    /// The cheque must pay exactly the supply price for `volume`; it is
    /// deposited on the firm's account.
    pub fn sell(&mut self, volume: i64, cheque: Cheque, ctx: &mut Context) -> Result<Goods, AgentError> {
        self.supply.purchase(volume, cheque.amount())?;
        let goods = self.factory.take(volume)?;
        ctx.deposit(self.account, cheque)?;
        Ok(goods)
    }

    pub fn close(&mut self, banks: &Banks) -> Result<(), AgentError> {
        let money = banks.balance(self.account)?;
        let debt = banks.debt(self.account)?;
        let inventory = self.factory.inventory();
        let tangible = inventory.value();

        self.dataset.put(keys::COUNT, 1.0);
        self.dataset.put(keys::WORKFORCE, self.payroll.len() as f64);
        self.dataset
            .put(keys::SALES_VOLUME, self.supply.sales_volume() as f64);
        self.dataset
            .put(keys::SALES_VALUE, self.supply.sales_value() as f64);
        self.dataset
            .put(keys::INVENTORIES_VOLUME, inventory.volume() as f64);
        self.dataset
            .put(keys::INVENTORIES_NORMAL_VOLUME, self.inventories_normal_volume);
        self.dataset.put(keys::INVENTORIES_VALUE, tangible as f64);
        self.dataset.put(keys::MONEY, money as f64);
        self.dataset.put(keys::ASSETS, (money + tangible) as f64);
        self.dataset.put(keys::TANGIBLE_ASSETS, tangible as f64);
        self.dataset.put(keys::LIABILITIES, debt as f64);
        self.dataset.put(keys::MARKUP, self.markup);
        self.dataset.close();

        for contract in self.payroll.iter_mut() {
            contract.tick();
        }
        Ok(())
    }

    /// Cash plus inventory value
    pub fn asset_total_value(&self, banks: &Banks) -> Result<i64, AgentError> {
        Ok(banks.balance(self.account)? + self.factory.value())
    }

    /// Bankruptcy hook: assets cover liabilities
    pub fn is_solvent(&self, banks: &Banks) -> Result<bool, AgentError> {
        Ok(self.asset_total_value(banks)? >= banks.debt(self.account)?)
    }
}
