//! Shared fixtures for integration tests
#![allow(dead_code)]

use macro_simulator_core_rs::{
    AccountId, AgentId, Bank, Banks, ConsumptionConfig, EventLog, Firm, FirmConfig, Parameters,
    Role, RngManager, Sector, Sectors, Shareholder, ShareholderConfig, SimulationConfig, Worker,
    WorkerConfig,
};
use serde_json::{json, Value};

pub fn firm_params(wage: i64, markup: f64) -> Value {
    json!({
        "financing": { "bankSector": "Banks" },
        "pricing": { "initialMarkup": markup, "markupFlexibility": 0.05 },
        "workforce": { "wage": wage, "jobContracts": { "min": 4, "max": 8 } },
        "inventories": { "normalVolumeRatio": 2.0 },
        "production": { "capacity": 100, "productivity": 1 }
    })
}

pub fn firm_config(wage: i64, markup: f64) -> FirmConfig {
    FirmConfig::from_params(&Parameters::new(firm_params(wage, markup))).unwrap()
}

pub fn consumption_config(search: usize, saving_propensity: f64) -> ConsumptionConfig {
    ConsumptionConfig {
        suppliers: "Firms".to_string(),
        search,
        saving_propensity,
    }
}

pub fn worker_config() -> WorkerConfig {
    WorkerConfig {
        bank_sector: "Banks".to_string(),
        employers: "Firms".to_string(),
        search: 3,
        consumption: consumption_config(3, 0.2),
    }
}

/// Banks, sectors and agents without a scheduler
///
/// One bank; firms, workers and shareholders each get an account there and
/// are members of the sectors `Firms`, `Workers` and `Shareholders`.
pub struct Fixture {
    pub banks: Banks,
    pub sectors: Sectors,
    pub rng: RngManager,
    pub events: EventLog,
    pub firms: Vec<Firm>,
    pub workers: Vec<Worker>,
    pub shareholders: Vec<Shareholder>,
}

impl Fixture {
    pub fn new(firms: Vec<FirmConfig>, workers: usize, shareholders: usize) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut banks = Banks::new(vec![Bank::new(0, true)]);
        let mut sectors = Sectors::new();
        for (name, role) in [
            ("Banks", Role::Bank),
            ("Firms", Role::Firm),
            ("Workers", Role::Worker),
            ("Shareholders", Role::Shareholder),
        ] {
            sectors
                .push(Sector::new(name, role, Parameters::empty()))
                .unwrap();
        }
        sectors.get_mut("Banks").unwrap().push(AgentId::bank(0));

        let firms: Vec<Firm> = firms
            .into_iter()
            .enumerate()
            .map(|(i, config)| {
                let id = AgentId::firm(i);
                sectors.get_mut("Firms").unwrap().push(id);
                Firm::new(i, banks.open_account(0, id).unwrap(), config)
            })
            .collect();
        let workers = (0..workers)
            .map(|i| {
                let id = AgentId::worker(i);
                sectors.get_mut("Workers").unwrap().push(id);
                Worker::new(i, banks.open_account(0, id).unwrap(), worker_config())
            })
            .collect();
        let shareholders = (0..shareholders)
            .map(|i| {
                let id = AgentId::shareholder(i);
                sectors.get_mut("Shareholders").unwrap().push(id);
                let config = ShareholderConfig {
                    bank_sector: "Banks".to_string(),
                    consumption: consumption_config(3, 0.1),
                };
                Shareholder::new(i, banks.open_account(0, id).unwrap(), config)
            })
            .collect();

        Self {
            banks,
            sectors,
            rng: RngManager::new(12345),
            events: EventLog::new(),
            firms,
            workers,
            shareholders,
        }
    }

    pub fn open_account(&mut self, holder: AgentId) -> AccountId {
        self.banks.open_account(0, holder).unwrap()
    }

    /// Lend `amount` to `account` so it has money to spend
    pub fn fund(&mut self, account: AccountId, amount: i64) {
        self.banks.borrow(account, amount, 12, false, 0).unwrap();
    }
}

/// A small but complete economy
pub fn scenario_json(seed: u64, periods: usize) -> Value {
    json!({
        "seed": seed,
        "periods": periods,
        "sectors": [
            { "name": "Banks", "role": "bank", "agents": 1 },
            { "name": "Shareholders", "role": "shareholder", "agents": 5, "parameters": {
                "financing": { "bankSector": "Banks" },
                "goodMarket": { "suppliers": "Firms", "search": 3, "savingPropensity": 0.1 } } },
            { "name": "Firms", "role": "firm", "agents": 3, "parameters": {
                "financing": { "bankSector": "Banks" },
                "pricing": { "initialMarkup": 1.2, "markupFlexibility": 0.05 },
                "workforce": { "wage": 10, "jobContracts": { "min": 4, "max": 8 } },
                "inventories": { "normalVolumeRatio": 2.0 },
                "production": { "capacity": 10, "productivity": 1.5 } } },
            { "name": "Workers", "role": "worker", "agents": 20, "parameters": {
                "financing": { "bankSector": "Banks" },
                "laborMarket": { "employers": "Firms", "search": 2 },
                "goodMarket": { "suppliers": "Firms", "search": 2, "savingPropensity": 0.2 } } }
        ],
        "phases": [
            { "name": "planProduction", "sectors": ["Firms"] },
            { "name": "jobSearch", "sectors": ["Workers"] },
            { "name": "production", "sectors": ["Firms"] },
            { "name": "payWages", "sectors": ["Firms"] },
            { "name": "consumption", "sectors": ["Workers", "Shareholders"] },
            { "name": "payDividends", "sectors": ["Firms"] }
        ]
    })
}

pub fn scenario(seed: u64, periods: usize) -> SimulationConfig {
    let _ = env_logger::builder().is_test(true).try_init();
    serde_json::from_value(scenario_json(seed, periods)).unwrap()
}
