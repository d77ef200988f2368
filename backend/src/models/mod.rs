//! Domain models for the macroeconomic simulator

pub mod amount;
pub mod bank;
pub mod contract;
pub mod dataset;
pub mod event;
pub mod factory;
pub mod goods;
pub mod sector;
pub mod state;

// Re-exports
pub use amount::{Amount, AmountError};
pub use bank::{Account, AccountId, Bank, BankError, Banks, Cheque, Loan};
pub use contract::{JobOffer, LaborContract};
pub use dataset::AgentDataset;
pub use event::{Event, EventLog};
pub use factory::{Factory, ProductionReport};
pub use goods::{value_at, AccountingError, Goods, Inventory, Supply};
pub use sector::{Sector, Sectors};
pub use state::{Context, Economy};
