//! Market matching
//!
//! Both markets are bounded searches: a buyer or a job seeker sees only a
//! random sample of its counterpart sector, drawn with `Sector::select`.

pub mod goods;
pub mod labor;

pub use goods::{consume, household_consumption, ConsumptionConfig, ConsumptionReport};
pub use labor::{search_job, Employment};
