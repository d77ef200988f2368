//! Goods market: household consumption
//!
//! A household draws a random sample of suppliers, sorts it by ascending
//! price (suppliers without an offer last) and buys from the cheapest first.
//! Each purchase is one cheque for exactly `floor(price × volume)`.
//!
//! The loop stops at the first supplier that cannot be bought from: since the
//! sample is sorted, no later supplier can be cheaper.

use crate::agents::firm::Firm;
use crate::agents::{arena, arena_mut, AgentError, AgentId, Role};
use crate::core::params::{ensure, ConfigError, Parameters};
use crate::models::bank::AccountId;
use crate::models::dataset::{keys, AgentDataset};
use crate::models::event::Event;
use crate::models::goods::{value_at, AccountingError};
use crate::models::state::Context;
use std::cmp::Ordering;

/// `goodMarket` parameters of a household sector
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumptionConfig {
    /// Sector searched for suppliers
    pub suppliers: String,
    /// Sample size per period
    pub search: usize,
    pub saving_propensity: f64,
}

impl ConsumptionConfig {
    pub fn from_params(params: &Parameters) -> Result<Self, ConfigError> {
        let saving_propensity = params.get_f64("goodMarket.savingPropensity")?;
        ensure(
            (0.0..=1.0).contains(&saving_propensity),
            "goodMarket.savingPropensity",
            "must lie in [0, 1]",
        )?;
        Ok(Self {
            suppliers: params.get_str("goodMarket.suppliers")?.to_string(),
            search: params.get_usize("goodMarket.search")?,
            saving_propensity,
        })
    }
}

/// Outcome of one consumption phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumptionReport {
    pub budget: i64,
    pub volume: i64,
    pub value: i64,
    /// Suppliers actually bought from
    pub suppliers: usize,
    /// Size of the sampled set
    pub sample: usize,
}

impl ConsumptionReport {
    /// Budget left over, money that stays on the account
    pub fn unspent(&self) -> i64 {
        self.budget - self.value
    }
}

/// Money a household is willing to spend this period
///
/// # Example
/// ```
/// use macro_simulator_core_rs::markets::goods::consumption_budget;
///
/// assert_eq!(consumption_budget(100, 0.05), 95);
/// assert_eq!(consumption_budget(99, 0.5), 49);
/// ```
pub fn consumption_budget(money: i64, saving_propensity: f64) -> i64 {
    (money as f64 * (1.0 - saving_propensity)).floor() as i64
}

/// Ascending price, suppliers with nothing on offer last; ties keep sample order
fn by_price(a: &Option<f64>, b: &Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Spend at most `budget` from `account` across the supplier `sample`
///
/// # Errors
/// Any `AccountingError` (spending that disagrees with the supplier's total
/// value, a delivery of the wrong volume) is fatal.
pub fn consume(
    buyer: AgentId,
    account: AccountId,
    budget: i64,
    sample: Vec<Option<AgentId>>,
    ctx: &mut Context,
    firms: &mut [Firm],
) -> Result<ConsumptionReport, AgentError> {
    let mut report = ConsumptionReport {
        budget,
        sample: sample.len(),
        ..ConsumptionReport::default()
    };

    let mut offers = sample
        .into_iter()
        .map(|slot| {
            let price = match slot {
                Some(id) => arena(firms, id, Role::Firm, "supplier")?
                    .supply()
                    .offered_price(),
                None => None,
            };
            Ok((price, slot))
        })
        .collect::<Result<Vec<_>, AgentError>>()?;
    offers.sort_by(|a, b| by_price(&a.0, &b.0));

    let mut remaining = budget;
    for (_, slot) in offers {
        let Some(supplier) = slot else { break };
        let firm = arena_mut(firms, supplier, Role::Firm, "supplier")?;
        let Some(price) = firm.supply().offered_price() else {
            break;
        };
        if price > remaining as f64 {
            break;
        }

        let (volume, spending) = if firm.supply().total_value() <= remaining {
            let volume = firm.supply().volume();
            let spending = value_at(price, volume);
            if spending != firm.supply().total_value() {
                return Err(AccountingError::SpendingMismatch {
                    expected: firm.supply().total_value(),
                    actual: spending,
                }
                .into());
            }
            (volume, spending)
        } else {
            let volume = (remaining as f64 / price).floor() as i64;
            (volume, value_at(price, volume))
        };

        // Offers worth less than one currency unit cannot be paid by cheque
        if volume <= 0 || spending <= 0 {
            continue;
        }
        if spending > remaining {
            return Err(AccountingError::BudgetExceeded {
                budget: remaining,
                spent: spending,
            }
            .into());
        }

        let cheque = ctx.issue_cheque(account, supplier, spending)?;
        let goods = firm.sell(volume, cheque, ctx)?;
        if goods.volume() != volume {
            return Err(AccountingError::VolumeMismatch {
                requested: volume,
                delivered: goods.volume(),
            }
            .into());
        }

        log::trace!("{} buys {} from {} for {}", buyer, volume, supplier, spending);
        ctx.events.log(Event::Purchase {
            period: ctx.period,
            buyer,
            supplier,
            volume,
            value: spending,
        });

        remaining -= spending;
        report.value += spending;
        report.volume += goods.volume();
        report.suppliers += 1;
        goods.consume();

        if remaining == 0 {
            break;
        }
    }
    Ok(report)
}

/// Consumption phase shared by every household role
///
/// Budget is `floor(money × (1 − savingPropensity))`; suppliers are only
/// searched when there is something to spend.
pub fn household_consumption(
    buyer: AgentId,
    account: AccountId,
    config: &ConsumptionConfig,
    ctx: &mut Context,
    firms: &mut [Firm],
    dataset: &mut AgentDataset,
) -> Result<ConsumptionReport, AgentError> {
    let money = ctx.balance(account)?;
    let budget = consumption_budget(money, config.saving_propensity);

    let report = if budget > 0 {
        let sample = ctx
            .sectors
            .get_with_role(&config.suppliers, Role::Firm)?
            .select(config.search, ctx.rng);
        consume(buyer, account, budget, sample, ctx, firms)?
    } else {
        ConsumptionReport {
            budget,
            ..ConsumptionReport::default()
        }
    };

    dataset.put(keys::CONSUMPTION_BUDGET, report.budget as f64);
    dataset.put(keys::CONSUMPTION_VOLUME, report.volume as f64);
    dataset.put(keys::CONSUMPTION_VALUE, report.value as f64);
    dataset.put(keys::SUPPLIERS, report.suppliers as f64);
    dataset.put(keys::SUPPLIER_SAMPLE, report.sample as f64);
    dataset.put(keys::UNSPENT_BUDGET, report.unspent() as f64);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_order_puts_missing_offers_last() {
        let mut prices = vec![None, Some(20.0), Some(10.0), None, Some(15.0)];
        prices.sort_by(by_price);
        assert_eq!(prices, vec![Some(10.0), Some(15.0), Some(20.0), None, None]);
    }

    #[test]
    fn test_unspent_budget() {
        let report = ConsumptionReport {
            budget: 95,
            value: 90,
            ..ConsumptionReport::default()
        };
        assert_eq!(report.unspent(), 5);
    }

    #[test]
    fn test_config_rejects_saving_propensity_above_one() {
        let params = Parameters::new(serde_json::json!({
            "goodMarket": { "suppliers": "Firms", "search": 10, "savingPropensity": 1.5 }
        }));
        assert!(matches!(
            ConsumptionConfig::from_params(&params),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
