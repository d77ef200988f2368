//! Labor market: job search
//!
//! A job seeker samples employers, ranks them by offered wage (highest
//! first, employers without vacancies last) and applies to the best one.
//! The employer creates the contract; the worker keeps only its id.

use crate::agents::firm::Firm;
use crate::agents::{arena, arena_mut, AgentError, AgentId, Role};
use crate::models::bank::AccountId;
use crate::models::state::Context;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A worker's non-owning reference to its contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employment {
    pub employer: AgentId,
    pub contract_id: u64,
}

fn by_wage(a: &Option<i64>, b: &Option<i64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Apply to the best-paying employer of `candidates` that has a vacancy
///
/// Returns `None` when no sampled employer is hiring.
pub fn search_job(
    worker: AgentId,
    account: AccountId,
    candidates: Vec<Option<AgentId>>,
    ctx: &mut Context,
    firms: &mut [Firm],
) -> Result<Option<Employment>, AgentError> {
    let mut offers = candidates
        .into_iter()
        .map(|slot| {
            let wage = match slot {
                Some(id) => arena(firms, id, Role::Firm, "employer")?.offered_wage(),
                None => None,
            };
            Ok((wage, slot))
        })
        .collect::<Result<Vec<_>, AgentError>>()?;
    offers.sort_by(|a, b| by_wage(&a.0, &b.0));

    let Some((Some(_), Some(employer))) = offers.into_iter().next() else {
        return Ok(None);
    };
    let contract_id = arena_mut(firms, employer, Role::Firm, "employer")?.hire(worker, account, ctx)?;
    Ok(Some(Employment {
        employer,
        contract_id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wage_order_highest_first() {
        let mut wages = vec![Some(10), None, Some(12), Some(8)];
        wages.sort_by(by_wage);
        assert_eq!(wages, vec![Some(12), Some(10), Some(8), None]);
    }
}
