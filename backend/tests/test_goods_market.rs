//! Goods market tests
//!
//! Households buy from the cheapest sampled supplier first, one cheque per
//! purchase, never spending more than their budget.

mod common;

use common::{firm_config, Fixture};
use macro_simulator_core_rs::markets::goods::consume;
use macro_simulator_core_rs::{AgentId, ConsumptionReport, Context, Event};
use proptest::prelude::*;
use std::ops::Range;

/// Hire `workers` at firm `firm` and run its production phase
fn stock(fx: &mut Fixture, firm: usize, workers: Range<usize>) {
    let mut ctx = Context::new(1, &mut fx.banks, &fx.sectors, &mut fx.rng, &mut fx.events);
    let supplier = &mut fx.firms[firm];
    supplier.adjust_workforce(workers.len(), &mut ctx);
    for worker in &fx.workers[workers] {
        supplier
            .hire(worker.id(), worker.account(), &mut ctx)
            .unwrap();
    }
    supplier.production(&mut ctx).unwrap();
}

/// Firm 0 offers 5 units at 10, firm 1 offers 10 units at 20
fn two_suppliers() -> Fixture {
    let mut fx = Fixture::new(vec![firm_config(10, 1.0), firm_config(20, 1.0)], 15, 0);
    stock(&mut fx, 0, 0..5);
    stock(&mut fx, 1, 5..15);
    fx
}

#[test]
fn test_supplies_priced_at_markup_over_unit_cost() {
    let fx = two_suppliers();

    let a = fx.firms[0].supply();
    assert_eq!(a.price(), Some(10.0));
    assert_eq!(a.volume(), 5);
    assert_eq!(a.total_value(), 50);

    let b = fx.firms[1].supply();
    assert_eq!(b.price(), Some(20.0));
    assert_eq!(b.volume(), 10);
    assert_eq!(b.total_value(), 200);
}

#[test]
fn test_cheapest_first_then_partial_purchase() {
    let mut fx = two_suppliers();
    let buyer = AgentId::shareholder(0);
    let account = fx.open_account(buyer);
    fx.fund(account, 95);

    let mut ctx = Context::new(1, &mut fx.banks, &fx.sectors, &mut fx.rng, &mut fx.events);
    let sample = vec![Some(AgentId::firm(1)), None, Some(AgentId::firm(0))];
    let report = consume(buyer, account, 95, sample, &mut ctx, &mut fx.firms).unwrap();

    assert_eq!(
        report,
        ConsumptionReport {
            budget: 95,
            volume: 7,
            value: 90,
            suppliers: 2,
            sample: 3,
        }
    );
    assert_eq!(report.unspent(), 5);

    assert_eq!(fx.banks.balance(account).unwrap(), 5);
    assert_eq!(fx.banks.balance(fx.firms[0].account()).unwrap(), 50);
    assert_eq!(fx.banks.balance(fx.firms[1].account()).unwrap(), 40);

    // Firm 0 sold out, firm 1 sold 2 of 10
    assert!(fx.firms[0].supply().is_empty());
    assert_eq!(fx.firms[0].factory().inventory().volume(), 0);
    assert_eq!(fx.firms[1].supply().volume(), 8);
    assert_eq!(fx.firms[1].supply().sales_value(), 40);
    assert_eq!(fx.firms[1].factory().inventory().volume(), 8);
    assert_eq!(fx.firms[1].factory().inventory().value(), 160);

    let purchases = fx.events.events_of_type("Purchase");
    assert_eq!(purchases.len(), 2);
    assert!(matches!(
        purchases[0],
        Event::Purchase { supplier, volume: 5, value: 50, .. } if *supplier == AgentId::firm(0)
    ));

    fx.banks.check_conservation().unwrap();
}

#[test]
fn test_stops_at_first_unaffordable_supplier() {
    let mut fx = two_suppliers();
    let buyer = AgentId::shareholder(0);
    let account = fx.open_account(buyer);
    fx.fund(account, 9);

    let mut ctx = Context::new(1, &mut fx.banks, &fx.sectors, &mut fx.rng, &mut fx.events);
    let sample = vec![Some(AgentId::firm(0)), Some(AgentId::firm(1))];
    let report = consume(buyer, account, 9, sample, &mut ctx, &mut fx.firms).unwrap();

    assert_eq!(report.value, 0);
    assert_eq!(report.suppliers, 0);
    assert_eq!(report.unspent(), 9);
    assert_eq!(fx.banks.balance(account).unwrap(), 9);
}

#[test]
fn test_suppliers_without_offer_are_skipped() {
    let mut fx = Fixture::new(vec![firm_config(10, 1.0), firm_config(20, 1.0)], 5, 0);
    stock(&mut fx, 1, 0..5);
    let buyer = AgentId::shareholder(0);
    let account = fx.open_account(buyer);
    fx.fund(account, 100);

    // Firm 0 never produced: it sorts after firm 1 and ends the search
    let mut ctx = Context::new(1, &mut fx.banks, &fx.sectors, &mut fx.rng, &mut fx.events);
    let sample = vec![Some(AgentId::firm(0)), Some(AgentId::firm(1))];
    let report = consume(buyer, account, 100, sample, &mut ctx, &mut fx.firms).unwrap();

    assert_eq!(report.volume, 5);
    assert_eq!(report.value, 100);
    assert_eq!(report.suppliers, 1);
}

#[test]
fn test_household_consumption_records_budget_and_sample() {
    let mut fx = two_suppliers();
    let account = fx.workers[0].account();
    fx.fund(account, 100);

    fx.workers[0].open(1);
    {
        let mut ctx = Context::new(1, &mut fx.banks, &fx.sectors, &mut fx.rng, &mut fx.events);
        fx.workers[0].consumption(&mut ctx, &mut fx.firms).unwrap();
    }
    fx.workers[0].close(&fx.banks).unwrap();

    // Budget floor(100 × 0.8) = 80: 5 units at 10, then 1 unit at 20
    let data = fx.workers[0].dataset();
    assert_eq!(data.get_data("consumptionBudget", 1), Some(80.0));
    assert_eq!(data.get_data("consumptionVolume", 1), Some(6.0));
    assert_eq!(data.get_data("consumptionValue", 1), Some(70.0));
    assert_eq!(data.get_data("unspentBudget", 1), Some(10.0));
    assert_eq!(data.get_data("suppliers", 1), Some(2.0));
    // search = 3 over a sector of 2: one empty slot
    assert_eq!(data.get_data("supplierSample", 1), Some(3.0));
    assert_eq!(data.get_data("money", 1), Some(30.0));
}

#[test]
fn test_zero_budget_skips_supplier_search() {
    let mut fx = two_suppliers();
    let state = fx.rng.get_state();

    fx.workers[0].open(1);
    {
        let mut ctx = Context::new(1, &mut fx.banks, &fx.sectors, &mut fx.rng, &mut fx.events);
        fx.workers[0].consumption(&mut ctx, &mut fx.firms).unwrap();
    }
    fx.workers[0].close(&fx.banks).unwrap();

    assert_eq!(fx.rng.get_state(), state);
    let data = fx.workers[0].dataset();
    assert_eq!(data.get_data("consumptionBudget", 1), Some(0.0));
    assert_eq!(data.get_data("supplierSample", 1), Some(0.0));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Spending never exceeds the budget and every unit bought was sold
    #[test]
    fn prop_budget_bound_and_books_match(
        budget in 0i64..1000,
        wage_a in 1i64..40,
        wage_b in 1i64..40,
        hires_a in 1usize..10,
        hires_b in 1usize..10,
        markup in 1.0f64..2.0,
    ) {
        let mut fx = Fixture::new(
            vec![firm_config(wage_a, markup), firm_config(wage_b, markup)],
            20,
            0,
        );
        stock(&mut fx, 0, 0..hires_a);
        stock(&mut fx, 1, 10..10 + hires_b);

        let buyer = AgentId::shareholder(0);
        let account = fx.open_account(buyer);
        if budget > 0 {
            fx.fund(account, budget);
        }

        let report = {
            let mut ctx = Context::new(1, &mut fx.banks, &fx.sectors, &mut fx.rng, &mut fx.events);
            let sample = vec![Some(AgentId::firm(0)), Some(AgentId::firm(1))];
            consume(buyer, account, budget, sample, &mut ctx, &mut fx.firms).unwrap()
        };

        prop_assert!(report.value <= budget);
        prop_assert!(report.unspent() >= 0);
        prop_assert_eq!(fx.banks.balance(account).unwrap(), budget - report.value);

        let sold_value: i64 = fx.firms.iter().map(|f| f.supply().sales_value()).sum();
        let sold_volume: i64 = fx.firms.iter().map(|f| f.supply().sales_volume()).sum();
        prop_assert_eq!(sold_value, report.value);
        prop_assert_eq!(sold_volume, report.volume);

        for firm in &fx.firms {
            prop_assert_eq!(firm.supply().volume(), firm.factory().inventory().volume());
        }
        prop_assert!(fx.banks.check_conservation().is_ok());
    }
}
