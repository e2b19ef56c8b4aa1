use cardops_engine::allocation::debt::{BucketId, DebtBucket, DebtType};
use cardops_engine::allocation::strategy::{
    strategy_for, AllocationError, AllocationStrategy, StrategyConfig, StrategyKind,
};
use cardops_engine::arbitrage::detector::{ArbitrageDetector, DetectError};
use cardops_engine::balance::bucket::{BalanceBucket, BucketAmounts};
use cardops_engine::balance::change::BalanceChange;
use cardops_engine::balance::sweep::SweepBalanceCalculator;
use cardops_engine::core::currency::{Currency, CurrencyPair};
use cardops_engine::core::dates::DateRange;
use cardops_engine::core::money::Money;
use cardops_engine::graph::rate_graph::CurrencyGraph;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn lira(amount: Decimal) -> Money {
    Money::new(amount, Currency::Try)
}

fn graph_of(rates: &[(Currency, Currency, Decimal)]) -> CurrencyGraph {
    let mut graph = CurrencyGraph::new();
    for &(from, to, rate) in rates {
        graph.add_pair(CurrencyPair::observed_now(from, to, rate).unwrap());
    }
    graph
}

/// A spanning set of mutually consistent quotes; every cycle through it
/// multiplies out to exactly 1, so it adds connectivity without adding
/// arbitrage.
fn consistent_backbone() -> Vec<(Currency, Currency, Decimal)> {
    vec![
        (Currency::Try, Currency::Usd, dec!(0.025)),
        (Currency::Usd, Currency::Eur, dec!(0.8)),
        (Currency::Usd, Currency::Gbp, dec!(0.625)),
        (Currency::Usd, Currency::Jpy, dec!(160)),
    ]
}

/// Scenario 1: a mispriced triangle yields exactly one opportunity at the
/// decimal-exact profit.
#[test]
fn triangular_arbitrage_detected() {
    let mut rates = consistent_backbone();
    // overwrite the consistent USD leg with the mispriced triangle
    rates.retain(|(_, to, _)| *to != Currency::Eur && *to != Currency::Gbp);
    rates.extend([
        (Currency::Usd, Currency::Eur, dec!(0.9)),
        (Currency::Eur, Currency::Gbp, dec!(0.9)),
        (Currency::Gbp, Currency::Usd, dec!(1.3)),
    ]);
    let graph = graph_of(&rates);

    let detector = ArbitrageDetector::with_defaults();
    let opportunities = detector.detect(&graph).unwrap();

    assert_eq!(opportunities.len(), 1);
    let best = &opportunities[0];
    assert_eq!(best.cycle_len(), 3);
    assert_eq!(best.total_rate(), dec!(1.053));
    assert_eq!(best.profit_percent(), dec!(5.3));

    // the cycle visits exactly USD, EUR and GBP, up to rotation
    let mut cycle: Vec<Currency> = best.cycle().to_vec();
    cycle.sort();
    assert_eq!(cycle, vec![Currency::Usd, Currency::Eur, Currency::Gbp]);
}

/// Scenario 2: a consistent market (including the near-inverse USD/EUR
/// pair) yields no opportunities.
#[test]
fn consistent_market_yields_nothing() {
    let mut rates = consistent_backbone();
    rates.push((Currency::Usd, Currency::Eur, dec!(0.8)));
    rates.push((Currency::Eur, Currency::Usd, dec!(1.25)));
    let graph = graph_of(&rates);

    let detector = ArbitrageDetector::with_defaults();
    assert!(detector.detect(&graph).unwrap().is_empty());
}

/// Scenario 3: a graph touching only two currencies is rejected.
#[test]
fn disconnected_graph_is_rejected() {
    let graph = graph_of(&[(Currency::Usd, Currency::Eur, dec!(0.9))]);
    let detector = ArbitrageDetector::with_defaults();

    assert_eq!(
        detector.detect(&graph).unwrap_err(),
        DetectError::DisconnectedGraph
    );
}

/// Scenario 4: sweep-line daily balances and the six-digit average.
#[test]
fn sweep_line_daily_and_average_balances() {
    let mut initial = BucketAmounts::new();
    initial.set(BalanceBucket::Purchase, dec!(1000));

    let mut calculator = SweepBalanceCalculator::with_initial(initial);
    calculator.add_change(
        &BalanceChange::new(date(2026, 1, 5), dec!(500)),
        BalanceBucket::Purchase,
    );
    calculator.add_change(
        &BalanceChange::new(date(2026, 1, 10), dec!(-200)),
        BalanceBucket::Purchase,
    );

    let window = DateRange::new(date(2026, 1, 1), date(2026, 1, 12)).unwrap();
    let snapshots = calculator.daily_balances(&window);

    assert_eq!(snapshots.len(), 12);
    for snapshot in &snapshots {
        // every snapshot covers all four buckets
        assert_eq!(snapshot.amounts().iter().count(), BalanceBucket::COUNT);
    }
    let purchase: Vec<Decimal> = snapshots
        .iter()
        .map(|s| s.balance(BalanceBucket::Purchase))
        .collect();
    assert!(purchase[..4].iter().all(|&b| b == dec!(1000)));
    assert!(purchase[4..9].iter().all(|&b| b == dec!(1500)));
    assert!(purchase[9..].iter().all(|&b| b == dec!(1300)));

    // (4 * 1000 + 5 * 1500 + 3 * 1300) / 12, half-up at six digits
    let averages = calculator.average_balances(&window);
    assert_eq!(averages.get(BalanceBucket::Purchase), dec!(1283.333333));
}

/// Scenario 5: bank-rule waterfall over a three-bucket statement.
#[test]
fn bank_rule_waterfall_scenario() {
    let buckets = vec![
        DebtBucket::new(
            BucketId::new("OVD"),
            DebtType::Overdue,
            lira(dec!(200)),
            lira(dec!(200)),
            dec!(0.48),
            date(2026, 2, 1),
        ),
        DebtBucket::new(
            BucketId::new("PUR"),
            DebtType::Purchase,
            lira(dec!(1000)),
            lira(dec!(50)),
            dec!(0.24),
            date(2026, 2, 15),
        ),
        DebtBucket::new(
            BucketId::new("ADV"),
            DebtType::CashAdvance,
            lira(dec!(500)),
            lira(dec!(50)),
            dec!(0.36),
            date(2026, 2, 15),
        ),
    ];

    let strategy = strategy_for(StrategyKind::BankRule, StrategyConfig::default());
    let allocation = strategy
        .allocate(&buckets, lira(dec!(400)), Uuid::new_v4())
        .unwrap();

    assert_eq!(
        allocation.amount_for(&BucketId::new("OVD")).unwrap().amount(),
        dec!(200)
    );
    assert_eq!(
        allocation.amount_for(&BucketId::new("ADV")).unwrap().amount(),
        dec!(200)
    );
    assert_eq!(allocation.amount_for(&BucketId::new("PUR")), None);
    assert!(allocation.is_full());
}

/// Scenario 6: greedy chases the 30% bucket before the 20% one.
#[test]
fn greedy_rate_ordering_scenario() {
    let buckets = vec![
        DebtBucket::new(
            BucketId::new("PUR"),
            DebtType::Purchase,
            lira(dec!(500)),
            lira(Decimal::ZERO),
            dec!(0.20),
            date(2026, 2, 15),
        ),
        DebtBucket::new(
            BucketId::new("ADV"),
            DebtType::CashAdvance,
            lira(dec!(400)),
            lira(Decimal::ZERO),
            dec!(0.30),
            date(2026, 2, 15),
        ),
    ];

    let strategy = strategy_for(StrategyKind::Greedy, StrategyConfig::default());
    let allocation = strategy
        .allocate(&buckets, lira(dec!(600)), Uuid::new_v4())
        .unwrap();

    assert_eq!(
        allocation.amount_for(&BucketId::new("ADV")).unwrap().amount(),
        dec!(400)
    );
    assert_eq!(
        allocation.amount_for(&BucketId::new("PUR")).unwrap().amount(),
        dec!(200)
    );
}

/// A manual plan whose sum equals the payment is echoed exactly.
#[test]
fn manual_plan_echoed_exactly() {
    let buckets = vec![
        DebtBucket::new(
            BucketId::new("A"),
            DebtType::Purchase,
            lira(dec!(600)),
            lira(Decimal::ZERO),
            dec!(0.2),
            date(2026, 2, 15),
        ),
        DebtBucket::new(
            BucketId::new("B"),
            DebtType::CashAdvance,
            lira(dec!(400)),
            lira(Decimal::ZERO),
            dec!(0.3),
            date(2026, 2, 15),
        ),
    ];

    let mut plan = BTreeMap::new();
    plan.insert(BucketId::new("A"), dec!(350));
    plan.insert(BucketId::new("B"), dec!(150));

    let strategy = strategy_for(
        StrategyKind::Manual,
        StrategyConfig {
            manual_plan: Some(plan),
            ..Default::default()
        },
    );
    let allocation = strategy
        .allocate(&buckets, lira(dec!(500)), Uuid::new_v4())
        .unwrap();

    assert!(allocation.is_full());
    assert_eq!(
        allocation.amount_for(&BucketId::new("A")).unwrap().amount(),
        dec!(350)
    );
    assert_eq!(
        allocation.amount_for(&BucketId::new("B")).unwrap().amount(),
        dec!(150)
    );
}

/// The DP optimiser never projects more interest than the other policies.
#[test]
fn optimal_dominates_other_policies() {
    let buckets = vec![
        DebtBucket::new(
            BucketId::new("OVD"),
            DebtType::Overdue,
            lira(dec!(150)),
            lira(dec!(150)),
            dec!(0.10),
            date(2026, 2, 1),
        ),
        DebtBucket::new(
            BucketId::new("ADV"),
            DebtType::CashAdvance,
            lira(dec!(300)),
            lira(dec!(30)),
            dec!(0.45),
            date(2026, 2, 15),
        ),
        DebtBucket::new(
            BucketId::new("PUR"),
            DebtType::Purchase,
            lira(dec!(700)),
            lira(dec!(35)),
            dec!(0.25),
            date(2026, 2, 15),
        ),
    ];
    let payment = lira(dec!(400));

    let projected = |allocation: &cardops_engine::allocation::allocation::PaymentAllocation| {
        buckets
            .iter()
            .map(|b| {
                let paid = allocation
                    .amount_for(b.id())
                    .map(|m| m.amount())
                    .unwrap_or(Decimal::ZERO);
                b.projected_monthly_interest(paid)
            })
            .sum::<Decimal>()
    };

    let optimal = strategy_for(StrategyKind::Optimal, StrategyConfig::default())
        .allocate(&buckets, payment, Uuid::new_v4())
        .unwrap();
    for kind in [StrategyKind::BankRule, StrategyKind::Greedy] {
        let other = strategy_for(kind, StrategyConfig::default())
            .allocate(&buckets, payment, Uuid::new_v4())
            .unwrap();
        assert!(
            projected(&optimal) <= projected(&other),
            "optimal projected {} but {kind} projected {}",
            projected(&optimal),
            projected(&other)
        );
    }
}

/// Error surface: the documented failure kinds come back as errors.
#[test]
fn allocation_error_surface() {
    let buckets = vec![DebtBucket::new(
        BucketId::new("A"),
        DebtType::Purchase,
        lira(dec!(100)),
        lira(Decimal::ZERO),
        dec!(0.2),
        date(2026, 2, 15),
    )];
    let strategy = strategy_for(StrategyKind::BankRule, StrategyConfig::default());

    assert!(matches!(
        strategy.allocate(&buckets, lira(dec!(-5)), Uuid::new_v4()),
        Err(AllocationError::NegativePayment(_))
    ));
    assert!(matches!(
        strategy.allocate(&[], lira(dec!(100)), Uuid::new_v4()),
        Err(AllocationError::NoBuckets)
    ));

    let mut plan = BTreeMap::new();
    plan.insert(BucketId::new("A"), dec!(90));
    let manual = strategy_for(
        StrategyKind::Manual,
        StrategyConfig {
            manual_plan: Some(plan),
            ..Default::default()
        },
    );
    assert!(matches!(
        manual.allocate(&buckets, lira(dec!(50)), Uuid::new_v4()),
        Err(AllocationError::OverAllocation { .. })
    ));
}

/// Opportunities, snapshots and allocations survive a JSON round trip.
#[test]
fn result_records_serialize() {
    let mut rates = consistent_backbone();
    rates.push((Currency::Eur, Currency::Gbp, dec!(0.9)));
    let graph = graph_of(&rates);
    let opportunities = ArbitrageDetector::with_defaults().detect(&graph).unwrap();
    assert!(!opportunities.is_empty());
    let json = serde_json::to_string(&opportunities[0]).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(parsed.get("cycle").is_some());
    assert!(parsed.get("profit_percent").is_some());

    let calculator = SweepBalanceCalculator::new();
    let snapshot = calculator.balance_at(date(2026, 1, 1));
    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(json.contains("2026-01-01"));

    let buckets = vec![DebtBucket::new(
        BucketId::new("A"),
        DebtType::Purchase,
        lira(dec!(100)),
        lira(Decimal::ZERO),
        dec!(0.2),
        date(2026, 2, 15),
    )];
    let allocation = strategy_for(StrategyKind::Greedy, StrategyConfig::default())
        .allocate(&buckets, lira(dec!(40)), Uuid::new_v4())
        .unwrap();
    let json = serde_json::to_string_pretty(&allocation).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(parsed.get("total_payment").is_some());
    assert!(parsed.get("amounts").is_some());
}

/// Boundary: zero payment allocates nothing under every applicable policy.
#[test]
fn zero_payment_allocates_nothing() {
    let buckets = vec![DebtBucket::new(
        BucketId::new("A"),
        DebtType::Purchase,
        lira(dec!(100)),
        lira(dec!(10)),
        dec!(0.2),
        date(2026, 2, 15),
    )];

    for kind in [StrategyKind::BankRule, StrategyKind::Greedy] {
        let allocation = strategy_for(kind, StrategyConfig::default())
            .allocate(&buckets, lira(Decimal::ZERO), Uuid::new_v4())
            .unwrap();
        assert!(allocation.is_empty(), "{kind} allocated on a zero payment");
    }
}
