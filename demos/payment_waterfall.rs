//! Payment allocation walkthrough.
//!
//! Runs the same statement portfolio through the bank-rule waterfall, the
//! greedy rate-chaser and the DP interest minimiser, and compares the
//! projected one-month interest of each outcome.

use cardops_engine::allocation::debt::{BucketId, DebtBucket, DebtType};
use cardops_engine::allocation::strategy::{
    strategy_for, AllocationStrategy, StrategyConfig, StrategyKind,
};
use cardops_engine::core::currency::Currency;
use cardops_engine::core::money::Money;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn main() {
    println!("╔══════════════════════════════════════════════╗");
    println!("║  cardops-engine: Payment Allocation Demo     ║");
    println!("╚══════════════════════════════════════════════╝\n");

    let due = |day| NaiveDate::from_ymd_opt(2026, 2, day).expect("valid date");
    let lira = |amount| Money::new(amount, Currency::Try);

    let buckets = vec![
        DebtBucket::new(
            BucketId::new("2026-01/OVERDUE"),
            DebtType::Overdue,
            lira(dec!(200)),
            lira(dec!(200)),
            dec!(0.48),
            due(1),
        ),
        DebtBucket::new(
            BucketId::new("2026-01/CASH_ADVANCE"),
            DebtType::CashAdvance,
            lira(dec!(500)),
            lira(dec!(50)),
            dec!(0.36),
            due(15),
        ),
        DebtBucket::new(
            BucketId::new("2026-01/PURCHASE"),
            DebtType::Purchase,
            lira(dec!(1000)),
            lira(dec!(50)),
            dec!(0.24),
            due(15),
        ),
    ];

    let payment = lira(dec!(400));
    println!("Portfolio:");
    for bucket in &buckets {
        println!("  {bucket}");
    }
    println!("\nPayment: {payment}\n");

    for kind in [StrategyKind::BankRule, StrategyKind::Greedy, StrategyKind::Optimal] {
        let strategy = strategy_for(kind, StrategyConfig::default());
        if !strategy.is_applicable(&buckets, &payment) {
            println!("--- {kind}: not applicable ---\n");
            continue;
        }
        match strategy.allocate(&buckets, payment, Uuid::new_v4()) {
            Ok(allocation) => {
                let interest: Decimal = buckets
                    .iter()
                    .map(|b| {
                        let paid = allocation
                            .amount_for(b.id())
                            .map(|m| m.amount())
                            .unwrap_or(Decimal::ZERO);
                        b.projected_monthly_interest(paid)
                    })
                    .sum();
                println!("{allocation}");
                println!("Projected one-month interest: {}\n", interest.round_dp(2));
            }
            Err(e) => println!("--- {kind} failed: {e} ---\n"),
        }
    }
}
