use rust_decimal::Decimal;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::allocation::allocation::PaymentAllocation;
use crate::allocation::debt::DebtBucket;
use crate::allocation::strategy::{
    validate_inputs, AllocationError, AllocationStrategy, StrategyKind,
};
use crate::core::money::Money;

/// Highest-rate-first allocation.
///
/// Indebted buckets are ordered by annual rate descending, larger balance
/// breaking ties; each is filled up to its balance before the next is
/// considered. Applicable whenever any bucket has debt.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyStrategy;

impl GreedyStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl AllocationStrategy for GreedyStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Greedy
    }

    fn is_applicable(&self, buckets: &[DebtBucket], _payment: &Money) -> bool {
        buckets.iter().any(DebtBucket::has_debt)
    }

    fn allocate(
        &self,
        buckets: &[DebtBucket],
        payment: Money,
        allocation_id: Uuid,
    ) -> Result<PaymentAllocation, AllocationError> {
        validate_inputs(buckets, &payment)?;

        let mut indebted: Vec<&DebtBucket> = buckets.iter().filter(|b| b.has_debt()).collect();
        indebted.sort_by(|a, b| {
            b.annual_rate()
                .cmp(&a.annual_rate())
                .then(b.balance().amount().cmp(&a.balance().amount()))
        });

        let currency = payment.currency();
        let mut remaining = payment.amount();
        let mut amounts = BTreeMap::new();

        for bucket in indebted {
            if remaining <= Decimal::ZERO {
                break;
            }
            let share = bucket.balance().amount().min(remaining);
            if share > Decimal::ZERO {
                amounts.insert(bucket.id().clone(), Money::new(share, currency));
                remaining -= share;
            }
        }

        Ok(PaymentAllocation::new(
            allocation_id,
            payment,
            amounts,
            self.kind(),
        )?)
    }
}
