use rust_decimal::Decimal;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::allocation::allocation::PaymentAllocation;
use crate::allocation::debt::{BucketId, DebtBucket};
use crate::allocation::strategy::{
    validate_inputs, AllocationError, AllocationStrategy, StrategyKind,
};
use crate::core::money::Money;

/// Caller-specified allocation.
///
/// The pre-supplied plan maps bucket ids to amounts. Entries that target
/// an unknown bucket or carry a non-positive amount are dropped; the
/// retained plan must not exceed the payment, and each amount is capped at
/// its bucket's balance. Applicable iff the plan is non-empty.
#[derive(Debug, Clone, Default)]
pub struct ManualStrategy {
    plan: BTreeMap<BucketId, Decimal>,
}

impl ManualStrategy {
    pub fn new(plan: BTreeMap<BucketId, Decimal>) -> Self {
        Self { plan }
    }

    pub fn plan(&self) -> &BTreeMap<BucketId, Decimal> {
        &self.plan
    }
}

impl AllocationStrategy for ManualStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Manual
    }

    fn is_applicable(&self, _buckets: &[DebtBucket], _payment: &Money) -> bool {
        !self.plan.is_empty()
    }

    fn allocate(
        &self,
        buckets: &[DebtBucket],
        payment: Money,
        allocation_id: Uuid,
    ) -> Result<PaymentAllocation, AllocationError> {
        validate_inputs(buckets, &payment)?;
        if self.plan.is_empty() {
            return Err(AllocationError::NotApplicable(self.kind()));
        }

        let retained: Vec<(&BucketId, &DebtBucket, Decimal)> = self
            .plan
            .iter()
            .filter(|(_, &amount)| amount > Decimal::ZERO)
            .filter_map(|(id, &amount)| {
                buckets
                    .iter()
                    .find(|bucket| bucket.id() == id)
                    .map(|bucket| (id, bucket, amount))
            })
            .collect();

        let planned: Decimal = retained.iter().map(|(_, _, amount)| *amount).sum();
        if planned > payment.amount() {
            return Err(AllocationError::OverAllocation {
                planned,
                payment: payment.amount(),
            });
        }

        let currency = payment.currency();
        let mut amounts = BTreeMap::new();
        for (id, bucket, amount) in retained {
            let capped = amount.min(bucket.balance().amount());
            if capped > Decimal::ZERO {
                amounts.insert(id.clone(), Money::new(capped, currency));
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
