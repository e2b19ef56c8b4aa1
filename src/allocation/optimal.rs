use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::allocation::allocation::PaymentAllocation;
use crate::allocation::debt::DebtBucket;
use crate::allocation::strategy::{
    validate_inputs, AllocationError, AllocationStrategy, StrategyKind,
};
use crate::core::money::Money;

/// Smallest payment, in granularity units, the optimiser accepts.
pub const MIN_APPLICABLE_UNITS: u64 = 10;

/// Dynamic-programming allocation minimising projected interest.
///
/// The payment is discretised into integer units of `granularity`
/// (default: one whole monetary unit). For buckets `i..` and `r` units
/// still unallocated, the table stores the minimum achievable one-month
/// interest, where allocating `a` units to bucket `i` costs
/// `(balance_i - a * granularity) * rate_i / 12` plus the optimum for the
/// remaining buckets and `r - a` units. Back-pointers reconstruct the
/// winning per-bucket amounts.
///
/// Among all allocations at the same discretisation, the result's
/// projected one-month interest is minimal.
///
/// Applicable only when at least two buckets carry debt and the payment
/// exceeds [`MIN_APPLICABLE_UNITS`] units; smaller problems are better
/// served by the greedy strategy.
#[derive(Debug, Clone)]
pub struct OptimalStrategy {
    granularity: Decimal,
}

impl OptimalStrategy {
    /// Use a custom discretisation step.
    ///
    /// # Panics
    ///
    /// Panics when `granularity` is not positive.
    pub fn with_granularity(granularity: Decimal) -> Self {
        assert!(
            granularity > Decimal::ZERO,
            "granularity must be positive, got {granularity}"
        );
        Self { granularity }
    }

    pub fn granularity(&self) -> Decimal {
        self.granularity
    }

    fn units(&self, amount: Decimal) -> u64 {
        (amount / self.granularity).floor().to_u64().unwrap_or(0)
    }
}

impl Default for OptimalStrategy {
    fn default() -> Self {
        Self {
            granularity: Decimal::ONE,
        }
    }
}

impl AllocationStrategy for OptimalStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Optimal
    }

    fn is_applicable(&self, buckets: &[DebtBucket], payment: &Money) -> bool {
        let indebted = buckets.iter().filter(|b| b.has_debt()).count();
        indebted >= 2 && self.units(payment.amount()) > MIN_APPLICABLE_UNITS
    }

    fn allocate(
        &self,
        buckets: &[DebtBucket],
        payment: Money,
        allocation_id: Uuid,
    ) -> Result<PaymentAllocation, AllocationError> {
        validate_inputs(buckets, &payment)?;
        if !self.is_applicable(buckets, &payment) {
            return Err(AllocationError::NotApplicable(self.kind()));
        }

        let indebted: Vec<&DebtBucket> = buckets.iter().filter(|b| b.has_debt()).collect();
        let total_units = self.units(payment.amount()) as usize;
        let bucket_count = indebted.len();

        // cost[i][r]: minimum projected interest over buckets i.. with r
        // units unallocated; choice[i][r]: units given to bucket i there
        let mut cost = vec![vec![Decimal::ZERO; total_units + 1]; bucket_count + 1];
        let mut choice = vec![vec![0usize; total_units + 1]; bucket_count + 1];

        for i in (0..bucket_count).rev() {
            let bucket = indebted[i];
            let capacity = self.units(bucket.balance().amount()) as usize;
            for r in 0..=total_units {
                let mut best_cost = Decimal::MAX;
                let mut best_units = 0;
                for a in 0..=capacity.min(r) {
                    let paid = Decimal::from(a as u64) * self.granularity;
                    let candidate =
                        bucket.projected_monthly_interest(paid) + cost[i + 1][r - a];
                    if candidate < best_cost {
                        best_cost = candidate;
                        best_units = a;
                    }
                }
                cost[i][r] = best_cost;
                choice[i][r] = best_units;
            }
        }

        let currency = payment.currency();
        let mut amounts = BTreeMap::new();
        let mut remaining = total_units;
        for (i, bucket) in indebted.iter().enumerate() {
            let units = choice[i][remaining];
            if units > 0 {
                let amount = Decimal::from(units as u64) * self.granularity;
                amounts.insert(bucket.id().clone(), Money::new(amount, currency));
            }
            remaining -= units;
        }

        Ok(PaymentAllocation::new(
            allocation_id,
            payment,
            amounts,
            self.kind(),
        )?)
    }
}
