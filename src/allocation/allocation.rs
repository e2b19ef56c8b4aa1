use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::allocation::debt::BucketId;
use crate::allocation::strategy::StrategyKind;
use crate::core::money::{Money, MoneyError};

/// The immutable outcome of one allocation run.
///
/// Maps bucket ids to strictly positive amounts; the allocated total never
/// exceeds the payment. Bucket ids are unique by construction of the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentAllocation {
    id: Uuid,
    total_payment: Money,
    amounts: BTreeMap<BucketId, Money>,
    allocated_total: Money,
    strategy: StrategyKind,
}

impl PaymentAllocation {
    /// Build the record, totalling the per-bucket amounts. Fails when the
    /// amounts do not share the payment's currency or the total overflows.
    pub fn new(
        id: Uuid,
        total_payment: Money,
        amounts: BTreeMap<BucketId, Money>,
        strategy: StrategyKind,
    ) -> Result<Self, MoneyError> {
        let mut allocated_total = Money::zero(total_payment.currency());
        for amount in amounts.values() {
            allocated_total = allocated_total.checked_add(amount)?;
        }
        Ok(Self {
            id,
            total_payment,
            amounts,
            allocated_total,
            strategy,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn total_payment(&self) -> Money {
        self.total_payment
    }

    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    pub fn amounts(&self) -> &BTreeMap<BucketId, Money> {
        &self.amounts
    }

    pub fn amount_for(&self, bucket: &BucketId) -> Option<Money> {
        self.amounts.get(bucket).copied()
    }

    pub fn bucket_count(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    /// Sum of every allocated amount.
    pub fn allocated_total(&self) -> Money {
        self.allocated_total
    }

    /// Payment remainder the strategy could not place.
    pub fn unallocated(&self) -> Decimal {
        self.total_payment.amount() - self.allocated_total.amount()
    }

    /// True when the whole payment was placed.
    pub fn is_full(&self) -> bool {
        self.unallocated().is_zero()
    }
}

impl fmt::Display for PaymentAllocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Payment Allocation ({}) ===", self.strategy)?;
        writeln!(f, "Payment:     {}", self.total_payment)?;
        writeln!(f, "Allocated:   {}", self.allocated_total)?;
        writeln!(f, "Unallocated: {}", self.unallocated())?;
        for (bucket, amount) in &self.amounts {
            writeln!(f, "  {bucket}: {amount}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::Currency;
    use rust_decimal_macros::dec;

    fn money(amount: Decimal) -> Money {
        Money::new(amount, Currency::Try)
    }

    #[test]
    fn test_totals() {
        let mut amounts = BTreeMap::new();
        amounts.insert(BucketId::new("A"), money(dec!(200)));
        amounts.insert(BucketId::new("B"), money(dec!(150)));
        let allocation = PaymentAllocation::new(
            Uuid::new_v4(),
            money(dec!(400)),
            amounts,
            StrategyKind::BankRule,
        )
        .unwrap();

        assert_eq!(allocation.allocated_total(), money(dec!(350)));
        assert_eq!(allocation.unallocated(), dec!(50));
        assert!(!allocation.is_full());
        assert_eq!(allocation.amount_for(&BucketId::new("A")), Some(money(dec!(200))));
        assert_eq!(allocation.amount_for(&BucketId::new("C")), None);
    }

    #[test]
    fn test_currency_mismatch_rejected() {
        let mut amounts = BTreeMap::new();
        amounts.insert(BucketId::new("A"), Money::new(dec!(10), Currency::Usd));
        let result = PaymentAllocation::new(
            Uuid::new_v4(),
            money(dec!(100)),
            amounts,
            StrategyKind::Manual,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_allocation_is_valid() {
        let allocation = PaymentAllocation::new(
            Uuid::new_v4(),
            money(Decimal::ZERO),
            BTreeMap::new(),
            StrategyKind::Greedy,
        )
        .unwrap();
        assert!(allocation.is_empty());
        assert!(allocation.is_full());
    }
}
