use rust_decimal::Decimal;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::allocation::allocation::PaymentAllocation;
use crate::allocation::debt::DebtBucket;
use crate::allocation::strategy::{
    validate_inputs, AllocationError, AllocationStrategy, StrategyKind,
};
use crate::core::money::Money;

/// Regulatory waterfall allocation.
///
/// Buckets are served in fixed type priority (overdue, then fees and
/// interest, then cash advances, purchases and finally installments),
/// earlier due dates first within a type. Each bucket first receives its
/// minimum payment, then any surplus up to its balance, while payment
/// remains.
///
/// Always applicable.
///
/// # Examples
///
/// ```
/// use cardops_engine::allocation::bank_rule::BankRuleStrategy;
/// use cardops_engine::allocation::debt::{BucketId, DebtBucket, DebtType};
/// use cardops_engine::allocation::strategy::AllocationStrategy;
/// use cardops_engine::core::currency::Currency;
/// use cardops_engine::core::money::Money;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
/// use uuid::Uuid;
///
/// let due = NaiveDate::from_ymd_opt(2026, 2, 15).unwrap();
/// let money = |amount| Money::new(amount, Currency::Try);
/// let buckets = vec![
///     DebtBucket::new(BucketId::new("OVD"), DebtType::Overdue, money(dec!(200)), money(dec!(200)), dec!(0.4), due),
///     DebtBucket::new(BucketId::new("PUR"), DebtType::Purchase, money(dec!(1000)), money(dec!(50)), dec!(0.2), due),
/// ];
///
/// let allocation = BankRuleStrategy::new()
///     .allocate(&buckets, money(dec!(300)), Uuid::new_v4())
///     .unwrap();
/// assert_eq!(allocation.amount_for(&BucketId::new("OVD")).unwrap().amount(), dec!(200));
/// assert_eq!(allocation.amount_for(&BucketId::new("PUR")).unwrap().amount(), dec!(100));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BankRuleStrategy;

impl BankRuleStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl AllocationStrategy for BankRuleStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::BankRule
    }

    fn is_applicable(&self, _buckets: &[DebtBucket], _payment: &Money) -> bool {
        true
    }

    fn allocate(
        &self,
        buckets: &[DebtBucket],
        payment: Money,
        allocation_id: Uuid,
    ) -> Result<PaymentAllocation, AllocationError> {
        validate_inputs(buckets, &payment)?;

        let mut ordered: Vec<&DebtBucket> = buckets.iter().collect();
        ordered.sort_by(|a, b| {
            a.debt_type()
                .cmp(&b.debt_type())
                .then(a.due_date().cmp(&b.due_date()))
        });

        let currency = payment.currency();
        let mut remaining = payment.amount();
        let mut amounts = BTreeMap::new();

        for bucket in ordered {
            if remaining <= Decimal::ZERO {
                break;
            }
            if !bucket.has_debt() {
                continue;
            }

            let balance = bucket.balance().amount();
            let minimum = bucket.minimum_payment().amount().min(balance);

            let minimum_share = minimum.min(remaining);
            let surplus_capacity = balance - minimum;
            let surplus_share = surplus_capacity.min(remaining - minimum_share);
            let share = minimum_share + surplus_share;

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::debt::{BucketId, DebtType};
    use crate::core::currency::Currency;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn money(amount: Decimal) -> Money {
        Money::new(amount, Currency::Try)
    }

    fn due(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, day).unwrap()
    }

    fn bucket(
        id: &str,
        debt_type: DebtType,
        balance: Decimal,
        minimum: Decimal,
        day: u32,
    ) -> DebtBucket {
        DebtBucket::new(
            BucketId::new(id),
            debt_type,
            money(balance),
            money(minimum),
            dec!(0.3),
            due(day),
        )
    }

    #[test]
    fn test_priority_waterfall() {
        let buckets = vec![
            bucket("PUR", DebtType::Purchase, dec!(1000), dec!(50), 10),
            bucket("OVD", DebtType::Overdue, dec!(200), dec!(200), 10),
            bucket("ADV", DebtType::CashAdvance, dec!(500), dec!(50), 10),
        ];
        let allocation = BankRuleStrategy::new()
            .allocate(&buckets, money(dec!(400)), Uuid::new_v4())
            .unwrap();

        assert_eq!(
            allocation.amount_for(&BucketId::new("OVD")).unwrap().amount(),
            dec!(200)
        );
        // minimum 50 plus 150 surplus
        assert_eq!(
            allocation.amount_for(&BucketId::new("ADV")).unwrap().amount(),
            dec!(200)
        );
        assert_eq!(allocation.amount_for(&BucketId::new("PUR")), None);
        assert!(allocation.is_full());
    }

    #[test]
    fn test_due_date_breaks_type_ties() {
        let buckets = vec![
            bucket("LATE", DebtType::Purchase, dec!(100), dec!(100), 20),
            bucket("EARLY", DebtType::Purchase, dec!(100), dec!(100), 5),
        ];
        let allocation = BankRuleStrategy::new()
            .allocate(&buckets, money(dec!(100)), Uuid::new_v4())
            .unwrap();

        assert_eq!(
            allocation.amount_for(&BucketId::new("EARLY")).unwrap().amount(),
            dec!(100)
        );
        assert_eq!(allocation.amount_for(&BucketId::new("LATE")), None);
    }

    #[test]
    fn test_payment_covering_everything_pays_everything() {
        let buckets = vec![
            bucket("OVD", DebtType::Overdue, dec!(120), dec!(120), 10),
            bucket("PUR", DebtType::Purchase, dec!(480), dec!(20), 10),
        ];
        let allocation = BankRuleStrategy::new()
            .allocate(&buckets, money(dec!(1000)), Uuid::new_v4())
            .unwrap();

        assert_eq!(allocation.allocated_total().amount(), dec!(600));
        assert_eq!(allocation.unallocated(), dec!(400));
    }

    #[test]
    fn test_zero_payment_allocates_nothing() {
        let buckets = vec![bucket("PUR", DebtType::Purchase, dec!(480), dec!(20), 10)];
        let allocation = BankRuleStrategy::new()
            .allocate(&buckets, money(Decimal::ZERO), Uuid::new_v4())
            .unwrap();
        assert!(allocation.is_empty());
    }

    #[test]
    fn test_minimum_never_exceeds_balance() {
        // minimum due larger than what is left on the bucket
        let buckets = vec![bucket("OVD", DebtType::Overdue, dec!(80), dec!(120), 10)];
        let allocation = BankRuleStrategy::new()
            .allocate(&buckets, money(dec!(500)), Uuid::new_v4())
            .unwrap();
        assert_eq!(
            allocation.amount_for(&BucketId::new("OVD")).unwrap().amount(),
            dec!(80)
        );
    }

    #[test]
    fn test_skips_empty_buckets() {
        let buckets = vec![
            bucket("ZERO", DebtType::Overdue, dec!(0), dec!(0), 10),
            bucket("PUR", DebtType::Purchase, dec!(300), dec!(30), 10),
        ];
        let allocation = BankRuleStrategy::new()
            .allocate(&buckets, money(dec!(100)), Uuid::new_v4())
            .unwrap();
        assert_eq!(allocation.bucket_count(), 1);
        assert_eq!(
            allocation.amount_for(&BucketId::new("PUR")).unwrap().amount(),
            dec!(100)
        );
    }
}
