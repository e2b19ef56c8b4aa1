use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::allocation::allocation::PaymentAllocation;
use crate::allocation::bank_rule::BankRuleStrategy;
use crate::allocation::debt::{BucketId, DebtBucket};
use crate::allocation::greedy::GreedyStrategy;
use crate::allocation::manual::ManualStrategy;
use crate::allocation::optimal::OptimalStrategy;
use crate::core::money::{Money, MoneyError};

/// Discriminator for the four allocation policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    BankRule,
    Optimal,
    Greedy,
    Manual,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StrategyKind::BankRule => "bank_rule",
            StrategyKind::Optimal => "optimal",
            StrategyKind::Greedy => "greedy",
            StrategyKind::Manual => "manual",
        };
        write!(f, "{label}")
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bank_rule" => Ok(StrategyKind::BankRule),
            "optimal" => Ok(StrategyKind::Optimal),
            "greedy" => Ok(StrategyKind::Greedy),
            "manual" => Ok(StrategyKind::Manual),
            other => Err(format!("unknown strategy kind: {other}")),
        }
    }
}

/// Errors arising from payment allocation.
#[derive(Debug, Error)]
pub enum AllocationError {
    #[error("payment amount must not be negative, got {0}")]
    NegativePayment(Money),
    #[error("at least one debt bucket is required")]
    NoBuckets,
    #[error("manual plan places {planned}, which exceeds the payment {payment}")]
    OverAllocation { planned: Decimal, payment: Decimal },
    #[error("strategy {0} is not applicable to the given buckets and payment")]
    NotApplicable(StrategyKind),
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Contract shared by all allocation policies.
///
/// `allocate` distributes `payment` across `buckets` and is deterministic
/// for identical inputs. `is_applicable` is a discriminator for strategy
/// selection, not an error signal: a caller can probe every strategy and
/// pick among those that apply.
pub trait AllocationStrategy {
    fn kind(&self) -> StrategyKind;

    fn is_applicable(&self, buckets: &[DebtBucket], payment: &Money) -> bool;

    fn allocate(
        &self,
        buckets: &[DebtBucket],
        payment: Money,
        allocation_id: Uuid,
    ) -> Result<PaymentAllocation, AllocationError>;
}

/// Shared preconditions: buckets non-empty, payment non-negative, one
/// currency across payment and every bucket.
pub(crate) fn validate_inputs(
    buckets: &[DebtBucket],
    payment: &Money,
) -> Result<(), AllocationError> {
    if buckets.is_empty() {
        return Err(AllocationError::NoBuckets);
    }
    if payment.is_negative() {
        return Err(AllocationError::NegativePayment(*payment));
    }
    for bucket in buckets {
        if bucket.balance().currency() != payment.currency() {
            return Err(AllocationError::Money(MoneyError::CurrencyMismatch {
                left: bucket.balance().currency(),
                right: payment.currency(),
            }));
        }
    }
    Ok(())
}

/// Optional parameters consumed by the strategy factory.
#[derive(Debug, Clone, Default)]
pub struct StrategyConfig {
    /// Discretisation step for the optimal strategy; defaults to one
    /// whole monetary unit.
    pub granularity: Option<Decimal>,
    /// Pre-supplied plan for the manual strategy.
    pub manual_plan: Option<BTreeMap<BucketId, Decimal>>,
}

/// Build a strategy instance from its kind tag plus optional parameters.
pub fn strategy_for(kind: StrategyKind, config: StrategyConfig) -> Box<dyn AllocationStrategy> {
    match kind {
        StrategyKind::BankRule => Box::new(BankRuleStrategy::new()),
        StrategyKind::Optimal => match config.granularity {
            Some(granularity) => Box::new(OptimalStrategy::with_granularity(granularity)),
            None => Box::new(OptimalStrategy::default()),
        },
        StrategyKind::Greedy => Box::new(GreedyStrategy::new()),
        StrategyKind::Manual => {
            Box::new(ManualStrategy::new(config.manual_plan.unwrap_or_default()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::debt::DebtType;
    use crate::core::currency::Currency;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn bucket(currency: Currency) -> DebtBucket {
        DebtBucket::new(
            BucketId::new("B"),
            DebtType::Purchase,
            Money::new(dec!(100), currency),
            Money::new(dec!(10), currency),
            dec!(0.2),
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        )
    }

    #[test]
    fn test_validate_rejects_empty_buckets() {
        let payment = Money::new(dec!(100), Currency::Try);
        assert!(matches!(
            validate_inputs(&[], &payment),
            Err(AllocationError::NoBuckets)
        ));
    }

    #[test]
    fn test_validate_rejects_negative_payment() {
        let payment = Money::new(dec!(-1), Currency::Try);
        assert!(matches!(
            validate_inputs(&[bucket(Currency::Try)], &payment),
            Err(AllocationError::NegativePayment(_))
        ));
    }

    #[test]
    fn test_validate_rejects_mixed_currencies() {
        let payment = Money::new(dec!(100), Currency::Try);
        assert!(matches!(
            validate_inputs(&[bucket(Currency::Usd)], &payment),
            Err(AllocationError::Money(MoneyError::CurrencyMismatch { .. }))
        ));
    }

    #[test]
    fn test_factory_dispatches_every_kind() {
        for kind in [
            StrategyKind::BankRule,
            StrategyKind::Optimal,
            StrategyKind::Greedy,
            StrategyKind::Manual,
        ] {
            assert_eq!(strategy_for(kind, StrategyConfig::default()).kind(), kind);
        }
    }
}
