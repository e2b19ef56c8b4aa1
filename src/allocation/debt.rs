use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::money::Money;

/// Unique identifier for a debt bucket.
///
/// Callers control the naming scheme; statement systems typically use the
/// statement period plus a bucket discriminator (e.g. `"2026-01/PURCHASE"`).
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BucketId(String);

impl BucketId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BucketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BucketId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Debt category, declared in regulatory payment priority: overdue debt
/// must be served before fees, fees before cash advances, and so on. The
/// derived ordering is that priority.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DebtType {
    Overdue,
    FeesInterest,
    CashAdvance,
    Purchase,
    Installment,
}

impl DebtType {
    pub const ALL: [DebtType; 5] = [
        DebtType::Overdue,
        DebtType::FeesInterest,
        DebtType::CashAdvance,
        DebtType::Purchase,
        DebtType::Installment,
    ];
}

impl DebtType {
    pub const fn label(self) -> &'static str {
        match self {
            DebtType::Overdue => "OVERDUE",
            DebtType::FeesInterest => "FEES_INTEREST",
            DebtType::CashAdvance => "CASH_ADVANCE",
            DebtType::Purchase => "PURCHASE",
            DebtType::Installment => "INSTALLMENT",
        }
    }
}

impl fmt::Display for DebtType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for DebtType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DebtType::ALL
            .into_iter()
            .find(|debt_type| debt_type.label() == s)
            .ok_or_else(|| format!("unknown debt type: {s}"))
    }
}

/// A single outstanding balance with its own rate, minimum due and due
/// date.
///
/// Immutable once created.
///
/// # Panics
///
/// The constructor panics when the balance, minimum payment or annual
/// rate is negative, or when balance and minimum payment carry different
/// currencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtBucket {
    id: BucketId,
    debt_type: DebtType,
    balance: Money,
    minimum_payment: Money,
    /// Annual interest rate as a fraction (0.30 = 30%).
    annual_rate: Decimal,
    due_date: NaiveDate,
}

impl DebtBucket {
    pub fn new(
        id: BucketId,
        debt_type: DebtType,
        balance: Money,
        minimum_payment: Money,
        annual_rate: Decimal,
        due_date: NaiveDate,
    ) -> Self {
        assert!(
            !balance.is_negative(),
            "bucket balance must not be negative, got {balance}"
        );
        assert!(
            !minimum_payment.is_negative(),
            "minimum payment must not be negative, got {minimum_payment}"
        );
        assert!(
            annual_rate >= Decimal::ZERO,
            "annual rate must not be negative, got {annual_rate}"
        );
        assert_eq!(
            balance.currency(),
            minimum_payment.currency(),
            "balance and minimum payment must share a currency"
        );
        Self {
            id,
            debt_type,
            balance,
            minimum_payment,
            annual_rate,
            due_date,
        }
    }

    pub fn id(&self) -> &BucketId {
        &self.id
    }

    pub fn debt_type(&self) -> DebtType {
        self.debt_type
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn minimum_payment(&self) -> Money {
        self.minimum_payment
    }

    pub fn annual_rate(&self) -> Decimal {
        self.annual_rate
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn has_debt(&self) -> bool {
        self.balance.is_positive()
    }

    /// One month of interest on the balance left after `allocated` is
    /// paid off.
    pub fn projected_monthly_interest(&self, allocated: Decimal) -> Decimal {
        let residual = (self.balance.amount() - allocated).max(Decimal::ZERO);
        residual * self.annual_rate / Decimal::from(12)
    }
}

impl fmt::Display for DebtBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] balance {} min {} rate {} due {}",
            self.id, self.debt_type, self.balance, self.minimum_payment, self.annual_rate,
            self.due_date
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::Currency;
    use rust_decimal_macros::dec;

    fn due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 15).unwrap()
    }

    fn bucket(balance: Decimal) -> DebtBucket {
        DebtBucket::new(
            BucketId::new("2026-01/PURCHASE"),
            DebtType::Purchase,
            Money::new(balance, Currency::Try),
            Money::new(dec!(50), Currency::Try),
            dec!(0.2),
            due(),
        )
    }

    #[test]
    fn test_has_debt() {
        assert!(bucket(dec!(1000)).has_debt());
        assert!(!bucket(dec!(0)).has_debt());
    }

    #[test]
    #[should_panic(expected = "must not be negative")]
    fn test_negative_balance_rejected() {
        bucket(dec!(-1));
    }

    #[test]
    #[should_panic(expected = "share a currency")]
    fn test_mixed_currency_rejected() {
        DebtBucket::new(
            BucketId::new("B"),
            DebtType::Purchase,
            Money::new(dec!(100), Currency::Try),
            Money::new(dec!(10), Currency::Usd),
            dec!(0.2),
            due(),
        );
    }

    #[test]
    fn test_priority_ordering() {
        assert!(DebtType::Overdue < DebtType::FeesInterest);
        assert!(DebtType::FeesInterest < DebtType::CashAdvance);
        assert!(DebtType::CashAdvance < DebtType::Purchase);
        assert!(DebtType::Purchase < DebtType::Installment);
    }

    #[test]
    fn test_projected_monthly_interest() {
        let b = bucket(dec!(1200));
        assert_eq!(b.projected_monthly_interest(Decimal::ZERO), dec!(20));
        assert_eq!(b.projected_monthly_interest(dec!(600)), dec!(10));
        assert_eq!(b.projected_monthly_interest(dec!(5000)), Decimal::ZERO);
    }
}
