use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

use crate::core::currency::Currency;

/// Fractional digits kept by division results, rounded half-even.
pub const WORKING_SCALE: u32 = 19;

/// Errors arising from monetary arithmetic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: Currency, right: Currency },
    #[error("decimal overflow in {op}")]
    Overflow { op: &'static str },
}

/// A currency-tagged decimal amount.
///
/// All binary operations require identical currencies and surface a
/// [`MoneyError::CurrencyMismatch`] otherwise. Overflow at working
/// precision is surfaced, never truncated. Division rounds half-even at
/// [`WORKING_SCALE`] digits.
///
/// # Examples
///
/// ```
/// use cardops_engine::core::currency::Currency;
/// use cardops_engine::core::money::Money;
/// use rust_decimal_macros::dec;
///
/// let a = Money::new(dec!(100.50), Currency::Try);
/// let b = Money::new(dec!(24.50), Currency::Try);
/// assert_eq!(a.checked_add(&b).unwrap().amount(), dec!(125));
///
/// let usd = Money::new(dec!(1), Currency::Usd);
/// assert!(a.checked_add(&usd).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    pub fn zero(currency: Currency) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    fn require_same_currency(&self, other: &Money) -> Result<(), MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency,
                right: other.currency,
            });
        }
        Ok(())
    }

    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.require_same_currency(other)?;
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(MoneyError::Overflow { op: "add" })?;
        Ok(Money::new(amount, self.currency))
    }

    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        self.require_same_currency(other)?;
        let amount = self
            .amount
            .checked_sub(other.amount)
            .ok_or(MoneyError::Overflow { op: "sub" })?;
        Ok(Money::new(amount, self.currency))
    }

    /// Scale by a dimensionless factor.
    pub fn checked_mul(&self, factor: Decimal) -> Result<Money, MoneyError> {
        let amount = self
            .amount
            .checked_mul(factor)
            .ok_or(MoneyError::Overflow { op: "mul" })?;
        Ok(Money::new(amount, self.currency))
    }

    /// Divide by a dimensionless divisor, rounding half-even at
    /// [`WORKING_SCALE`] digits. Division by zero surfaces as overflow.
    pub fn checked_div(&self, divisor: Decimal) -> Result<Money, MoneyError> {
        let amount = self
            .amount
            .checked_div(divisor)
            .ok_or(MoneyError::Overflow { op: "div" })?
            .round_dp_with_strategy(WORKING_SCALE, RoundingStrategy::MidpointNearestEven);
        Ok(Money::new(amount, self.currency))
    }

    /// Numerical comparison within the same currency.
    pub fn try_cmp(&self, other: &Money) -> Result<Ordering, MoneyError> {
        self.require_same_currency(other)?;
        Ok(self.amount.cmp(&other.amount))
    }

    /// The smaller of two same-currency amounts.
    pub fn try_min(&self, other: &Money) -> Result<Money, MoneyError> {
        Ok(match self.try_cmp(other)? {
            Ordering::Greater => *other,
            _ => *self,
        })
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}
