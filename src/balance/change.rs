use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A dated, signed balance delta. Positive amounts accrue, negative
/// amounts reduce. Which bucket the delta lands in is supplied by the
/// caller at insertion time.
///
/// Changes are immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceChange {
    date: NaiveDate,
    amount: Decimal,
    reference: Option<String>,
}

impl BalanceChange {
    pub fn new(date: NaiveDate, amount: Decimal) -> Self {
        Self {
            date,
            amount,
            reference: None,
        }
    }

    /// Attach a reference or memo.
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn is_accrual(&self) -> bool {
        self.amount > Decimal::ZERO
    }
}

impl fmt::Display for BalanceChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:+}", self.date, self.amount)
    }
}
