use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Categories of card debt with distinct accrual rules.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BalanceBucket {
    Purchase,
    CashAdvance,
    Installment,
    FeesInterest,
}

impl BalanceBucket {
    pub const COUNT: usize = 4;

    pub const ALL: [BalanceBucket; BalanceBucket::COUNT] = [
        BalanceBucket::Purchase,
        BalanceBucket::CashAdvance,
        BalanceBucket::Installment,
        BalanceBucket::FeesInterest,
    ];

    pub const fn index(self) -> usize {
        match self {
            BalanceBucket::Purchase => 0,
            BalanceBucket::CashAdvance => 1,
            BalanceBucket::Installment => 2,
            BalanceBucket::FeesInterest => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            BalanceBucket::Purchase => "PURCHASE",
            BalanceBucket::CashAdvance => "CASH_ADVANCE",
            BalanceBucket::Installment => "INSTALLMENT",
            BalanceBucket::FeesInterest => "FEES_INTEREST",
        }
    }
}

impl fmt::Display for BalanceBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for BalanceBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BalanceBucket::ALL
            .into_iter()
            .find(|bucket| bucket.label() == s)
            .ok_or_else(|| format!("unknown balance bucket: {s}"))
    }
}

/// A dense amount per bucket. Every bucket always has an entry; untouched
/// buckets read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BucketAmounts {
    amounts: [Decimal; BalanceBucket::COUNT],
}

impl BucketAmounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, bucket: BalanceBucket) -> Decimal {
        self.amounts[bucket.index()]
    }

    pub fn set(&mut self, bucket: BalanceBucket, amount: Decimal) {
        self.amounts[bucket.index()] = amount;
    }

    pub fn add(&mut self, bucket: BalanceBucket, delta: Decimal) {
        self.amounts[bucket.index()] += delta;
    }

    /// Fold another set of amounts into this one, bucket by bucket.
    pub fn merge(&mut self, other: &BucketAmounts) {
        for bucket in BalanceBucket::ALL {
            self.amounts[bucket.index()] += other.amounts[bucket.index()];
        }
    }

    /// Sum across all buckets.
    pub fn total(&self) -> Decimal {
        self.amounts.iter().copied().sum()
    }

    pub fn is_zero(&self) -> bool {
        self.amounts.iter().all(|a| a.is_zero())
    }

    pub fn iter(&self) -> impl Iterator<Item = (BalanceBucket, Decimal)> + '_ {
        BalanceBucket::ALL
            .iter()
            .map(move |&bucket| (bucket, self.get(bucket)))
    }
}

impl FromIterator<(BalanceBucket, Decimal)> for BucketAmounts {
    fn from_iter<T: IntoIterator<Item = (BalanceBucket, Decimal)>>(iter: T) -> Self {
        let mut amounts = Self::default();
        for (bucket, amount) in iter {
            amounts.add(bucket, amount);
        }
        amounts
    }
}
