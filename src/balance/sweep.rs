use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::balance::bucket::{BalanceBucket, BucketAmounts};
use crate::balance::change::BalanceChange;
use crate::core::dates::DateRange;

/// Fractional digits kept by average-balance results, rounded half-up.
pub const AVERAGE_SCALE: u32 = 6;

/// The balance of every bucket at the end of one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBalance {
    date: NaiveDate,
    amounts: BucketAmounts,
}

impl DailyBalance {
    pub fn new(date: NaiveDate, amounts: BucketAmounts) -> Self {
        Self { date, amounts }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn amounts(&self) -> &BucketAmounts {
        &self.amounts
    }

    pub fn balance(&self, bucket: BalanceBucket) -> Decimal {
        self.amounts.get(bucket)
    }

    /// Sum across all buckets.
    pub fn total_balance(&self) -> Decimal {
        self.amounts.total()
    }
}

impl fmt::Display for DailyBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: total {}", self.date, self.total_balance())
    }
}

/// Sweep-line daily balance calculator.
///
/// Stores only change points (dates on which at least one delta occurs)
/// in an ordered map, which keeps insertion at `O(log K)` and makes range
/// queries cost `O(K + N)` for `K` change points and `N` emitted days,
/// independent of how far the range sits from the first change.
///
/// The calculator is a mutable accumulator; callers must serialize
/// mutation. All query methods are read-only.
///
/// # Examples
///
/// ```
/// use cardops_engine::balance::bucket::{BalanceBucket, BucketAmounts};
/// use cardops_engine::balance::change::BalanceChange;
/// use cardops_engine::balance::sweep::SweepBalanceCalculator;
/// use cardops_engine::core::dates::DateRange;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let mut initial = BucketAmounts::new();
/// initial.set(BalanceBucket::Purchase, dec!(1000));
///
/// let mut calc = SweepBalanceCalculator::with_initial(initial);
/// calc.add_change(
///     &BalanceChange::new(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(), dec!(500)),
///     BalanceBucket::Purchase,
/// );
///
/// let at = calc.balance_at(NaiveDate::from_ymd_opt(2026, 1, 6).unwrap());
/// assert_eq!(at.balance(BalanceBucket::Purchase), dec!(1500));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SweepBalanceCalculator {
    initial: BucketAmounts,
    deltas: BTreeMap<NaiveDate, BucketAmounts>,
}

impl SweepBalanceCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from known per-bucket opening balances.
    pub fn with_initial(initial: BucketAmounts) -> Self {
        Self {
            initial,
            deltas: BTreeMap::new(),
        }
    }

    /// Record a delta against a bucket. Deltas on the same date are
    /// additive.
    pub fn add_change(&mut self, change: &BalanceChange, bucket: BalanceBucket) {
        self.deltas
            .entry(change.date())
            .or_default()
            .add(bucket, change.amount());
    }

    pub fn add_changes<'a, I>(&mut self, changes: I)
    where
        I: IntoIterator<Item = (&'a BalanceChange, BalanceBucket)>,
    {
        for (change, bucket) in changes {
            self.add_change(change, bucket);
        }
    }

    /// Drop every recorded delta, keeping the initial balances.
    pub fn clear(&mut self) {
        self.deltas.clear();
    }

    /// Dates carrying at least one delta, ascending.
    pub fn change_points(&self) -> Vec<NaiveDate> {
        self.deltas.keys().copied().collect()
    }

    pub fn change_point_count(&self) -> usize {
        self.deltas.len()
    }

    /// The balance state after applying every delta dated on or before
    /// `date`.
    pub fn balance_at(&self, date: NaiveDate) -> DailyBalance {
        let mut running = self.initial;
        for amounts in self.deltas.range(..=date).map(|(_, a)| a) {
            running.merge(amounts);
        }
        DailyBalance::new(date, running)
    }

    /// One snapshot per calendar day in `range`, strictly ascending and
    /// contiguous. The opening state folds every delta dated before
    /// `range.start`; each day then folds its own deltas before the
    /// snapshot is emitted.
    pub fn daily_balances(&self, range: &DateRange) -> Vec<DailyBalance> {
        let mut running = self.initial;
        for amounts in self.deltas.range(..range.start()).map(|(_, a)| a) {
            running.merge(amounts);
        }

        let mut snapshots = Vec::with_capacity(range.day_count() as usize);
        for date in range.iter_days() {
            if let Some(amounts) = self.deltas.get(&date) {
                running.merge(amounts);
            }
            snapshots.push(DailyBalance::new(date, running));
        }
        snapshots
    }

    /// Per-bucket mean of the daily balances over `range`, rounded
    /// half-up at [`AVERAGE_SCALE`] digits. All zeros when there are no
    /// snapshots to average.
    pub fn average_balances(&self, range: &DateRange) -> BucketAmounts {
        let snapshots = self.daily_balances(range);
        if snapshots.is_empty() {
            return BucketAmounts::default();
        }

        let mut sums = BucketAmounts::default();
        for snapshot in &snapshots {
            sums.merge(snapshot.amounts());
        }

        let days = Decimal::from(snapshots.len() as u64);
        let mut averages = BucketAmounts::default();
        for bucket in BalanceBucket::ALL {
            let mean = (sums.get(bucket) / days)
                .round_dp_with_strategy(AVERAGE_SCALE, RoundingStrategy::MidpointAwayFromZero);
            averages.set(bucket, mean);
        }
        averages
    }

    /// Sum of one bucket's deltas at dates contained in `range`.
    pub fn total_delta(&self, bucket: BalanceBucket, range: &DateRange) -> Decimal {
        self.deltas
            .range(range.start()..=range.end())
            .map(|(_, amounts)| amounts.get(bucket))
            .sum()
    }
}
