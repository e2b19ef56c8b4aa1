use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors arising from date-range construction and arithmetic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateRangeError {
    #[error("range start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("date arithmetic left the supported calendar")]
    OutOfCalendar,
}

/// An inclusive interval of calendar days, `start <= end`.
///
/// All operations work at whole-day granularity.
///
/// # Examples
///
/// ```
/// use cardops_engine::core::dates::DateRange;
/// use chrono::NaiveDate;
///
/// let jan = DateRange::new(
///     NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
/// ).unwrap();
/// assert_eq!(jan.day_count(), 31);
/// assert!(jan.contains(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateRangeError> {
        if start > end {
            return Err(DateRangeError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// The days common to both ranges, if any.
    pub fn intersection(&self, other: &DateRange) -> Option<DateRange> {
        if !self.overlaps(other) {
            return None;
        }
        Some(Self {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        })
    }

    /// Move the end forward by `days`. Negative values pull it backward.
    pub fn extend(&self, days: i64) -> Result<DateRange, DateRangeError> {
        Self::new(self.start, offset(self.end, days)?)
    }

    /// Move both endpoints by `days`.
    pub fn shift(&self, days: i64) -> Result<DateRange, DateRangeError> {
        Self::new(offset(self.start, days)?, offset(self.end, days)?)
    }

    /// Pull the end backward by `days`; fails when the range would invert.
    pub fn shrink(&self, days: i64) -> Result<DateRange, DateRangeError> {
        Self::new(self.start, offset(self.end, -days)?)
    }

    /// Number of days covered, inclusive of both endpoints.
    pub fn day_count(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Every day in the range, ascending.
    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        std::iter::successors(Some(self.start), move |day| {
            day.succ_opt().filter(|next| *next <= end)
        })
    }
}

fn offset(date: NaiveDate, days: i64) -> Result<NaiveDate, DateRangeError> {
    date.checked_add_signed(Duration::days(days))
        .ok_or(DateRangeError::OutOfCalendar)
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} .. {}]", self.start, self.end)
    }
}
