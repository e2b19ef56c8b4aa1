use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::core::money::WORKING_SCALE;

/// Errors arising from currency and exchange-rate operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CurrencyError {
    #[error("unsupported currency code: {0}")]
    Unsupported(String),
    #[error("exchange rate must be positive, got {rate} for {from} -> {to}")]
    InvalidRate {
        from: Currency,
        to: Currency,
        rate: Decimal,
    },
    #[error("currency pair must have two distinct sides, got {0}")]
    SamePair(Currency),
}

/// The closed set of currencies handled by the card programme.
///
/// Each currency carries a stable vertex index used by the exchange-rate
/// graph and the arbitrage detector.
///
/// # Examples
///
/// ```
/// use cardops_engine::core::currency::Currency;
///
/// assert_eq!(Currency::Try.index(), 0);
/// assert_eq!("EUR".parse::<Currency>().unwrap(), Currency::Eur);
/// assert!("XAU".parse::<Currency>().is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Try,
    Usd,
    Eur,
    Gbp,
    Jpy,
}

impl Currency {
    /// Number of supported currencies.
    pub const COUNT: usize = 5;

    /// All supported currencies in index order.
    pub const ALL: [Currency; Currency::COUNT] = [
        Currency::Try,
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Jpy,
    ];

    /// Stable vertex index, 0..=4.
    pub const fn index(self) -> usize {
        match self {
            Currency::Try => 0,
            Currency::Usd => 1,
            Currency::Eur => 2,
            Currency::Gbp => 3,
            Currency::Jpy => 4,
        }
    }

    /// Currency at the given vertex index.
    pub fn from_index(index: usize) -> Option<Currency> {
        Currency::ALL.get(index).copied()
    }

    /// ISO 4217 code.
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Try => "TRY",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Jpy => "JPY",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TRY" => Ok(Currency::Try),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "GBP" => Ok(Currency::Gbp),
            "JPY" => Ok(Currency::Jpy),
            other => Err(CurrencyError::Unsupported(other.to_string())),
        }
    }
}

/// A directed exchange-rate observation: one unit of `from` buys `rate`
/// units of `to`.
///
/// Pairs are immutable once constructed. The rate is strictly positive and
/// the two sides are distinct; violating either is a construction error.
///
/// # Examples
///
/// ```
/// use cardops_engine::core::currency::{Currency, CurrencyPair};
/// use rust_decimal_macros::dec;
///
/// let pair = CurrencyPair::observed_now(Currency::Usd, Currency::Eur, dec!(0.9)).unwrap();
/// assert!(pair.log_weight() > 0.0); // rate < 1 => positive log weight
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyPair {
    from: Currency,
    to: Currency,
    rate: Decimal,
    observed_at: DateTime<Utc>,
}

impl CurrencyPair {
    /// Create a pair with an explicit observation timestamp.
    pub fn new(
        from: Currency,
        to: Currency,
        rate: Decimal,
        observed_at: DateTime<Utc>,
    ) -> Result<Self, CurrencyError> {
        if from == to {
            return Err(CurrencyError::SamePair(from));
        }
        if rate <= Decimal::ZERO {
            return Err(CurrencyError::InvalidRate { from, to, rate });
        }
        Ok(Self {
            from,
            to,
            rate,
            observed_at,
        })
    }

    /// Create a pair observed at the current instant.
    pub fn observed_now(
        from: Currency,
        to: Currency,
        rate: Decimal,
    ) -> Result<Self, CurrencyError> {
        Self::new(from, to, rate, Utc::now())
    }

    pub fn from_currency(&self) -> Currency {
        self.from
    }

    pub fn to_currency(&self) -> Currency {
        self.to
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }

    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }

    /// Log-space edge weight, `-ln(rate)`.
    ///
    /// A round trip whose product of rates exceeds 1 has a sum of log
    /// weights below 0, which is what the arbitrage detector looks for.
    pub fn log_weight(&self) -> f64 {
        // rate is validated positive, so the conversion keeps the sign
        let rate = self.rate.to_f64().unwrap_or(f64::MIN_POSITIVE);
        -rate.ln()
    }

    /// The opposite direction at rate `1/rate`, carrying the same
    /// observation timestamp. `None` when the rate cannot be inverted.
    pub fn reversed(&self) -> Option<CurrencyPair> {
        let inverse = Decimal::ONE
            .checked_div(self.rate)?
            .round_dp_with_strategy(WORKING_SCALE, RoundingStrategy::MidpointNearestEven);
        if inverse <= Decimal::ZERO {
            return None;
        }
        Some(Self {
            from: self.to,
            to: self.from,
            rate: inverse,
            observed_at: self.observed_at,
        })
    }

    /// True when the observation is older than `threshold_minutes` at `now`.
    pub fn is_stale(&self, threshold_minutes: i64, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.observed_at) > Duration::minutes(threshold_minutes)
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} @ {}", self.from, self.to, self.rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rust_decimal_macros::dec;

    fn pair(from: Currency, to: Currency, rate: Decimal) -> CurrencyPair {
        CurrencyPair::observed_now(from, to, rate).unwrap()
    }

    #[test]
    fn test_index_round_trip() {
        for currency in Currency::ALL {
            assert_eq!(Currency::from_index(currency.index()), Some(currency));
        }
        assert_eq!(Currency::from_index(5), None);
    }

    #[test]
    fn test_parse_codes() {
        assert_eq!("TRY".parse::<Currency>().unwrap(), Currency::Try);
        assert_eq!("JPY".parse::<Currency>().unwrap(), Currency::Jpy);
        assert_eq!(
            "BTC".parse::<Currency>(),
            Err(CurrencyError::Unsupported("BTC".to_string()))
        );
    }

    #[test]
    fn test_rejects_non_positive_rate() {
        assert!(CurrencyPair::observed_now(Currency::Usd, Currency::Eur, dec!(0)).is_err());
        assert!(CurrencyPair::observed_now(Currency::Usd, Currency::Eur, dec!(-1.5)).is_err());
    }

    #[test]
    fn test_rejects_same_pair() {
        assert_eq!(
            CurrencyPair::observed_now(Currency::Gbp, Currency::Gbp, dec!(1)).unwrap_err(),
            CurrencyError::SamePair(Currency::Gbp)
        );
    }

    #[test]
    fn test_log_weight_sign() {
        let cheap = pair(Currency::Usd, Currency::Eur, dec!(0.5));
        let rich = pair(Currency::Gbp, Currency::Try, dec!(40));
        assert!(cheap.log_weight() > 0.0);
        assert!(rich.log_weight() < 0.0);
        assert_relative_eq!(
            pair(Currency::Usd, Currency::Eur, dec!(1)).log_weight(),
            0.0
        );
    }

    #[test]
    fn test_reverse_twice_restores_rate() {
        let original = pair(Currency::Usd, Currency::Jpy, dec!(151.37));
        let round_trip = original.reversed().unwrap().reversed().unwrap();
        assert_eq!(round_trip.from_currency(), Currency::Usd);
        assert_eq!(round_trip.to_currency(), Currency::Jpy);
        let drift = (round_trip.rate() - original.rate()).abs();
        assert!(drift < dec!(0.0000000001), "drift was {drift}");
    }

    #[test]
    fn test_staleness() {
        let now = Utc::now();
        let pair =
            CurrencyPair::new(Currency::Usd, Currency::Eur, dec!(0.9), now - Duration::minutes(30))
                .unwrap();
        assert!(pair.is_stale(15, now));
        assert!(!pair.is_stale(60, now));
    }
}
