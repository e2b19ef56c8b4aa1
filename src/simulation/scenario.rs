use chrono::{Duration, NaiveDate};
use rand::Rng;
use rust_decimal::Decimal;

use crate::allocation::debt::{BucketId, DebtBucket, DebtType};
use crate::balance::bucket::BalanceBucket;
use crate::balance::change::BalanceChange;
use crate::core::currency::{Currency, CurrencyPair};
use crate::core::money::Money;
use crate::graph::rate_graph::CurrencyGraph;

/// Configuration for generating a random exchange-rate network.
#[derive(Debug, Clone)]
pub struct RateNetworkConfig {
    /// Number of pairs to insert.
    pub pair_count: usize,
    /// Lower bound of the raw rate band.
    pub min_rate: f64,
    /// Upper bound of the raw rate band.
    pub max_rate: f64,
    /// Relative perturbation applied to each rate; larger values make
    /// accidental arbitrage cycles more likely.
    pub perturbation: f64,
}

impl Default for RateNetworkConfig {
    fn default() -> Self {
        Self {
            pair_count: 12,
            min_rate: 0.4,
            max_rate: 2.5,
            perturbation: 0.05,
        }
    }
}

/// Generate a random rate network for testing.
pub fn generate_rate_network(config: &RateNetworkConfig) -> CurrencyGraph {
    let mut rng = rand::thread_rng();
    let mut graph = CurrencyGraph::new();

    for _ in 0..config.pair_count {
        let from = Currency::ALL[rng.gen_range(0..Currency::COUNT)];
        let mut to = Currency::ALL[rng.gen_range(0..Currency::COUNT)];
        while to == from {
            to = Currency::ALL[rng.gen_range(0..Currency::COUNT)];
        }

        let raw = rng.gen_range(config.min_rate..config.max_rate);
        let jitter = 1.0 + rng.gen_range(-config.perturbation..config.perturbation);
        let rate = Decimal::from_f64_retain(raw * jitter)
            .unwrap_or(Decimal::ONE)
            .round_dp(6);

        if let Ok(pair) = CurrencyPair::observed_now(from, to, rate) {
            graph.add_pair(pair);
        }
    }

    graph
}

/// Configuration for generating a random debt portfolio.
#[derive(Debug, Clone)]
pub struct PortfolioConfig {
    pub bucket_count: usize,
    pub currency: Currency,
    pub min_balance: u64,
    pub max_balance: u64,
    /// Upper bound of the annual rate band, as a fraction.
    pub max_rate: f64,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            bucket_count: 5,
            currency: Currency::Try,
            min_balance: 100,
            max_balance: 10_000,
            max_rate: 0.45,
        }
    }
}

/// Generate a random debt portfolio for testing.
pub fn generate_portfolio(config: &PortfolioConfig) -> Vec<DebtBucket> {
    let mut rng = rand::thread_rng();
    let base_due = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap_or_default();

    (0..config.bucket_count)
        .map(|i| {
            let debt_type = DebtType::ALL[rng.gen_range(0..DebtType::ALL.len())];
            let balance = Decimal::from(rng.gen_range(config.min_balance..=config.max_balance));
            let minimum = (balance * Decimal::new(5, 2)).round_dp(2);
            let rate = Decimal::from_f64_retain(rng.gen_range(0.0..config.max_rate))
                .unwrap_or(Decimal::ZERO)
                .round_dp(4);
            let due = base_due + Duration::days(rng.gen_range(0..60));

            DebtBucket::new(
                BucketId::new(format!("BUCKET-{i:03}")),
                debt_type,
                Money::new(balance, config.currency),
                Money::new(minimum, config.currency),
                rate,
                due,
            )
        })
        .collect()
}

/// Generate random dated deltas across the four balance buckets.
pub fn generate_changes(
    count: usize,
    start: NaiveDate,
    span_days: i64,
) -> Vec<(BalanceChange, BalanceBucket)> {
    let mut rng = rand::thread_rng();

    (0..count)
        .map(|_| {
            let date = start + Duration::days(rng.gen_range(0..span_days.max(1)));
            let amount = Decimal::from(rng.gen_range(-500i64..=1500));
            let bucket = BalanceBucket::ALL[rng.gen_range(0..BalanceBucket::COUNT)];
            (BalanceChange::new(date, amount), bucket)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_network_generation() {
        let config = RateNetworkConfig {
            pair_count: 20,
            ..Default::default()
        };
        let graph = generate_rate_network(&config);
        // forward plus reverse edge per generated pair
        assert_eq!(graph.edge_count(), 40);
    }

    #[test]
    fn test_portfolio_generation() {
        let config = PortfolioConfig {
            bucket_count: 8,
            ..Default::default()
        };
        let portfolio = generate_portfolio(&config);
        assert_eq!(portfolio.len(), 8);
        for bucket in &portfolio {
            assert!(bucket.has_debt());
            assert!(bucket.minimum_payment().amount() <= bucket.balance().amount());
        }
    }

    #[test]
    fn test_change_generation_spans_window() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let changes = generate_changes(50, start, 90);
        assert_eq!(changes.len(), 50);
        for (change, _) in &changes {
            assert!(change.date() >= start);
            assert!(change.date() < start + Duration::days(90));
        }
    }
}
