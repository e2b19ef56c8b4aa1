//! # cardops-engine
//!
//! Computation engines for a credit-card back office.
//!
//! Three independent engines share a small foundation of financial value
//! types. Callers construct inputs, invoke a pure computation and consume
//! outputs; there is no persistence, no I/O and no global state.
//!
//! - **FX arbitrage detection** — negative-cycle search over a directed
//!   graph of exchange rates in log space.
//! - **Daily balance aggregation** — sweep-line evaluation of sparse,
//!   timestamped balance deltas into per-day balances and averages.
//! - **Payment allocation** — distribution of a payment across weighted
//!   debt buckets under four interchangeable policies.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: currencies, money, date ranges
//! - **graph** — Exchange-rate graph with parallel edges and best-rate lookup
//! - **arbitrage** — Bellman-Ford detector and opportunity records
//! - **balance** — Balance buckets, dated deltas, sweep-line calculator
//! - **allocation** — Debt buckets and the four allocation strategies
//! - **simulation** — Random scenario generation for stress testing

pub mod allocation;
pub mod arbitrage;
pub mod balance;
pub mod core;
pub mod graph;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::allocation::allocation::PaymentAllocation;
    pub use crate::allocation::debt::{BucketId, DebtBucket, DebtType};
    pub use crate::allocation::strategy::{
        strategy_for, AllocationStrategy, StrategyConfig, StrategyKind,
    };
    pub use crate::arbitrage::detector::ArbitrageDetector;
    pub use crate::arbitrage::opportunity::ArbitrageOpportunity;
    pub use crate::balance::bucket::{BalanceBucket, BucketAmounts};
    pub use crate::balance::change::BalanceChange;
    pub use crate::balance::sweep::{DailyBalance, SweepBalanceCalculator};
    pub use crate::core::currency::{Currency, CurrencyPair};
    pub use crate::core::dates::DateRange;
    pub use crate::core::money::Money;
    pub use crate::graph::rate_graph::CurrencyGraph;
}
