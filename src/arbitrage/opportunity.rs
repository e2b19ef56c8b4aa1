use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::currency::{Currency, CurrencyPair};
use crate::graph::rate_graph::CurrencyGraph;

/// Fractional digits kept by the profit computation.
pub const PROFIT_SCALE: u32 = 10;

/// A profitable round trip through the exchange-rate graph.
///
/// `cycle` holds the distinct currencies in traversal order; `legs` holds
/// the best-rate pair for every hop, wraparound included, so
/// `legs.len() == cycle.len()`. The total rate is the decimal product of
/// the leg rates, kept at [`PROFIT_SCALE`] digits to avoid the log/exp
/// round-trip error of the relaxation phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrageOpportunity {
    cycle: Vec<Currency>,
    legs: Vec<CurrencyPair>,
    total_rate: Decimal,
    profit_percent: Decimal,
}

impl ArbitrageOpportunity {
    /// Assemble an opportunity from a cycle of currencies, resolving each
    /// hop through best-rate lookup.
    ///
    /// Returns `None` when the cycle is shorter than two currencies, a hop
    /// has no edge, the product overflows, or the round trip is not
    /// profitable.
    pub fn from_cycle(graph: &CurrencyGraph, cycle: Vec<Currency>) -> Option<Self> {
        if cycle.len() < 2 {
            return None;
        }

        let mut legs = Vec::with_capacity(cycle.len());
        let mut total_rate = Decimal::ONE;
        for (hop, &from) in cycle.iter().enumerate() {
            let to = cycle[(hop + 1) % cycle.len()];
            let pair = graph.best_rate(from, to)?;
            total_rate = total_rate.checked_mul(pair.rate())?;
            legs.push(pair.clone());
        }

        let total_rate =
            total_rate.round_dp_with_strategy(PROFIT_SCALE, RoundingStrategy::MidpointNearestEven);
        if total_rate <= Decimal::ONE {
            return None;
        }
        let profit_percent = ((total_rate - Decimal::ONE) * Decimal::from(100))
            .round_dp_with_strategy(PROFIT_SCALE, RoundingStrategy::MidpointNearestEven);

        Some(Self {
            cycle,
            legs,
            total_rate,
            profit_percent,
        })
    }

    /// Distinct currencies in traversal order.
    pub fn cycle(&self) -> &[Currency] {
        &self.cycle
    }

    /// Best-rate pair per hop, wraparound included.
    pub fn legs(&self) -> &[CurrencyPair] {
        &self.legs
    }

    pub fn cycle_len(&self) -> usize {
        self.cycle.len()
    }

    /// Product of the leg rates.
    pub fn total_rate(&self) -> Decimal {
        self.total_rate
    }

    /// `(total_rate - 1) * 100`.
    pub fn profit_percent(&self) -> Decimal {
        self.profit_percent
    }

    /// Canonical identity of the cycle, invariant under rotation and
    /// traversal direction. Two opportunities are duplicates iff their
    /// keys are equal.
    pub fn canonical_key(&self) -> Vec<usize> {
        let forward: Vec<usize> = self.cycle.iter().map(|c| c.index()).collect();
        let mut backward = forward.clone();
        backward.reverse();
        let forward = smallest_rotation(&forward);
        let backward = smallest_rotation(&backward);
        if forward <= backward {
            forward
        } else {
            backward
        }
    }
}

/// Normalize a cyclic sequence to its lexicographically smallest rotation.
fn smallest_rotation(seq: &[usize]) -> Vec<usize> {
    if seq.is_empty() {
        return Vec::new();
    }
    let mut best = seq.to_vec();
    for split in 1..seq.len() {
        let rotated: Vec<usize> = seq[split..]
            .iter()
            .chain(seq[..split].iter())
            .copied()
            .collect();
        if rotated < best {
            best = rotated;
        }
    }
    best
}

impl fmt::Display for ArbitrageOpportunity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path: Vec<String> = self
            .cycle
            .iter()
            .chain(self.cycle.first())
            .map(|c| c.to_string())
            .collect();
        write!(
            f,
            "{} | rate {} | profit {}%",
            path.join(" -> "),
            self.total_rate,
            self.profit_percent
        )
    }
}

/// Aggregate facts about a detection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionStatistics {
    pub currency_count: usize,
    pub edge_count: usize,
    pub pair_count: usize,
    pub connected: bool,
    pub opportunity_count: usize,
    pub best_profit_percent: Option<Decimal>,
}

impl fmt::Display for DetectionStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Detection Statistics ===")?;
        writeln!(f, "Currencies:    {}", self.currency_count)?;
        writeln!(f, "Edges:         {}", self.edge_count)?;
        writeln!(f, "Pairs:         {}", self.pair_count)?;
        writeln!(f, "Connected:     {}", self.connected)?;
        writeln!(f, "Opportunities: {}", self.opportunity_count)?;
        match &self.best_profit_percent {
            Some(best) => writeln!(f, "Best profit:   {best}%"),
            None => writeln!(f, "Best profit:   n/a"),
        }
    }
}
