use log::debug;
use rust_decimal::Decimal;
use std::collections::HashSet;
use thiserror::Error;

use crate::arbitrage::opportunity::{ArbitrageOpportunity, DetectionStatistics};
use crate::core::currency::Currency;
use crate::graph::rate_graph::CurrencyGraph;

/// Slack applied to every relaxation comparison. Bellman-Ford tolerates
/// small numerical error, so distances stay in `f64`; the final profit is
/// recomputed in decimal.
pub const DEFAULT_EPSILON: f64 = 1e-8;

/// Tunables for a detection run.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Relaxation slack; an edge relaxes only when it improves the
    /// distance by more than this.
    pub epsilon: f64,
    /// Opportunities at or below this profit percentage are dropped.
    pub min_profit_percent: Decimal,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            min_profit_percent: Decimal::ZERO,
        }
    }
}

/// Errors arising from arbitrage detection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DetectError {
    #[error("currency graph is not connected; every currency must be reachable from vertex 0")]
    DisconnectedGraph,
}

/// Negative-cycle arbitrage detector.
///
/// Runs Bellman-Ford from every supported currency over the graph's
/// log-space weights, reconstructs cycles from the predecessor chain,
/// deduplicates them up to rotation and direction, and reports them in
/// descending profit order.
///
/// # Examples
///
/// ```
/// use cardops_engine::arbitrage::detector::ArbitrageDetector;
/// use cardops_engine::core::currency::{Currency, CurrencyPair};
/// use cardops_engine::graph::rate_graph::CurrencyGraph;
/// use rust_decimal_macros::dec;
///
/// let mut graph = CurrencyGraph::new();
/// for (from, to, rate) in [
///     (Currency::Try, Currency::Usd, dec!(0.03)),
///     (Currency::Usd, Currency::Eur, dec!(0.9)),
///     (Currency::Eur, Currency::Gbp, dec!(0.9)),
///     (Currency::Gbp, Currency::Usd, dec!(1.3)),
///     (Currency::Usd, Currency::Jpy, dec!(151)),
/// ] {
///     graph.add_pair(CurrencyPair::observed_now(from, to, rate).unwrap());
/// }
///
/// let detector = ArbitrageDetector::with_defaults();
/// let found = detector.detect(&graph).unwrap();
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].profit_percent(), dec!(5.3));
/// ```
pub struct ArbitrageDetector {
    config: DetectorConfig,
}

impl ArbitrageDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(DetectorConfig::default())
    }

    /// Find every distinct arbitrage cycle in the graph, best first.
    pub fn detect(
        &self,
        graph: &CurrencyGraph,
    ) -> Result<Vec<ArbitrageOpportunity>, DetectError> {
        if !graph.is_connected() {
            return Err(DetectError::DisconnectedGraph);
        }

        let edges = graph.weighted_edges();
        let mut seen: HashSet<Vec<usize>> = HashSet::new();
        let mut found = Vec::new();

        for source in Currency::ALL {
            for opportunity in self.scan_from(graph, &edges, source.index()) {
                if opportunity.profit_percent() <= self.config.min_profit_percent {
                    continue;
                }
                if seen.insert(opportunity.canonical_key()) {
                    found.push(opportunity);
                }
            }
        }

        found.sort_by(|a, b| b.profit_percent().cmp(&a.profit_percent()));
        Ok(found)
    }

    /// Source-only variant: at most one opportunity, discovered from the
    /// given currency's relaxation tree.
    pub fn detect_from(
        &self,
        graph: &CurrencyGraph,
        source: Currency,
    ) -> Result<Option<ArbitrageOpportunity>, DetectError> {
        if !graph.is_connected() {
            return Err(DetectError::DisconnectedGraph);
        }
        let edges = graph.weighted_edges();
        let mut opportunities = self.scan_from(graph, &edges, source.index());
        opportunities.retain(|o| o.profit_percent() > self.config.min_profit_percent);
        Ok(opportunities.into_iter().next())
    }

    /// Aggregate facts about the graph and the opportunities it holds.
    pub fn statistics(&self, graph: &CurrencyGraph) -> DetectionStatistics {
        let connected = graph.is_connected();
        let opportunities = if connected {
            self.detect(graph).unwrap_or_default()
        } else {
            Vec::new()
        };
        DetectionStatistics {
            currency_count: Currency::COUNT,
            edge_count: graph.edge_count(),
            pair_count: graph.pair_count(),
            connected,
            opportunity_count: opportunities.len(),
            best_profit_percent: opportunities.first().map(|o| o.profit_percent()),
        }
    }

    /// One Bellman-Ford pass from a single source.
    fn scan_from(
        &self,
        graph: &CurrencyGraph,
        edges: &[(usize, usize, f64)],
        source: usize,
    ) -> Vec<ArbitrageOpportunity> {
        let mut dist = [f64::INFINITY; Currency::COUNT];
        let mut pred: [Option<usize>; Currency::COUNT] = [None; Currency::COUNT];
        dist[source] = 0.0;

        for round in 0..Currency::COUNT - 1 {
            let mut relaxed = false;
            for &(u, v, w) in edges {
                if dist[u].is_finite() && dist[u] + w < dist[v] - self.config.epsilon {
                    dist[v] = dist[u] + w;
                    pred[v] = Some(u);
                    relaxed = true;
                }
            }
            if !relaxed {
                debug!("relaxation settled after {} rounds from vertex {source}", round + 1);
                break;
            }
        }

        // Detection round: an edge that still relaxes puts its destination
        // on, or downstream of, a negative cycle.
        let mut flagged = Vec::new();
        for &(u, v, w) in edges {
            if dist[u].is_finite() && dist[u] + w < dist[v] - self.config.epsilon {
                pred[v] = Some(u);
                flagged.push(v);
            }
        }

        let mut opportunities = Vec::new();
        for &start in &flagged {
            let Some(cycle) = extract_cycle(&pred, start) else {
                continue;
            };
            let cycle: Vec<Currency> = cycle
                .into_iter()
                .filter_map(Currency::from_index)
                .collect();
            if let Some(opportunity) = ArbitrageOpportunity::from_cycle(graph, cycle) {
                opportunities.push(opportunity);
            }
        }
        opportunities
    }
}

/// Walk the predecessor chain from `start` until a vertex repeats; the
/// repeated vertex closes the cycle. The walk runs against edge direction,
/// so the extracted slice is reversed into traversal order. Cycles shorter
/// than two vertices are discarded.
fn extract_cycle(
    pred: &[Option<usize>; Currency::COUNT],
    start: usize,
) -> Option<Vec<usize>> {
    let mut walk = Vec::new();
    let mut on_walk = [false; Currency::COUNT];
    let mut current = start;
    while !on_walk[current] {
        on_walk[current] = true;
        walk.push(current);
        current = pred[current]?;
    }

    let first = walk.iter().position(|&v| v == current)?;
    let mut cycle = walk[first..].to_vec();
    cycle.reverse();
    if cycle.len() < 2 {
        return None;
    }
    Some(cycle)
}
