use log::warn;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, EdgeRef};
use std::cmp::Ordering;

use crate::core::currency::{Currency, CurrencyPair};

/// A directed edge in log space.
///
/// The originating pair lives in the graph's arena and is referenced by
/// index, so edges stay `Copy` and the graph owns every pair exactly once.
#[derive(Debug, Clone, Copy)]
pub struct RateEdge {
    /// Log-space weight, `-ln(rate)`.
    pub weight: f64,
    /// Arena index of the originating pair.
    pub pair: usize,
}

/// Snapshot view of a single edge, resolved against the pair arena.
#[derive(Debug, Clone)]
pub struct EdgeView {
    pub from: Currency,
    pub to: Currency,
    pub weight: f64,
    pub pair: CurrencyPair,
}

/// A mutable accumulator of exchange-rate observations over the five
/// supported currencies.
///
/// Every currency is a fixed vertex; inserting a pair adds a forward edge
/// weighted `-ln(rate)` and, when the rate is invertible, a reverse edge
/// weighted `ln(rate)`. Parallel edges between the same vertices are
/// permitted; [`CurrencyGraph::best_rate`] resolves them to the
/// maximum-rate (minimum log weight) pair.
///
/// Not safe for concurrent mutation; pure queries on a frozen instance are
/// read-only.
///
/// # Examples
///
/// ```
/// use cardops_engine::core::currency::{Currency, CurrencyPair};
/// use cardops_engine::graph::rate_graph::CurrencyGraph;
/// use rust_decimal_macros::dec;
///
/// let mut graph = CurrencyGraph::new();
/// graph.add_pair(CurrencyPair::observed_now(Currency::Usd, Currency::Eur, dec!(0.9)).unwrap());
///
/// assert!(graph.has_edge(Currency::Usd, Currency::Eur));
/// assert!(graph.has_edge(Currency::Eur, Currency::Usd)); // reverse edge
/// assert_eq!(graph.best_rate(Currency::Usd, Currency::Eur).unwrap().rate(), dec!(0.9));
/// ```
#[derive(Debug, Clone)]
pub struct CurrencyGraph {
    graph: DiGraph<Currency, RateEdge>,
    nodes: [NodeIndex; Currency::COUNT],
    pairs: Vec<CurrencyPair>,
}

impl CurrencyGraph {
    pub fn new() -> Self {
        let mut graph = DiGraph::new();
        let nodes = Currency::ALL.map(|currency| graph.add_node(currency));
        Self {
            graph,
            nodes,
            pairs: Vec::new(),
        }
    }

    /// Insert a rate observation.
    ///
    /// The forward edge always lands; the reverse edge is derived from the
    /// inverted pair and skipped with a warning when inversion is
    /// impossible.
    pub fn add_pair(&mut self, pair: CurrencyPair) {
        let from = self.nodes[pair.from_currency().index()];
        let to = self.nodes[pair.to_currency().index()];

        let reverse = pair.reversed();
        if reverse.is_none() {
            warn!("rate for {pair} cannot be inverted; reverse edge skipped");
        }

        let weight = pair.log_weight();
        let pair_index = self.pairs.len();
        self.pairs.push(pair);
        self.graph.add_edge(from, to, RateEdge { weight, pair: pair_index });

        if let Some(reverse) = reverse {
            let weight = reverse.log_weight();
            let pair_index = self.pairs.len();
            self.pairs.push(reverse);
            self.graph.add_edge(to, from, RateEdge { weight, pair: pair_index });
        }
    }

    /// True when at least one edge runs in the given direction.
    pub fn has_edge(&self, from: Currency, to: Currency) -> bool {
        self.graph
            .edges_connecting(self.nodes[from.index()], self.nodes[to.index()])
            .next()
            .is_some()
    }

    /// The best pair in the given direction: minimum log weight, which is
    /// the maximum exchange rate among parallel edges.
    pub fn best_rate(&self, from: Currency, to: Currency) -> Option<&CurrencyPair> {
        self.graph
            .edges_connecting(self.nodes[from.index()], self.nodes[to.index()])
            .min_by(|a, b| {
                a.weight()
                    .weight
                    .partial_cmp(&b.weight().weight)
                    .unwrap_or(Ordering::Equal)
            })
            .map(|edge| &self.pairs[edge.weight().pair])
    }

    /// Snapshot of every edge, resolved against the pair arena.
    pub fn all_edges(&self) -> Vec<EdgeView> {
        self.graph
            .edge_references()
            .map(|edge| EdgeView {
                from: self.graph[edge.source()],
                to: self.graph[edge.target()],
                weight: edge.weight().weight,
                pair: self.pairs[edge.weight().pair].clone(),
            })
            .collect()
    }

    /// Directed edge list as `(from index, to index, log weight)` triples,
    /// the shape the Bellman-Ford relaxation loop consumes.
    pub fn weighted_edges(&self) -> Vec<(usize, usize, f64)> {
        self.graph
            .edge_references()
            .map(|edge| {
                (
                    self.graph[edge.source()].index(),
                    self.graph[edge.target()].index(),
                    edge.weight().weight,
                )
            })
            .collect()
    }

    /// The originating pair at an arena index.
    pub fn pair(&self, index: usize) -> Option<&CurrencyPair> {
        self.pairs.get(index)
    }

    /// Number of directed edges, reverse edges included.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of pairs in the arena, derived reverse pairs included.
    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    /// True iff every currency is reachable from vertex 0 through outgoing
    /// edges.
    pub fn is_connected(&self) -> bool {
        let mut reached = 0;
        let mut dfs = Dfs::new(&self.graph, self.nodes[0]);
        while dfs.next(&self.graph).is_some() {
            reached += 1;
        }
        reached == Currency::COUNT
    }
}

impl Default for CurrencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn pair(from: Currency, to: Currency, rate: Decimal) -> CurrencyPair {
        CurrencyPair::observed_now(from, to, rate).unwrap()
    }

    #[test]
    fn test_add_pair_inserts_both_directions() {
        let mut graph = CurrencyGraph::new();
        graph.add_pair(pair(Currency::Usd, Currency::Eur, dec!(0.9)));

        assert!(graph.has_edge(Currency::Usd, Currency::Eur));
        assert!(graph.has_edge(Currency::Eur, Currency::Usd));
        assert!(!graph.has_edge(Currency::Usd, Currency::Gbp));
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.pair_count(), 2);
    }

    #[test]
    fn test_best_rate_round_trips_within_tolerance() {
        let mut graph = CurrencyGraph::new();
        let rate = dec!(34.1278);
        graph.add_pair(pair(Currency::Usd, Currency::Try, rate));

        let best = graph.best_rate(Currency::Usd, Currency::Try).unwrap();
        assert!((best.rate() - rate).abs() < dec!(0.0000000001));
    }

    #[test]
    fn test_parallel_edges_resolve_to_maximum_rate() {
        let mut graph = CurrencyGraph::new();
        graph.add_pair(pair(Currency::Eur, Currency::Gbp, dec!(0.84)));
        graph.add_pair(pair(Currency::Eur, Currency::Gbp, dec!(0.86)));
        graph.add_pair(pair(Currency::Eur, Currency::Gbp, dec!(0.85)));

        let best = graph.best_rate(Currency::Eur, Currency::Gbp).unwrap();
        assert_eq!(best.rate(), dec!(0.86));
        // six directed edges: three forward, three reverse
        assert_eq!(graph.edge_count(), 6);
    }

    #[test]
    fn test_reverse_edge_weight_negates_forward() {
        let mut graph = CurrencyGraph::new();
        graph.add_pair(pair(Currency::Usd, Currency::Jpy, dec!(151)));

        let forward = graph.best_rate(Currency::Usd, Currency::Jpy).unwrap();
        let reverse = graph.best_rate(Currency::Jpy, Currency::Usd).unwrap();
        assert_relative_eq!(
            forward.log_weight(),
            -reverse.log_weight(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_connectivity() {
        let mut graph = CurrencyGraph::new();
        assert!(!graph.is_connected());

        graph.add_pair(pair(Currency::Try, Currency::Usd, dec!(0.03)));
        graph.add_pair(pair(Currency::Usd, Currency::Eur, dec!(0.9)));
        assert!(!graph.is_connected());

        graph.add_pair(pair(Currency::Eur, Currency::Gbp, dec!(0.85)));
        graph.add_pair(pair(Currency::Gbp, Currency::Jpy, dec!(190)));
        assert!(graph.is_connected());
    }

    #[test]
    fn test_all_edges_snapshot() {
        let mut graph = CurrencyGraph::new();
        graph.add_pair(pair(Currency::Usd, Currency::Eur, dec!(0.9)));
        let edges = graph.all_edges();
        assert_eq!(edges.len(), 2);
        assert!(edges
            .iter()
            .any(|e| e.from == Currency::Usd && e.to == Currency::Eur));
        assert!(edges
            .iter()
            .any(|e| e.from == Currency::Eur && e.to == Currency::Usd));
    }
}
