//! Triangular arbitrage walkthrough.
//!
//! Builds a small rate network containing one mispriced triangle and shows
//! how the detector finds, prices and ranks the cycle.

use cardops_engine::arbitrage::detector::ArbitrageDetector;
use cardops_engine::core::currency::{Currency, CurrencyPair};
use cardops_engine::graph::rate_graph::CurrencyGraph;
use rust_decimal_macros::dec;

fn main() {
    println!("╔══════════════════════════════════════════════╗");
    println!("║  cardops-engine: Triangular Arbitrage Demo   ║");
    println!("╚══════════════════════════════════════════════╝\n");

    let mut graph = CurrencyGraph::new();
    for (from, to, rate) in [
        (Currency::Try, Currency::Usd, dec!(0.025)),
        (Currency::Usd, Currency::Eur, dec!(0.9)),
        (Currency::Eur, Currency::Gbp, dec!(0.9)),
        (Currency::Gbp, Currency::Usd, dec!(1.3)),
        (Currency::Usd, Currency::Jpy, dec!(151)),
    ] {
        let pair = CurrencyPair::observed_now(from, to, rate).expect("valid pair");
        println!("  quote: {pair}");
        graph.add_pair(pair);
    }

    println!("\nGraph: {} directed edges (reverse edges included)", graph.edge_count());
    println!("Connected: {}\n", graph.is_connected());

    let detector = ArbitrageDetector::with_defaults();
    match detector.detect(&graph) {
        Ok(opportunities) if opportunities.is_empty() => {
            println!("No arbitrage found — the market is consistent.");
        }
        Ok(opportunities) => {
            println!("Found {} opportunity(ies):\n", opportunities.len());
            for (i, opportunity) in opportunities.iter().enumerate() {
                println!("  {}. {opportunity}", i + 1);
            }
            // USD -> EUR -> GBP -> USD multiplies to 0.9 * 0.9 * 1.3 = 1.053
            println!("\nA 1,000 USD round trip returns 1,053 USD before costs.");
        }
        Err(e) => println!("Detection failed: {e}"),
    }

    println!("\n{}", detector.statistics(&graph));
}
