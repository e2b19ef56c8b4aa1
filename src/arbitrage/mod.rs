//! Negative-cycle arbitrage detection over the exchange-rate graph.

pub mod detector;
pub mod opportunity;
