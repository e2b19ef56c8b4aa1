//! Random scenario generation for stress testing and benchmarks.
//!
//! The three engines are deterministic; everything that draws randomness
//! lives here.

pub mod scenario;
