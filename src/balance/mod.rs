//! Daily balance aggregation over sparse, dated deltas.

pub mod bucket;
pub mod change;
pub mod sweep;
