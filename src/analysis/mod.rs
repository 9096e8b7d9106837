//! Aggregation over a loaded table.

pub mod aggregator;

pub use aggregator::*;
