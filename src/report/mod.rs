//! Report rendering: charts, PDF assembly and output files.

pub mod chart;
pub mod generator;
pub mod pdf;

pub use generator::*;
