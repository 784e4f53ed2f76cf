//! Benchmark support crate for sisstat.
//!
//! Provides the parameter labels and setup error type shared by the Criterion
//! benchmarks of the stationary-distribution calculator and the sweep driver.

pub mod error;
pub mod params;
