//! Benchmark setup error type.

use sisstat_core::SisError;

/// Errors that may occur while preparing benchmark inputs.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Graph construction, rate validation or solving failed.
    #[error("solver setup failed: {0}")]
    Core(#[from] SisError),
    /// A sweep used as a benchmark fixture failed.
    #[error("sweep failed: {0}")]
    Sweep(#[from] sisstat_core::SweepError),
}
