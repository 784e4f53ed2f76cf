//! Benchmark parameter labels.

use std::fmt;

use sisstat_core::ExecutionStrategy;

/// Parameters for a stationary-distribution benchmark run.
#[derive(Clone, Copy, Debug)]
pub struct StationaryBenchParams {
    /// Number of nodes in the clique.
    pub population: usize,
    /// Backend used for the configuration loop.
    pub strategy: ExecutionStrategy,
}

impl fmt::Display for StationaryBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strategy = match self.strategy {
            ExecutionStrategy::Auto => "auto",
            ExecutionStrategy::Sequential => "sequential",
            ExecutionStrategy::Parallel => "parallel",
        };
        write!(f, "N={},{strategy}", self.population)
    }
}

/// Parameters for a sweep benchmark run.
#[derive(Clone, Copy, Debug)]
pub struct SweepBenchParams {
    /// First population.
    pub start: i64,
    /// Last population (inclusive).
    pub max: i64,
    /// Step between populations.
    pub increment: i64,
}

impl fmt::Display for SweepBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={} step {}", self.start, self.max, self.increment)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(ExecutionStrategy::Sequential, "N=14,sequential")]
    #[case(ExecutionStrategy::Parallel, "N=14,parallel")]
    fn labels_name_population_and_strategy(
        #[case] strategy: ExecutionStrategy,
        #[case] expected: &str,
    ) {
        let params = StationaryBenchParams {
            population: 14,
            strategy,
        };
        assert_eq!(params.to_string(), expected);
    }
}
