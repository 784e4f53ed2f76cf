//! Solver configuration and per-population orchestration.
//!
//! [`SolverBuilder`] validates the execution settings once; the resulting
//! [`StationarySolver`] then turns a population size into a
//! [`PopulationResult`] by building the graph, deriving the rates, computing
//! the stationary distribution and reducing it to an infection probability.

use tracing::{debug, instrument};

use crate::{
    Result,
    error::SisError,
    graph::{AdjacencyMatrix, build_graph},
    rates::{ModelRates, Rates},
    result::PopulationResult,
    stationary::{
        DEFAULT_DRIFT_TOLERANCE, StationaryDistribution, check_normalisation,
        compute_distribution,
    },
    topology::Topology,
};

/// Indicates how the `2^N` configuration loop is scheduled.
///
/// `Auto` runs small populations sequentially and switches to the rayon
/// backend once the configuration space is large enough to amortise the
/// thread pool. Both backends reduce the normaliser in the same fixed order,
/// so they produce identical distributions.
///
/// # Examples
/// ```
/// use sisstat_core::ExecutionStrategy;
///
/// let strategy = ExecutionStrategy::default();
/// assert_eq!(strategy, ExecutionStrategy::Auto);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Select a backend from the population size.
    #[default]
    Auto,
    /// Evaluate every configuration on the calling thread.
    Sequential,
    /// Evaluate configurations across the rayon thread pool.
    Parallel,
}

/// Configures and constructs [`StationarySolver`] instances.
///
/// # Examples
/// ```
/// use sisstat_core::{ExecutionStrategy, SolverBuilder};
///
/// let solver = SolverBuilder::new()
///     .with_execution_strategy(ExecutionStrategy::Sequential)
///     .with_drift_tolerance(0.01)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(solver.execution_strategy(), ExecutionStrategy::Sequential);
/// assert_eq!(solver.drift_tolerance(), 0.01);
/// ```
#[derive(Debug, Clone)]
pub struct SolverBuilder {
    execution_strategy: ExecutionStrategy,
    drift_tolerance: f64,
}

impl Default for SolverBuilder {
    fn default() -> Self {
        Self {
            execution_strategy: ExecutionStrategy::Auto,
            drift_tolerance: DEFAULT_DRIFT_TOLERANCE,
        }
    }
}

impl SolverBuilder {
    /// Creates a builder populated with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the execution strategy used for the configuration loop.
    #[must_use]
    pub fn with_execution_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.execution_strategy = strategy;
        self
    }

    /// Returns the configured execution strategy.
    #[must_use]
    pub fn execution_strategy(&self) -> ExecutionStrategy {
        self.execution_strategy
    }

    /// Overrides the tolerated deviation of `Σπ` from 1.
    #[must_use]
    pub fn with_drift_tolerance(mut self, tolerance: f64) -> Self {
        self.drift_tolerance = tolerance;
        self
    }

    /// Returns the configured drift tolerance.
    #[must_use]
    pub fn drift_tolerance(&self) -> f64 {
        self.drift_tolerance
    }

    /// Validates the configuration and constructs a [`StationarySolver`].
    ///
    /// # Errors
    /// Returns [`SisError::InvalidTolerance`] when the drift tolerance is not
    /// finite and strictly positive.
    pub fn build(self) -> Result<StationarySolver> {
        if !self.drift_tolerance.is_finite() || self.drift_tolerance <= 0.0 {
            return Err(SisError::InvalidTolerance {
                got: self.drift_tolerance,
            });
        }
        Ok(StationarySolver {
            execution_strategy: self.execution_strategy,
            drift_tolerance: self.drift_tolerance,
        })
    }
}

/// Computes exact stationary quantities for individual populations.
///
/// # Examples
/// ```
/// use sisstat_core::{ModelRates, SolverBuilder, Topology};
///
/// let solver = SolverBuilder::new().build()?;
/// let model = ModelRates::new(1.0, 1.0, 1.0)?;
/// let result = solver.solve_population(3, Topology::Clique, &model)?;
/// assert_eq!(result.population, 3);
/// assert!(result.probability > 0.0 && result.probability < 1.0);
/// # Ok::<(), sisstat_core::SisError>(())
/// ```
#[derive(Debug, Clone)]
pub struct StationarySolver {
    execution_strategy: ExecutionStrategy,
    drift_tolerance: f64,
}

impl StationarySolver {
    /// Returns the execution strategy used by this solver.
    #[must_use]
    pub fn execution_strategy(&self) -> ExecutionStrategy {
        self.execution_strategy
    }

    /// Returns the tolerated deviation of `Σπ` from 1.
    #[must_use]
    pub fn drift_tolerance(&self) -> f64 {
        self.drift_tolerance
    }

    /// Computes the stationary distribution on `adjacency` and checks its
    /// normalisation, logging a warning on drift.
    ///
    /// # Errors
    /// Returns the errors of [`compute_distribution`].
    pub fn solve(
        &self,
        adjacency: &AdjacencyMatrix,
        rates: Rates,
    ) -> Result<StationaryDistribution> {
        let distribution = compute_distribution(adjacency, rates, self.execution_strategy)?;
        check_normalisation(&distribution, self.drift_tolerance);
        Ok(distribution)
    }

    /// Builds the graph for `population`, derives `lambda = c / population`,
    /// and reduces the stationary distribution to an infection probability.
    ///
    /// # Errors
    /// Returns [`SisError::UnsupportedTopology`] for non-clique topologies,
    /// the population errors of [`build_graph`] and the rate errors of
    /// [`ModelRates::rates_for`].
    #[instrument(
        name = "core.solve",
        err,
        skip(self, model),
        fields(population = population, topology = %topology),
    )]
    pub fn solve_population(
        &self,
        population: usize,
        topology: Topology,
        model: &ModelRates,
    ) -> Result<PopulationResult> {
        let adjacency = build_graph(population, topology)?;
        let rates = model.rates_for(population)?;
        let distribution = self.solve(&adjacency, rates)?;
        let expected_infected = distribution.expected_infected();
        let result = PopulationResult {
            population,
            lambda: rates.lambda(),
            expected_infected,
            probability: distribution.infection_probability(),
            distribution_total: distribution.total(),
            configurations: distribution.len(),
        };
        debug!(
            expected_infected,
            probability = result.probability,
            "population solved"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn builder_defaults() {
        let builder = SolverBuilder::new();
        assert_eq!(builder.execution_strategy(), ExecutionStrategy::Auto);
        assert_eq!(builder.drift_tolerance(), DEFAULT_DRIFT_TOLERANCE);
    }

    #[rstest]
    #[case(0.0)]
    #[case(-0.1)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn builder_rejects_unusable_tolerance(#[case] tolerance: f64) {
        let err = SolverBuilder::new()
            .with_drift_tolerance(tolerance)
            .build()
            .expect_err("tolerance must be rejected");
        assert!(matches!(err, SisError::InvalidTolerance { .. }));
    }

    #[rstest]
    fn solve_population_reports_lambda_and_configurations() {
        let solver = SolverBuilder::new().build().expect("defaults are valid");
        let model = ModelRates::new(1.0, 10.0, 1.0).expect("valid rates");
        let result = solver
            .solve_population(4, Topology::Clique, &model)
            .expect("clique population solves");
        assert_eq!(result.configurations, 16);
        assert!((result.lambda - 2.5).abs() < 1e-12);
        assert!((result.distribution_total - 1.0).abs() < 0.005);
        assert!((result.expected_infected / 4.0 - result.probability).abs() < 1e-12);
    }

    #[rstest]
    fn solve_population_rejects_star() {
        let solver = SolverBuilder::new().build().expect("defaults are valid");
        let model = ModelRates::new(1.0, 1.0, 1.0).expect("valid rates");
        let err = solver
            .solve_population(4, Topology::Star, &model)
            .expect_err("star topology is unsupported");
        assert_eq!(
            err,
            SisError::UnsupportedTopology {
                topology: Topology::Star
            }
        );
    }
}
