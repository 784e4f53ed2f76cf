//! Per-population outcomes of the stationary solver.

use std::fmt;

/// Stationary summary of one population size.
///
/// # Examples
/// ```
/// use sisstat_core::PopulationResult;
///
/// let result = PopulationResult {
///     population: 4,
///     lambda: 0.25,
///     expected_infected: 1.0,
///     probability: 0.25,
///     distribution_total: 1.0,
///     configurations: 16,
/// };
/// assert_eq!(result.to_string(), "N=4 lambda=0.25000 E[I]=1.00000 p=0.25000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationResult {
    /// Number of nodes.
    pub population: usize,
    /// Exogenous infection rate derived for this population.
    pub lambda: f64,
    /// Expected number of infected nodes at stationarity.
    pub expected_infected: f64,
    /// Probability that a given node is infected.
    pub probability: f64,
    /// Observed `Σπ` after normalisation.
    pub distribution_total: f64,
    /// Number of enumerated configurations (`2^N`).
    pub configurations: usize,
}

impl fmt::Display for PopulationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "N={} lambda={:.5} E[I]={:.5} p={:.5}",
            self.population, self.lambda, self.expected_infected, self.probability
        )
    }
}
