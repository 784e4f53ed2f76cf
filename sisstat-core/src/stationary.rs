//! Exact stationary distribution of the SIS process on a graph.
//!
//! Every configuration `i` receives the weight
//! `(λ/μ)^k(i) · γ^m(i)`, where `k` counts infected nodes and `m` counts
//! infected-infected edges. Weights are evaluated in log space and rescaled by
//! the largest log weight before exponentiation, so extreme populations or
//! rate ratios cannot overflow the normaliser. Configuration 0 always has log
//! weight 0, which keeps the rescaled normaliser at least 1.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{instrument, warn};

use crate::{
    Result,
    configuration::{Configuration, configuration_count},
    graph::AdjacencyMatrix,
    rates::Rates,
    solver::ExecutionStrategy,
};

/// Absolute deviation of `Σπ` from 1 above which a warning is logged.
pub const DEFAULT_DRIFT_TOLERANCE: f64 = 0.005;

/// Populations at or above this size run in parallel under
/// [`ExecutionStrategy::Auto`].
pub const PARALLEL_THRESHOLD: usize = 12;

/// Length of the fixed chunks summed independently before their partial sums
/// are combined in index order.
const REDUCTION_CHUNK: usize = 4096;

/// Stationary probabilities and infected-node counts for every configuration.
///
/// Entry `i` of both vectors describes configuration index `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct StationaryDistribution {
    population: usize,
    pi: Vec<f64>,
    n_infected: Vec<u32>,
}

impl StationaryDistribution {
    /// Number of nodes in the population.
    #[must_use]
    pub fn population(&self) -> usize {
        self.population
    }

    /// Stationary probability of each configuration.
    #[must_use]
    pub fn pi(&self) -> &[f64] {
        &self.pi
    }

    /// Number of infected nodes in each configuration.
    #[must_use]
    pub fn n_infected(&self) -> &[u32] {
        &self.n_infected
    }

    /// Number of configurations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pi.len()
    }

    /// Always `false`: every population has at least two configurations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pi.is_empty()
    }

    /// Sum of all stationary probabilities, using the same fixed-chunk
    /// reduction as the normaliser.
    #[must_use]
    pub fn total(&self) -> f64 {
        chunked_sum(Backend::Sequential, &self.pi)
    }

    /// Expected number of infected nodes.
    #[must_use]
    pub fn expected_infected(&self) -> f64 {
        expected_infected(&self.pi, &self.n_infected)
    }

    /// Probability that a given node is infected.
    #[must_use]
    pub fn infection_probability(&self) -> f64 {
        infection_probability(self.expected_infected(), self.population)
    }
}

/// Computes the stationary distribution of the SIS process on `adjacency`.
///
/// # Errors
/// Returns [`crate::SisError::BackendUnavailable`] when `strategy` requests a
/// backend that is not compiled in, and the population errors of
/// [`configuration_count`].
///
/// # Examples
/// ```
/// use sisstat_core::{ExecutionStrategy, Rates, Topology, build_graph, compute_distribution};
///
/// let graph = build_graph(3, Topology::Clique)?;
/// let rates = Rates::new(1.0 / 3.0, 1.0, 1.0)?;
/// let distribution = compute_distribution(&graph, rates, ExecutionStrategy::Sequential)?;
/// assert_eq!(distribution.n_infected(), &[0, 1, 1, 2, 1, 2, 2, 3]);
/// assert!((distribution.total() - 1.0).abs() < 1e-12);
/// # Ok::<(), sisstat_core::SisError>(())
/// ```
#[instrument(
    name = "core.compute_distribution",
    err,
    skip(adjacency, rates),
    fields(population = adjacency.population(), strategy = ?strategy),
)]
pub fn compute_distribution(
    adjacency: &AdjacencyMatrix,
    rates: Rates,
    strategy: ExecutionStrategy,
) -> Result<StationaryDistribution> {
    let population = adjacency.population();
    let count = configuration_count(population)?;
    let backend = Backend::resolve(strategy, population)?;

    let log_pressure = rates.pressure().ln();
    let log_gamma = rates.gamma().ln();
    let mut pi = vec![0.0_f64; count];
    let mut n_infected = vec![0_u32; count];

    backend.fill(&mut pi, &mut n_infected, |index| {
        let x = Configuration::new_unchecked(population, index);
        let infected = x.infected_count();
        let edges = adjacency.infected_edges(&x);
        let log_weight =
            log_power(u64::from(infected), log_pressure) + log_power(edges, log_gamma);
        (log_weight, infected)
    });

    let shift = backend.max(&pi);
    backend.map_in_place(&mut pi, |log_weight| (log_weight - shift).exp());
    let z = chunked_sum(backend, &pi);
    backend.map_in_place(&mut pi, |weight| weight / z);

    Ok(StationaryDistribution {
        population,
        pi,
        n_infected,
    })
}

/// `exponent · ln(base)`, treating a zero exponent as exactly zero so that
/// `0^0 = 1` holds even when `ln(base)` is `-∞`.
fn log_power(exponent: u64, log_base: f64) -> f64 {
    if exponent == 0 {
        0.0
    } else {
        exponent as f64 * log_base
    }
}

/// Logs a warning when `Σπ` deviates from 1 by more than `tolerance`.
///
/// Returns the observed sum. The drift is a diagnostic only; callers keep
/// using the distribution.
pub fn check_normalisation(distribution: &StationaryDistribution, tolerance: f64) -> f64 {
    let total = distribution.total();
    let within = (total - 1.0).abs() <= tolerance;
    if !within {
        warn!(
            population = distribution.population(),
            total,
            tolerance,
            "stationary distribution does not sum to one"
        );
    }
    total
}

/// Expected number of infected nodes, `Σ π[i]·n_infected[i]`.
///
/// # Examples
/// ```
/// use sisstat_core::expected_infected;
///
/// assert_eq!(expected_infected(&[0.25, 0.75], &[0, 1]), 0.75);
/// ```
#[must_use]
pub fn expected_infected(pi: &[f64], n_infected: &[u32]) -> f64 {
    pi.iter()
        .zip(n_infected)
        .map(|(probability, &infected)| probability * f64::from(infected))
        .sum()
}

/// Probability that a given node is infected: `expected / population`.
#[must_use]
pub fn infection_probability(expected: f64, population: usize) -> f64 {
    expected / population as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    Sequential,
    #[cfg(feature = "parallel")]
    Parallel,
}

impl Backend {
    fn resolve(strategy: ExecutionStrategy, population: usize) -> Result<Self> {
        match strategy {
            ExecutionStrategy::Auto => Ok(Self::auto(population)),
            ExecutionStrategy::Sequential => Ok(Self::Sequential),
            #[cfg(feature = "parallel")]
            ExecutionStrategy::Parallel => Ok(Self::Parallel),
            #[cfg(not(feature = "parallel"))]
            ExecutionStrategy::Parallel => Err(crate::SisError::BackendUnavailable {
                requested: ExecutionStrategy::Parallel,
            }),
        }
    }

    #[cfg(feature = "parallel")]
    const fn auto(population: usize) -> Self {
        if population >= PARALLEL_THRESHOLD {
            Self::Parallel
        } else {
            Self::Sequential
        }
    }

    #[cfg(not(feature = "parallel"))]
    const fn auto(_population: usize) -> Self {
        Self::Sequential
    }

    fn fill<F>(self, pi: &mut [f64], n_infected: &mut [u32], evaluate: F)
    where
        F: Fn(usize) -> (f64, u32) + Sync + Send,
    {
        match self {
            Self::Sequential => {
                for (index, (weight, infected)) in
                    pi.iter_mut().zip(n_infected.iter_mut()).enumerate()
                {
                    (*weight, *infected) = evaluate(index);
                }
            }
            #[cfg(feature = "parallel")]
            Self::Parallel => {
                pi.par_iter_mut()
                    .zip(n_infected.par_iter_mut())
                    .enumerate()
                    .for_each(|(index, (weight, infected))| {
                        (*weight, *infected) = evaluate(index);
                    });
            }
        }
    }

    fn map_in_place<F>(self, values: &mut [f64], op: F)
    where
        F: Fn(f64) -> f64 + Sync + Send,
    {
        match self {
            Self::Sequential => values.iter_mut().for_each(|value| *value = op(*value)),
            #[cfg(feature = "parallel")]
            Self::Parallel => values.par_iter_mut().for_each(|value| *value = op(*value)),
        }
    }

    fn max(self, values: &[f64]) -> f64 {
        match self {
            Self::Sequential => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            #[cfg(feature = "parallel")]
            Self::Parallel => values
                .par_iter()
                .copied()
                .reduce(|| f64::NEG_INFINITY, f64::max),
        }
    }
}

/// Sums `values` chunk by chunk and then adds the partial sums in chunk order,
/// so the result does not depend on the backend or thread scheduling.
fn chunked_sum(backend: Backend, values: &[f64]) -> f64 {
    let partials: Vec<f64> = match backend {
        Backend::Sequential => values
            .chunks(REDUCTION_CHUNK)
            .map(|chunk| chunk.iter().sum())
            .collect(),
        #[cfg(feature = "parallel")]
        Backend::Parallel => values
            .par_chunks(REDUCTION_CHUNK)
            .map(|chunk| chunk.iter().sum::<f64>())
            .collect(),
    };
    partials.iter().sum()
}
