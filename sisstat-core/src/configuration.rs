//! Enumeration of susceptible/infected configurations.
//!
//! A configuration of `N` nodes is identified by an index in `[0, 2^N)`. Node
//! `k` is infected iff bit `N - 1 - k` of the index is set, so node 0 maps to
//! the most significant of the `N` bits. Configurations are decoded on demand
//! from the index and never stored as a table.

use crate::{Result, error::SisError};

/// Largest population whose configuration space can be enumerated.
///
/// Neighbour rows and configuration indices are packed into `usize` words and
/// the stationary vectors hold `2^N` entries, which bounds `N` well below the
/// word size.
pub const MAX_POPULATION: usize = if usize::BITS > 32 { 32 } else { 24 };

/// Validates `population` for enumeration.
pub(crate) fn check_population(population: usize) -> Result<()> {
    if population == 0 {
        return Err(SisError::InvalidPopulation { got: population });
    }
    if population > MAX_POPULATION {
        return Err(SisError::PopulationTooLarge {
            population,
            max: MAX_POPULATION,
        });
    }
    Ok(())
}

/// Returns the number of configurations (`2^N`) of a population.
///
/// # Errors
/// Returns [`SisError::InvalidPopulation`] for an empty population and
/// [`SisError::PopulationTooLarge`] above [`MAX_POPULATION`].
///
/// # Examples
/// ```
/// use sisstat_core::configuration_count;
///
/// assert_eq!(configuration_count(3)?, 8);
/// # Ok::<(), sisstat_core::SisError>(())
/// ```
pub fn configuration_count(population: usize) -> Result<usize> {
    check_population(population)?;
    Ok(1_usize << population)
}

/// One assignment of susceptible/infected status to every node.
///
/// # Examples
/// ```
/// use sisstat_core::configuration_of;
///
/// // 010: only node 1 is infected.
/// let x = configuration_of(3, 2)?;
/// assert_eq!(x.to_vec(), vec![0, 1, 0]);
/// assert_eq!(x.infected_count(), 1);
/// # Ok::<(), sisstat_core::SisError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Configuration {
    population: usize,
    index: usize,
}

impl Configuration {
    /// Builds a configuration without range checks; callers guarantee
    /// `index < 2^population`.
    pub(crate) const fn new_unchecked(population: usize, index: usize) -> Self {
        Self { population, index }
    }

    /// Number of nodes.
    #[must_use]
    pub const fn population(&self) -> usize {
        self.population
    }

    /// Canonical index of the configuration.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Returns whether `node` is infected. Nodes outside the population are
    /// reported as susceptible.
    #[must_use]
    pub const fn is_infected(&self, node: usize) -> bool {
        if node >= self.population {
            return false;
        }
        (self.index >> (self.population - 1 - node)) & 1 == 1
    }

    /// Number of infected nodes.
    #[must_use]
    pub const fn infected_count(&self) -> u32 {
        self.index.count_ones()
    }

    /// Iterates node states in node order, yielding `1` for infected nodes.
    pub fn bits(&self) -> impl Iterator<Item = u8> + '_ {
        (0..self.population).map(|node| u8::from(self.is_infected(node)))
    }

    /// Materialises the configuration vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        self.bits().collect()
    }
}

/// Decodes configuration `index` of a population of `population` nodes.
///
/// # Errors
/// Returns [`SisError::ConfigurationOutOfRange`] when `index >= 2^population`
/// and the population errors of [`configuration_count`].
pub fn configuration_of(population: usize, index: usize) -> Result<Configuration> {
    let count = configuration_count(population)?;
    if index >= count {
        return Err(SisError::ConfigurationOutOfRange { index, count });
    }
    Ok(Configuration::new_unchecked(population, index))
}

/// Iterates every configuration of a population in index order.
///
/// # Errors
/// Returns the population errors of [`configuration_count`].
///
/// # Examples
/// ```
/// use sisstat_core::configurations;
///
/// let counts: Vec<u32> = configurations(2)?.map(|x| x.infected_count()).collect();
/// assert_eq!(counts, vec![0, 1, 1, 2]);
/// # Ok::<(), sisstat_core::SisError>(())
/// ```
pub fn configurations(
    population: usize,
) -> Result<impl ExactSizeIterator<Item = Configuration> + DoubleEndedIterator> {
    let count = configuration_count(population)?;
    Ok((0..count).map(move |index| Configuration::new_unchecked(population, index)))
}
