//! Adjacency structures for contact networks.

use crate::{
    Result,
    configuration::{Configuration, check_population},
    error::SisError,
    topology::Topology,
};

/// Symmetric 0/1 adjacency matrix with an empty diagonal.
///
/// Each row is stored as a neighbour bitmask using the same bit orientation as
/// configuration indices: node `j` occupies bit `N - 1 - j`. The quadratic form
/// `xᵗ·A·x` of a configuration therefore reduces to a popcount per infected
/// node.
///
/// # Examples
/// ```
/// use sisstat_core::{Topology, build_graph};
///
/// let graph = build_graph(3, Topology::Clique)?;
/// assert_eq!(graph.to_dense(), vec![vec![0, 1, 1], vec![1, 0, 1], vec![1, 1, 0]]);
/// assert_eq!(graph.edge_count(), 3);
/// # Ok::<(), sisstat_core::SisError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyMatrix {
    population: usize,
    rows: Vec<usize>,
}

impl AdjacencyMatrix {
    fn clique(population: usize) -> Self {
        let everyone = usize::MAX >> (usize::BITS as usize - population);
        let rows = (0..population)
            .map(|node| everyone & !node_bit(population, node))
            .collect();
        Self { population, rows }
    }

    /// Number of nodes.
    #[must_use]
    pub fn population(&self) -> usize {
        self.population
    }

    /// Whether nodes `i` and `j` share an edge.
    #[must_use]
    pub fn is_adjacent(&self, i: usize, j: usize) -> bool {
        if j >= self.population {
            return false;
        }
        self.rows
            .get(i)
            .is_some_and(|row| row & node_bit(self.population, j) != 0)
    }

    /// Number of neighbours of `node`.
    #[must_use]
    pub fn degree(&self, node: usize) -> u32 {
        self.rows.get(node).map_or(0, |row| row.count_ones())
    }

    /// Number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        let endpoints: usize = self.rows.iter().map(|row| row.count_ones() as usize).sum();
        endpoints / 2
    }

    /// Expands the matrix into nested rows of 0/1 entries.
    #[must_use]
    pub fn to_dense(&self) -> Vec<Vec<u8>> {
        (0..self.population)
            .map(|i| {
                (0..self.population)
                    .map(|j| u8::from(self.is_adjacent(i, j)))
                    .collect()
            })
            .collect()
    }

    /// Evaluates `xᵗ·A·x` for `configuration`. Every infected-infected edge is
    /// counted once from each endpoint, so the result is always even.
    #[must_use]
    pub fn quadratic_form(&self, configuration: &Configuration) -> u64 {
        let infected = configuration.index();
        self.rows
            .iter()
            .enumerate()
            .filter(|&(node, _)| configuration.is_infected(node))
            .map(|(_, row)| u64::from((row & infected).count_ones()))
            .sum()
    }

    /// Number of edges whose endpoints are both infected in `configuration`.
    #[must_use]
    pub fn infected_edges(&self, configuration: &Configuration) -> u64 {
        let form = self.quadratic_form(configuration);
        debug_assert!(form % 2 == 0, "symmetric adjacency yields an even form");
        form / 2
    }
}

const fn node_bit(population: usize, node: usize) -> usize {
    1 << (population - 1 - node)
}

/// Builds the adjacency matrix of `population` nodes arranged as `topology`.
///
/// # Errors
/// Returns [`SisError::UnsupportedTopology`] for anything other than
/// [`Topology::Clique`], and the population errors of
/// [`crate::configuration_count`].
pub fn build_graph(population: usize, topology: Topology) -> Result<AdjacencyMatrix> {
    check_population(population)?;
    match topology {
        Topology::Clique => Ok(AdjacencyMatrix::clique(population)),
        other => Err(SisError::UnsupportedTopology { topology: other }),
    }
}
