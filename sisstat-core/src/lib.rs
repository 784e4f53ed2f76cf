//! Exact stationary analysis of the SIS epidemic model on small networks.
//!
//! Every subset of infected nodes is weighted in closed form, the weights are
//! normalised into the stationary distribution, and the distribution is reduced
//! to the probability that a randomly chosen node is infected. A sweep repeats
//! this over a range of population sizes and writes one row per population.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod configuration;
mod error;
mod graph;
mod output;
mod params;
mod rates;
mod result;
mod solver;
mod stationary;
mod sweep;
mod topology;
mod validation;

pub use crate::{
    configuration::{
        Configuration, MAX_POPULATION, configuration_count, configuration_of, configurations,
    },
    error::{
        ParameterFileError, Result, SisError, SisErrorCode, SweepError, ValidationError,
    },
    graph::{AdjacencyMatrix, build_graph},
    output::{PROBABILITY_PRECISION, ResultWriter, format_header, format_row},
    params::{MODEL_OUTPUT_PREFIX, ModelParameters, PARAMETER_LINES},
    rates::{ModelRates, Rates},
    result::PopulationResult,
    solver::{ExecutionStrategy, SolverBuilder, StationarySolver},
    stationary::{
        DEFAULT_DRIFT_TOLERANCE, PARALLEL_THRESHOLD, StationaryDistribution,
        check_normalisation, compute_distribution, expected_infected, infection_probability,
    },
    sweep::{SweepPlan, SweepReport, SweepState, run_sweep},
    topology::{CustomCode, Topology},
    validation::{
        ModelRow, SimulationRow, ValidationEntry, ValidationReport, compare,
        parse_model_output, parse_simulation_output, read_model_output,
        read_simulation_output,
    },
};
