//! Command-line interface orchestration for sisstat.
//!
//! `sweep` turns a parameter file into a result file, `solve` reports a single
//! population, and `validate` checks a sweep's result file against the
//! stochastic simulator's confidence intervals.

mod commands;

pub use commands::{
    Cli, CliError, Command, ExecutionSummary, SolveCommand, StrategyArg, SweepCommand,
    TopologyArg, ValidateCommand, render_summary, run_cli,
};

#[cfg(test)]
mod test_helpers;
