//! Command implementations and argument parsing for the sisstat CLI.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use sisstat_core::{
    DEFAULT_DRIFT_TOLERANCE, ExecutionStrategy, ModelParameters, ModelRates, ParameterFileError,
    PopulationResult, SisError, SisErrorCode, SolverBuilder, StationarySolver, SweepError,
    Topology, ValidationError, ValidationReport, compare, read_model_output,
    read_simulation_output, run_sweep,
};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "sisstat",
    about = "Exact stationary infection probabilities for the SIS model."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Sweep the population sizes named in a parameter file.
    Sweep(SweepCommand),
    /// Solve a single population.
    Solve(SolveCommand),
    /// Compare sweep output against simulator confidence intervals.
    Validate(ValidateCommand),
}

/// Options accepted by the `sweep` command.
#[derive(Debug, Args, Clone)]
pub struct SweepCommand {
    /// Twelve-line parameter file.
    #[arg(long)]
    pub params: PathBuf,

    /// Result file (defaults to `validation_<base>` next to the parameter file).
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Scheduling of the configuration loop.
    #[arg(long, value_enum, default_value_t = StrategyArg::Auto)]
    pub strategy: StrategyArg,

    /// Tolerated deviation of the distribution total from one.
    #[arg(long, default_value_t = DEFAULT_DRIFT_TOLERANCE)]
    pub tolerance: f64,
}

/// Options accepted by the `solve` command.
#[derive(Debug, Args, Clone)]
pub struct SolveCommand {
    /// Number of nodes.
    #[arg(long)]
    pub population: usize,

    /// Endogenous infection weight per infected-infected edge.
    #[arg(long)]
    pub gamma: f64,

    /// Exogenous infection budget shared by all nodes.
    #[arg(long)]
    pub c: f64,

    /// Cure rate.
    #[arg(long)]
    pub mu: f64,

    /// Network topology.
    #[arg(long, value_enum, default_value_t = TopologyArg::Clique)]
    pub topology: TopologyArg,

    /// Scheduling of the configuration loop.
    #[arg(long, value_enum, default_value_t = StrategyArg::Auto)]
    pub strategy: StrategyArg,
}

/// Options accepted by the `validate` command.
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Parameter file used for the sweep.
    #[arg(long)]
    pub params: PathBuf,

    /// Simulator output (defaults to `<base>` next to the parameter file).
    #[arg(long)]
    pub simulation: Option<PathBuf>,

    /// Sweep output (defaults to `validation_<base>` next to the parameter file).
    #[arg(long)]
    pub model: Option<PathBuf>,
}

/// Execution strategies selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Pick a backend from the population size.
    Auto,
    /// Always run on the calling thread.
    Sequential,
    /// Always run on the rayon thread pool.
    Parallel,
}

impl From<StrategyArg> for ExecutionStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Auto => Self::Auto,
            StrategyArg::Sequential => Self::Sequential,
            StrategyArg::Parallel => Self::Parallel,
        }
    }
}

/// Topologies selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TopologyArg {
    /// Every pair of nodes is adjacent.
    Clique,
    /// One hub adjacent to every other node.
    Star,
    /// Nodes arranged in a ring.
    Circular,
}

impl From<TopologyArg> for Topology {
    fn from(value: TopologyArg) -> Self {
        match value {
            TopologyArg::Clique => Self::Clique,
            TopologyArg::Star => Self::Star,
            TopologyArg::Circular => Self::Circular,
        }
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// A result file could not be created.
    #[error("failed to create `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The parameter file could not be read.
    #[error(transparent)]
    Parameters(#[from] ParameterFileError),
    /// The sweep stopped early.
    #[error(transparent)]
    Sweep(#[from] SweepError),
    /// Solver configuration or a single solve failed.
    #[error(transparent)]
    Core(#[from] SisError),
    /// Result files could not be compared.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// At least one population fell outside the simulator's interval.
    #[error("{failed} of {total} populations fall outside the simulation interval")]
    ValidationFailed {
        /// Number of failing populations.
        failed: usize,
        /// Number of compared populations.
        total: usize,
    },
}

impl CliError {
    /// Stable code of the core failure behind this error, if any.
    #[must_use]
    pub fn core_code(&self) -> Option<SisErrorCode> {
        match self {
            Self::Core(err) => Some(err.code()),
            Self::Sweep(err) => err.core_code(),
            _ => None,
        }
    }
}

/// Outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub enum ExecutionSummary {
    /// Rows written by a sweep.
    Sweep {
        /// Result file that was written.
        output: PathBuf,
        /// One entry per population.
        rows: Vec<PopulationResult>,
    },
    /// Result of a single solve.
    Solve(PopulationResult),
    /// Per-population comparison against the simulator.
    Validate(ValidationReport),
}

impl ExecutionSummary {
    /// Returns the error describing a failed validation, if any population
    /// failed.
    #[must_use]
    pub fn failure(&self) -> Option<CliError> {
        match self {
            Self::Validate(report) if report.failed() > 0 => Some(CliError::ValidationFailed {
                failed: report.failed(),
                total: report.entries().len(),
            }),
            _ => None,
        }
    }
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when reading inputs, solving, or writing results fails.
///
/// # Examples
/// ```
/// use sisstat_cli::cli::{Cli, Command, ExecutionSummary, SolveCommand, StrategyArg, TopologyArg, run_cli};
///
/// let cli = Cli {
///     command: Command::Solve(SolveCommand {
///         population: 3,
///         gamma: 1.0,
///         c: 1.0,
///         mu: 1.0,
///         topology: TopologyArg::Clique,
///         strategy: StrategyArg::Sequential,
///     }),
/// };
/// let ExecutionSummary::Solve(result) = run_cli(cli)? else {
///     unreachable!("solve returns a single result");
/// };
/// assert_eq!(result.configurations, 8);
/// # Ok::<(), sisstat_cli::cli::CliError>(())
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    let span = Span::current();
    match cli.command {
        Command::Sweep(command) => {
            span.record("command", field::display("sweep"));
            run_sweep_command(command)
        }
        Command::Solve(command) => {
            span.record("command", field::display("solve"));
            run_solve_command(command)
        }
        Command::Validate(command) => {
            span.record("command", field::display("validate"));
            run_validate_command(command)
        }
    }
}

fn solver(strategy: StrategyArg, tolerance: f64) -> Result<StationarySolver, CliError> {
    Ok(SolverBuilder::new()
        .with_execution_strategy(strategy.into())
        .with_drift_tolerance(tolerance)
        .build()?)
}

#[instrument(
    name = "cli.sweep",
    err,
    skip(command),
    fields(params = field::Empty, output = field::Empty),
)]
pub(super) fn run_sweep_command(command: SweepCommand) -> Result<ExecutionSummary, CliError> {
    let span = Span::current();
    span.record("params", field::display(command.params.display()));
    let params = ModelParameters::from_path(&command.params)?;
    let plan = params.sweep_plan()?;
    let solver = solver(command.strategy, command.tolerance)?;

    let output = command
        .output
        .unwrap_or_else(|| beside(&command.params, &params.model_output_file_name()));
    span.record("output", field::display(output.display()));
    let file = File::create(&output).map_err(|source| CliError::Io {
        path: output.clone(),
        source,
    })?;

    let report = run_sweep(&solver, &plan, BufWriter::new(file))?;
    info!(rows = report.rows.len(), "sweep written");
    Ok(ExecutionSummary::Sweep {
        output,
        rows: report.rows,
    })
}

#[instrument(
    name = "cli.solve",
    err,
    skip(command),
    fields(population = command.population),
)]
pub(super) fn run_solve_command(command: SolveCommand) -> Result<ExecutionSummary, CliError> {
    let model = ModelRates::new(command.gamma, command.c, command.mu)?;
    let solver = solver(command.strategy, DEFAULT_DRIFT_TOLERANCE)?;
    let result = solver.solve_population(command.population, command.topology.into(), &model)?;
    Ok(ExecutionSummary::Solve(result))
}

#[instrument(
    name = "cli.validate",
    err,
    skip(command),
    fields(model = field::Empty, simulation = field::Empty),
)]
pub(super) fn run_validate_command(
    command: ValidateCommand,
) -> Result<ExecutionSummary, CliError> {
    let params = ModelParameters::from_path(&command.params)?;
    let model_path = command
        .model
        .unwrap_or_else(|| beside(&command.params, &params.model_output_file_name()));
    let simulation_path = command
        .simulation
        .unwrap_or_else(|| beside(&command.params, params.simulation_output_file_name()));
    let span = Span::current();
    span.record("model", field::display(model_path.display()));
    span.record("simulation", field::display(simulation_path.display()));

    let model = read_model_output(&model_path)?;
    let simulation = read_simulation_output(&simulation_path)?;
    let report = compare(&model, &simulation)?;
    info!(
        passed = report.passed(),
        failed = report.failed(),
        "validation completed"
    );
    Ok(ExecutionSummary::Validate(report))
}

/// Path of `name` in the directory holding `params`.
pub(super) fn beside(params: &Path, name: &str) -> PathBuf {
    params
        .parent()
        .map_or_else(|| PathBuf::from(name), |dir| dir.join(name))
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// use sisstat_cli::cli::{ExecutionSummary, render_summary};
/// use sisstat_core::PopulationResult;
///
/// let summary = ExecutionSummary::Solve(PopulationResult {
///     population: 2,
///     lambda: 0.5,
///     expected_infected: 0.5,
///     probability: 0.25,
///     distribution_total: 1.0,
///     configurations: 4,
/// });
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer)?;
/// let text = String::from_utf8(buffer).expect("summary is utf-8");
/// assert!(text.contains("probability: 0.25000"));
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    match summary {
        ExecutionSummary::Sweep { output, rows } => {
            writeln!(writer, "output: {}", output.display())?;
            for row in rows {
                writeln!(writer, "{row}")?;
            }
        }
        ExecutionSummary::Solve(result) => {
            writeln!(writer, "nodes: {}", result.population)?;
            writeln!(writer, "configurations: {}", result.configurations)?;
            writeln!(writer, "lambda: {:.5}", result.lambda)?;
            writeln!(writer, "expected infected: {:.5}", result.expected_infected)?;
            writeln!(writer, "probability: {:.5}", result.probability)?;
        }
        ExecutionSummary::Validate(report) => {
            for entry in report.entries() {
                let verdict = if entry.passed { "pass" } else { "FAIL" };
                writeln!(
                    writer,
                    "N={} model={:.5} interval=[{:.5}, {:.5}] {verdict}",
                    entry.population, entry.model_probability, entry.lower, entry.upper
                )?;
            }
            let (passed, failed) = report
                .pass_rate()
                .map_or((0.0, 0.0), |rate| (rate * 100.0, (1.0 - rate) * 100.0));
            writeln!(writer, "passed: {} ({passed:.2}%)", report.passed())?;
            writeln!(writer, "failed: {} ({failed:.2}%)", report.failed())?;
        }
    }
    Ok(())
}
