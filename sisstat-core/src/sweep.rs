//! Population sweep driver.
//!
//! The driver walks population sizes from the first to the last in fixed
//! increments, solves each one independently and appends one row per
//! population to the result file. Any failure stops the whole sweep: later
//! populations are never attempted, and the rows already written stay in the
//! flushed output.

use std::{
    fmt,
    io::{self, Write},
    num::NonZeroUsize,
};

use tracing::{error, info, instrument};

use crate::{
    Result,
    error::{SisError, SweepError},
    output::ResultWriter,
    rates::ModelRates,
    result::PopulationResult,
    solver::StationarySolver,
    topology::Topology,
};

/// Validated description of a population sweep.
///
/// # Examples
/// ```
/// use sisstat_core::{ModelRates, SweepPlan, Topology};
///
/// let model = ModelRates::new(1.0, 1.0, 1.0)?;
/// let plan = SweepPlan::new(model, 2, 6, 2, Topology::Clique)?;
/// assert_eq!(plan.populations().collect::<Vec<_>>(), vec![2, 4, 6]);
/// # Ok::<(), sisstat_core::SisError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SweepPlan {
    model: ModelRates,
    start: usize,
    max: usize,
    increment: NonZeroUsize,
    topology: Topology,
}

impl SweepPlan {
    /// Validates the sweep bounds. A last population below the first yields an
    /// empty sweep.
    ///
    /// # Errors
    /// Returns [`SisError::InvalidSweepBound`] when `start` or `increment` is
    /// below one.
    pub fn new(
        model: ModelRates,
        start: i64,
        max: i64,
        increment: i64,
        topology: Topology,
    ) -> Result<Self> {
        let start = positive("start_pop", start)?;
        let increment = positive("increment", increment)?;
        let max = usize::try_from(max).unwrap_or(0);
        Ok(Self {
            model,
            start: start.get(),
            max,
            increment,
            topology,
        })
    }

    /// Rates shared by every population.
    #[must_use]
    pub fn model(&self) -> &ModelRates {
        &self.model
    }

    /// First population.
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Last population (inclusive).
    #[must_use]
    pub fn max(&self) -> usize {
        self.max
    }

    /// Step between populations.
    #[must_use]
    pub fn increment(&self) -> NonZeroUsize {
        self.increment
    }

    /// Topology of every population.
    #[must_use]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Populations visited by the sweep, in increasing order.
    pub fn populations(&self) -> impl Iterator<Item = usize> {
        (self.start..=self.max).step_by(self.increment.get())
    }
}

fn positive(name: &'static str, value: i64) -> Result<NonZeroUsize> {
    usize::try_from(value)
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or(SisError::InvalidSweepBound { name, got: value })
}

/// Lifecycle of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepState {
    /// Output opened, header not yet confirmed.
    Init,
    /// Solving the given population.
    Running(usize),
    /// Stopped early after a failure.
    Aborted,
    /// Every population was written.
    Done,
}

impl fmt::Display for SweepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => f.write_str("init"),
            Self::Running(population) => write!(f, "running({population})"),
            Self::Aborted => f.write_str("aborted"),
            Self::Done => f.write_str("done"),
        }
    }
}

/// Rows produced by a completed sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepReport {
    /// One entry per population, in sweep order.
    pub rows: Vec<PopulationResult>,
    /// State the driver finished in.
    pub final_state: SweepState,
}

/// Runs `plan`, writing the header and one row per population to `writer`.
///
/// # Errors
/// Returns [`SweepError::Aborted`] when a population cannot be solved (for
/// example an unsupported topology, which aborts before any population is
/// attempted) and [`SweepError::Write`] when the output cannot be written.
///
/// # Examples
/// ```
/// use sisstat_core::{ModelRates, SolverBuilder, SweepPlan, SweepState, Topology, run_sweep};
///
/// let solver = SolverBuilder::new().build()?;
/// let plan = SweepPlan::new(ModelRates::new(1.0, 1.0, 1.0)?, 2, 6, 2, Topology::Clique)?;
/// let mut output = Vec::new();
/// let report = run_sweep(&solver, &plan, &mut output)?;
/// assert_eq!(report.rows.len(), 3);
/// assert_eq!(report.final_state, SweepState::Done);
/// assert_eq!(String::from_utf8(output)?.lines().count(), 4);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[instrument(
    name = "core.sweep",
    err,
    skip_all,
    fields(
        start = plan.start(),
        max = plan.max(),
        increment = plan.increment().get(),
        topology = %plan.topology(),
    ),
)]
pub fn run_sweep<W: Write>(
    solver: &StationarySolver,
    plan: &SweepPlan,
    writer: W,
) -> core::result::Result<SweepReport, SweepError> {
    let mut state = SweepState::Init;
    let mut output = ResultWriter::new(writer);
    output.write_header(plan.model().gamma()).map_err(write_error)?;
    let model = plan.model();
    info!(
        %state,
        gamma = model.gamma(),
        c = model.c(),
        mu = model.mu(),
        "sweep header written"
    );

    if !plan.topology().is_supported() {
        return abort(
            output,
            plan.start(),
            SisError::UnsupportedTopology {
                topology: plan.topology(),
            },
        );
    }

    let mut rows = Vec::new();
    for population in plan.populations() {
        state = SweepState::Running(population);
        info!(%state, "solving population");
        match solver.solve_population(population, plan.topology(), plan.model()) {
            Ok(result) => {
                output
                    .write_row(population, result.probability)
                    .map_err(write_error)?;
                rows.push(result);
            }
            Err(source) => return abort(output, population, source),
        }
    }

    output.finish().map_err(write_error)?;
    state = SweepState::Done;
    info!(%state, rows = rows.len(), "sweep finished");
    Ok(SweepReport {
        rows,
        final_state: state,
    })
}

fn abort<W: Write>(
    output: ResultWriter<W>,
    population: usize,
    source: SisError,
) -> core::result::Result<SweepReport, SweepError> {
    let state = SweepState::Aborted;
    let rows = output.rows_written();
    output.finish().map_err(write_error)?;
    error!(
        %state,
        population,
        rows,
        code = %source.code(),
        "sweep aborted"
    );
    Err(SweepError::Aborted {
        population,
        state,
        source,
    })
}

fn write_error(source: io::Error) -> SweepError {
    SweepError::Write { source }
}
