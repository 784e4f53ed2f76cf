//! Plain-text parameter files shared with the stochastic simulator.
//!
//! The file holds one value per line at fixed positions:
//!
//! | Line | Field |
//! |------|-------|
//! | 1 | `γ` (float) |
//! | 2 | `c` (float) |
//! | 3 | `μ` (float) |
//! | 4 | first population (integer) |
//! | 5 | last population (integer) |
//! | 6 | population increment (integer) |
//! | 7-8 | reserved |
//! | 9 | topology code (integer) |
//! | 10-11 | reserved |
//! | 12 | output file base name |

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    str::FromStr,
};

use crate::{
    error::{ParameterFileError, SisError},
    rates::ModelRates,
    sweep::SweepPlan,
    topology::Topology,
};

/// Number of lines in a complete parameter file.
pub const PARAMETER_LINES: usize = 12;

/// Prefix the validation step expects on the model's result file.
pub const MODEL_OUTPUT_PREFIX: &str = "validation_";

/// Values read from a parameter file.
///
/// Numeric fields are kept as read; [`ModelParameters::sweep_plan`] performs
/// the range checks.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParameters {
    /// Endogenous infection weight.
    pub gamma: f64,
    /// Total exogenous infection budget.
    pub c: f64,
    /// Cure rate.
    pub mu: f64,
    /// First population of the sweep.
    pub start_population: i64,
    /// Last population of the sweep (inclusive).
    pub max_population: i64,
    /// Step between consecutive populations.
    pub increment: i64,
    /// Network topology.
    pub topology: Topology,
    /// Base name of the simulator's output file.
    pub output_name: String,
}

impl ModelParameters {
    /// Opens and parses the parameter file at `path`.
    ///
    /// # Errors
    /// Returns [`ParameterFileError::Io`] when the file cannot be opened and
    /// the errors of [`ModelParameters::from_reader`].
    pub fn from_path(path: &Path) -> Result<Self, ParameterFileError> {
        let file = File::open(path).map_err(|source| ParameterFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parses a parameter file from `reader`. Lines past the twelfth are
    /// ignored.
    ///
    /// # Errors
    /// Returns [`ParameterFileError::MissingLine`] when the input is shorter
    /// than twelve lines, [`ParameterFileError::InvalidValue`] when a field
    /// does not parse, and [`ParameterFileError::Read`] on I/O failure.
    ///
    /// # Examples
    /// ```
    /// use sisstat_core::{ModelParameters, Topology};
    ///
    /// let text = "1.1\n10\n1\n5\n60\n5\n0.1\n1\n1\n0\n0\nsim.csv\n";
    /// let params = ModelParameters::from_reader(text.as_bytes())?;
    /// assert_eq!(params.gamma, 1.1);
    /// assert_eq!(params.topology, Topology::Clique);
    /// assert_eq!(params.model_output_file_name(), "validation_sim.csv");
    /// # Ok::<(), sisstat_core::ParameterFileError>(())
    /// ```
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, ParameterFileError> {
        let mut lines = Vec::with_capacity(PARAMETER_LINES);
        for (offset, line) in reader.lines().take(PARAMETER_LINES).enumerate() {
            let text = line.map_err(|source| ParameterFileError::Read {
                line: offset + 1,
                source,
            })?;
            lines.push(text);
        }
        let file = ParameterLines(lines);

        Ok(Self {
            gamma: file.parse(1, "gamma")?,
            c: file.parse(2, "c")?,
            mu: file.parse(3, "mu")?,
            start_population: file.parse(4, "start_pop")?,
            max_population: file.parse(5, "max_pop")?,
            increment: file.parse(6, "increment")?,
            topology: Topology::from_code(file.parse(9, "topology")?),
            output_name: file.text(12, "output")?.to_owned(),
        })
    }

    /// Validates the numeric fields and derives the sweep plan.
    ///
    /// # Errors
    /// Returns [`SisError::InvalidRate`] for unusable rates and
    /// [`SisError::InvalidSweepBound`] when the first population or the
    /// increment is below one.
    pub fn sweep_plan(&self) -> Result<SweepPlan, SisError> {
        let model = ModelRates::new(self.gamma, self.c, self.mu)?;
        SweepPlan::new(
            model,
            self.start_population,
            self.max_population,
            self.increment,
            self.topology,
        )
    }

    /// File name the model's results are written to.
    #[must_use]
    pub fn model_output_file_name(&self) -> String {
        format!("{MODEL_OUTPUT_PREFIX}{}", self.output_name)
    }

    /// File name of the simulator's results.
    #[must_use]
    pub fn simulation_output_file_name(&self) -> &str {
        &self.output_name
    }
}

struct ParameterLines(Vec<String>);

impl ParameterLines {
    fn text(&self, line: usize, field: &'static str) -> Result<&str, ParameterFileError> {
        let raw = self
            .0
            .get(line - 1)
            .ok_or(ParameterFileError::MissingLine { line, field })?
            .trim();
        if raw.is_empty() {
            return Err(ParameterFileError::InvalidValue {
                line,
                field,
                value: String::new(),
            });
        }
        Ok(raw)
    }

    fn parse<T: FromStr>(
        &self,
        line: usize,
        field: &'static str,
    ) -> Result<T, ParameterFileError> {
        let raw = self.text(line, field)?;
        raw.parse().map_err(|_| ParameterFileError::InvalidValue {
            line,
            field,
            value: raw.to_owned(),
        })
    }
}
