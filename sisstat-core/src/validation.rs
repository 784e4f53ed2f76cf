//! Comparison of exact model output against stochastic simulation output.
//!
//! Both files start with a header line that is skipped. Model rows read
//! `"<N> <probability>"`; simulator rows read
//! `"<N> <lower> <upper> ..."`, where `[lower, upper]` is the simulator's
//! confidence interval. A population passes when the model probability lies
//! inside that interval.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    str::FromStr,
};

use tracing::{debug, instrument};

use crate::error::ValidationError;

/// One data row of the model's result file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelRow {
    /// Population size.
    pub population: usize,
    /// Exact infection probability.
    pub probability: f64,
}

/// One data row of the simulator's result file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationRow {
    /// Population size.
    pub population: usize,
    /// Lower end of the confidence interval.
    pub lower: f64,
    /// Upper end of the confidence interval.
    pub upper: f64,
}

/// Outcome for one population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationEntry {
    /// Population size.
    pub population: usize,
    /// Lower end of the simulator's confidence interval.
    pub lower: f64,
    /// Upper end of the simulator's confidence interval.
    pub upper: f64,
    /// Exact model probability.
    pub model_probability: f64,
    /// Whether the model probability lies inside the interval.
    pub passed: bool,
}

/// Per-population comparison results.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationReport {
    entries: Vec<ValidationEntry>,
}

impl ValidationReport {
    /// Entries in model-file order.
    #[must_use]
    pub fn entries(&self) -> &[ValidationEntry] {
        &self.entries
    }

    /// Number of populations inside the confidence interval.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.entries.iter().filter(|entry| entry.passed).count()
    }

    /// Number of populations outside the confidence interval.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.entries.len() - self.passed()
    }

    /// Fraction of populations that passed, or `None` without data rows.
    #[must_use]
    pub fn pass_rate(&self) -> Option<f64> {
        if self.entries.is_empty() {
            return None;
        }
        Some(self.passed() as f64 / self.entries.len() as f64)
    }

    /// Whether every population passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.entries.iter().all(|entry| entry.passed)
    }
}

/// Reads the model's result file at `path`.
///
/// # Errors
/// Returns [`ValidationError::Io`] when the file cannot be opened and the
/// errors of [`parse_model_output`].
pub fn read_model_output(path: &Path) -> Result<Vec<ModelRow>, ValidationError> {
    parse_model_output(open(path)?)
}

/// Reads the simulator's result file at `path`.
///
/// # Errors
/// Returns [`ValidationError::Io`] when the file cannot be opened and the
/// errors of [`parse_simulation_output`].
pub fn read_simulation_output(path: &Path) -> Result<Vec<SimulationRow>, ValidationError> {
    parse_simulation_output(open(path)?)
}

fn open(path: &Path) -> Result<BufReader<File>, ValidationError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| ValidationError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Parses model rows, skipping the header and blank lines.
///
/// # Errors
/// Returns [`ValidationError::Malformed`] for rows without a population and a
/// probability, and [`ValidationError::Read`] on I/O failure.
///
/// # Examples
/// ```
/// use sisstat_core::parse_model_output;
///
/// let rows = parse_model_output("1.1\n2 0.25000\n4 0.50000\n".as_bytes())?;
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[1].population, 4);
/// # Ok::<(), sisstat_core::ValidationError>(())
/// ```
pub fn parse_model_output<R: BufRead>(reader: R) -> Result<Vec<ModelRow>, ValidationError> {
    data_rows(reader, |line, fields| {
        Ok(ModelRow {
            population: field(line, fields, 0, "population")?,
            probability: field(line, fields, 1, "probability")?,
        })
    })
}

/// Parses simulator rows, skipping the header and blank lines. Columns past
/// the interval bounds are ignored.
///
/// # Errors
/// Returns [`ValidationError::Malformed`] for rows without a population and
/// both interval bounds, and [`ValidationError::Read`] on I/O failure.
pub fn parse_simulation_output<R: BufRead>(
    reader: R,
) -> Result<Vec<SimulationRow>, ValidationError> {
    data_rows(reader, |line, fields| {
        Ok(SimulationRow {
            population: field(line, fields, 0, "population")?,
            lower: field(line, fields, 1, "lower bound")?,
            upper: field(line, fields, 2, "upper bound")?,
        })
    })
}

fn data_rows<R, T, F>(reader: R, parse: F) -> Result<Vec<T>, ValidationError>
where
    R: BufRead,
    F: Fn(usize, &[&str]) -> Result<T, ValidationError>,
{
    let mut rows = Vec::new();
    for (offset, line) in reader.lines().enumerate().skip(1) {
        let number = offset + 1;
        let text = line.map_err(|source| ValidationError::Read {
            line: number,
            source,
        })?;
        let fields: Vec<&str> = text.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        rows.push(parse(number, &fields)?);
    }
    Ok(rows)
}

fn field<T: FromStr>(
    line: usize,
    fields: &[&str],
    position: usize,
    name: &str,
) -> Result<T, ValidationError> {
    let raw = fields.get(position).ok_or_else(|| ValidationError::Malformed {
        line,
        reason: format!("missing {name}"),
    })?;
    raw.parse().map_err(|_| ValidationError::Malformed {
        line,
        reason: format!("invalid {name} `{raw}`"),
    })
}

/// Compares every model row against the simulator row for the same
/// population.
///
/// # Errors
/// Returns [`ValidationError::MissingSimulationRow`] when the simulator has
/// no row for a model population.
///
/// # Examples
/// ```
/// use sisstat_core::{ModelRow, SimulationRow, compare};
///
/// let model = [ModelRow { population: 5, probability: 0.4 }];
/// let simulation = [SimulationRow { population: 5, lower: 0.35, upper: 0.45 }];
/// let report = compare(&model, &simulation)?;
/// assert!(report.all_passed());
/// # Ok::<(), sisstat_core::ValidationError>(())
/// ```
#[instrument(
    name = "core.validate",
    err,
    skip_all,
    fields(model_rows = model.len(), simulation_rows = simulation.len()),
)]
pub fn compare(
    model: &[ModelRow],
    simulation: &[SimulationRow],
) -> Result<ValidationReport, ValidationError> {
    let intervals: BTreeMap<usize, &SimulationRow> = simulation
        .iter()
        .map(|row| (row.population, row))
        .collect();

    let entries = model
        .iter()
        .map(|row| {
            let interval = intervals.get(&row.population).ok_or(
                ValidationError::MissingSimulationRow {
                    population: row.population,
                },
            )?;
            let passed = interval.lower <= row.probability && row.probability <= interval.upper;
            debug!(
                population = row.population,
                passed, "compared population against simulation"
            );
            Ok(ValidationEntry {
                population: row.population,
                lower: interval.lower,
                upper: interval.upper,
                model_probability: row.probability,
                passed,
            })
        })
        .collect::<Result<Vec<_>, ValidationError>>()?;

    Ok(ValidationReport { entries })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn skips_header_and_blank_lines() -> Result<(), ValidationError> {
        let rows = parse_simulation_output("Gamma 1.1\n5 0.1 0.2 0.15\n\n10 0.3 0.4\n".as_bytes())?;
        assert_eq!(
            rows,
            vec![
                SimulationRow {
                    population: 5,
                    lower: 0.1,
                    upper: 0.2
                },
                SimulationRow {
                    population: 10,
                    lower: 0.3,
                    upper: 0.4
                },
            ]
        );
        Ok(())
    }

    #[rstest]
    #[case::missing_probability("1\n4\n", 2, "missing probability")]
    #[case::bad_population("1\nfour 0.5\n", 2, "invalid population `four`")]
    fn reports_malformed_model_rows(
        #[case] text: &str,
        #[case] expected_line: usize,
        #[case] expected_reason: &str,
    ) {
        let err = parse_model_output(text.as_bytes()).expect_err("row must be rejected");
        match err {
            ValidationError::Malformed { line, reason } => {
                assert_eq!(line, expected_line);
                assert_eq!(reason, expected_reason);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[rstest]
    #[case(0.2, true)]
    #[case(0.1, true)]
    #[case(0.3, true)]
    #[case(0.05, false)]
    #[case(0.35, false)]
    fn interval_bounds_are_inclusive(#[case] probability: f64, #[case] expected: bool) {
        let model = [ModelRow {
            population: 3,
            probability,
        }];
        let simulation = [SimulationRow {
            population: 3,
            lower: 0.1,
            upper: 0.3,
        }];
        let report = compare(&model, &simulation).expect("row is present");
        assert_eq!(report.all_passed(), expected);
    }

    #[rstest]
    fn pass_rate_counts_data_rows_only() {
        let model = [
            ModelRow {
                population: 2,
                probability: 0.5,
            },
            ModelRow {
                population: 4,
                probability: 0.9,
            },
        ];
        let simulation = [
            SimulationRow {
                population: 4,
                lower: 0.1,
                upper: 0.2,
            },
            SimulationRow {
                population: 2,
                lower: 0.4,
                upper: 0.6,
            },
        ];
        let report = compare(&model, &simulation).expect("rows are present");
        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.pass_rate(), Some(0.5));
        assert_eq!(report.entries()[0].population, 2);
    }

    #[rstest]
    fn missing_population_is_an_error() {
        let model = [ModelRow {
            population: 8,
            probability: 0.5,
        }];
        let err = compare(&model, &[]).expect_err("simulation lacks N=8");
        assert!(matches!(
            err,
            ValidationError::MissingSimulationRow { population: 8 }
        ));
    }

    #[rstest]
    fn empty_report_has_no_pass_rate() {
        assert_eq!(ValidationReport::default().pass_rate(), None);
    }
}
