//! Result file written by the sweep driver.
//!
//! The first line echoes the endogenous weight `γ`; every further line holds
//! `"<N> <probability>"` with the probability printed to five decimal places.

use std::io::{self, Write};

/// Number of decimal places used for infection probabilities.
pub const PROBABILITY_PRECISION: usize = 5;

const PLAIN_HEADER_RANGE: core::ops::Range<f64> = 1e-4..1e16;

/// Formats the header line echoing `gamma`. Magnitudes outside
/// `[1e-4, 1e16)` switch to exponent form.
///
/// # Examples
/// ```
/// use sisstat_core::format_header;
///
/// assert_eq!(format_header(1.1), "1.1");
/// assert_eq!(format_header(1e300), "1e300");
/// ```
#[must_use]
pub fn format_header(gamma: f64) -> String {
    if gamma == 0.0 || PLAIN_HEADER_RANGE.contains(&gamma.abs()) {
        format!("{gamma}")
    } else {
        format!("{gamma:e}")
    }
}

/// Formats one result row.
///
/// # Examples
/// ```
/// use sisstat_core::format_row;
///
/// assert_eq!(format_row(4, 0.123456), "4 0.12346");
/// assert_eq!(format_row(10, 1.0), "10 1.00000");
/// ```
#[must_use]
pub fn format_row(population: usize, probability: f64) -> String {
    format!(
        "{population} {probability:.precision$}",
        precision = PROBABILITY_PRECISION
    )
}

/// Line-oriented writer for result files.
///
/// # Examples
/// ```
/// use sisstat_core::ResultWriter;
///
/// let mut writer = ResultWriter::new(Vec::new());
/// writer.write_header(1.1)?;
/// writer.write_row(2, 0.5)?;
/// let bytes = writer.finish()?;
/// assert_eq!(String::from_utf8(bytes).unwrap(), "1.1\n2 0.50000\n");
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct ResultWriter<W: Write> {
    inner: W,
    rows: usize,
}

impl<W: Write> ResultWriter<W> {
    /// Wraps `inner`.
    pub fn new(inner: W) -> Self {
        Self { inner, rows: 0 }
    }

    /// Writes the header line.
    ///
    /// # Errors
    /// Returns any error raised by the underlying writer.
    pub fn write_header(&mut self, gamma: f64) -> io::Result<()> {
        writeln!(self.inner, "{}", format_header(gamma))
    }

    /// Appends one result row.
    ///
    /// # Errors
    /// Returns any error raised by the underlying writer.
    pub fn write_row(&mut self, population: usize, probability: f64) -> io::Result<()> {
        writeln!(self.inner, "{}", format_row(population, probability))?;
        self.rows += 1;
        Ok(())
    }

    /// Number of data rows written so far.
    #[must_use]
    pub fn rows_written(&self) -> usize {
        self.rows
    }

    /// Flushes and returns the underlying writer.
    ///
    /// # Errors
    /// Returns any error raised while flushing.
    pub fn finish(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(1.0, "1")]
    #[case(1.1, "1.1")]
    #[case(0.0, "0")]
    #[case(0.0001, "0.0001")]
    #[case(12_345.5, "12345.5")]
    #[case(1e-7, "1e-7")]
    #[case(1.5e20, "1.5e20")]
    #[case(1e300, "1e300")]
    fn header_echoes_gamma(#[case] gamma: f64, #[case] expected: &str) {
        assert_eq!(format_header(gamma), expected);
    }

    #[rstest]
    #[case(2, 0.0, "2 0.00000")]
    #[case(6, 0.999_996, "6 1.00000")]
    #[case(30, 0.333_333_3, "30 0.33333")]
    fn rows_use_five_decimals(
        #[case] population: usize,
        #[case] probability: f64,
        #[case] expected: &str,
    ) {
        assert_eq!(format_row(population, probability), expected);
    }

    #[rstest]
    fn counts_rows() -> io::Result<()> {
        let mut writer = ResultWriter::new(Vec::new());
        writer.write_header(2.0)?;
        writer.write_row(1, 0.1)?;
        writer.write_row(2, 0.2)?;
        assert_eq!(writer.rows_written(), 2);
        let text = String::from_utf8_lossy(&writer.finish()?).into_owned();
        assert_eq!(text.lines().count(), 3);
        Ok(())
    }
}
