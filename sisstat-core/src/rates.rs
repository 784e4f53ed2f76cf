//! Rate parameters of the SIS process.

use crate::{Result, error::SisError};

/// Rates driving the stationary weights of one population.
///
/// # Examples
/// ```
/// use sisstat_core::Rates;
///
/// let rates = Rates::for_population(3.0, 1.0, 1.0, 3)?;
/// assert!((rates.lambda() - 1.0).abs() < 1e-12);
/// # Ok::<(), sisstat_core::SisError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rates {
    lambda: f64,
    mu: f64,
    gamma: f64,
}

impl Rates {
    /// Validates and bundles the exogenous infection rate `lambda`, the cure
    /// rate `mu` and the endogenous infection weight `gamma`.
    ///
    /// # Errors
    /// Returns [`SisError::InvalidRate`] when a rate is non-finite, `lambda`
    /// or `gamma` is negative, `mu` is not strictly positive, or `lambda / mu`
    /// overflows.
    pub fn new(lambda: f64, mu: f64, gamma: f64) -> Result<Self> {
        non_negative("lambda", lambda)?;
        non_negative("gamma", gamma)?;
        if !mu.is_finite() || mu <= 0.0 {
            return Err(SisError::InvalidRate {
                name: "mu",
                value: mu,
                reason: "must be finite and strictly positive",
            });
        }
        let ratio = lambda / mu;
        if !ratio.is_finite() {
            return Err(SisError::InvalidRate {
                name: "lambda",
                value: lambda,
                reason: "lambda / mu overflows",
            });
        }
        Ok(Self { lambda, mu, gamma })
    }

    /// Derives the per-node exogenous rate `lambda = c / population` from the
    /// total exogenous budget `c`.
    ///
    /// # Errors
    /// Returns [`SisError::InvalidPopulation`] for an empty population and the
    /// errors of [`Rates::new`].
    pub fn for_population(c: f64, mu: f64, gamma: f64, population: usize) -> Result<Self> {
        if population == 0 {
            return Err(SisError::InvalidPopulation { got: population });
        }
        non_negative("c", c)?;
        Self::new(c / population as f64, mu, gamma)
    }

    /// Exogenous infection rate per node.
    #[must_use]
    pub const fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Cure rate.
    #[must_use]
    pub const fn mu(&self) -> f64 {
        self.mu
    }

    /// Endogenous infection weight per infected-infected edge.
    #[must_use]
    pub const fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Ratio `lambda / mu` raised to the infected-node count in each weight.
    #[must_use]
    pub fn pressure(&self) -> f64 {
        self.lambda / self.mu
    }
}

/// Population-independent rates of a sweep: the endogenous weight `gamma`,
/// the exogenous budget `c` shared by all nodes, and the cure rate `mu`.
///
/// # Examples
/// ```
/// use sisstat_core::ModelRates;
///
/// let model = ModelRates::new(1.1, 10.0, 1.0)?;
/// let rates = model.rates_for(5)?;
/// assert!((rates.lambda() - 2.0).abs() < 1e-12);
/// # Ok::<(), sisstat_core::SisError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelRates {
    gamma: f64,
    c: f64,
    mu: f64,
}

impl ModelRates {
    /// Validates the sweep-wide rates.
    ///
    /// # Errors
    /// Returns [`SisError::InvalidRate`] when `gamma` or `c` is negative or
    /// non-finite, `mu` is not finite and strictly positive, or `c / mu`
    /// overflows. Every population's `lambda / mu` is bounded by `c / mu`.
    pub fn new(gamma: f64, c: f64, mu: f64) -> Result<Self> {
        non_negative("c", c)?;
        Rates::new(0.0, mu, gamma)?;
        if !(c / mu).is_finite() {
            return Err(SisError::InvalidRate {
                name: "c",
                value: c,
                reason: "c / mu overflows",
            });
        }
        Ok(Self { gamma, c, mu })
    }

    /// Endogenous infection weight.
    #[must_use]
    pub const fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Total exogenous infection budget.
    #[must_use]
    pub const fn c(&self) -> f64 {
        self.c
    }

    /// Cure rate.
    #[must_use]
    pub const fn mu(&self) -> f64 {
        self.mu
    }

    /// Derives the rates of a population of `population` nodes.
    ///
    /// # Errors
    /// Returns the errors of [`Rates::for_population`].
    pub fn rates_for(&self, population: usize) -> Result<Rates> {
        Rates::for_population(self.c, self.mu, self.gamma, population)
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SisError::InvalidRate {
            name,
            value,
            reason: "must be finite and non-negative",
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::zero_everything_but_mu(0.0, 1.0, 0.0)]
    #[case::typical(0.5, 1.0, 1.1)]
    fn accepts_valid_rates(#[case] lambda: f64, #[case] mu: f64, #[case] gamma: f64) {
        let rates = Rates::new(lambda, mu, gamma).expect("rates are valid");
        assert_eq!(rates.lambda(), lambda);
        assert_eq!(rates.mu(), mu);
        assert_eq!(rates.gamma(), gamma);
    }

    #[rstest]
    #[case::negative_lambda(-1.0, 1.0, 1.0, "lambda")]
    #[case::nan_gamma(1.0, 1.0, f64::NAN, "gamma")]
    #[case::zero_mu(1.0, 0.0, 1.0, "mu")]
    #[case::infinite_mu(1.0, f64::INFINITY, 1.0, "mu")]
    #[case::overflowing_ratio(f64::MAX, 1e-300, 1.0, "lambda")]
    fn rejects_invalid_rates(
        #[case] lambda: f64,
        #[case] mu: f64,
        #[case] gamma: f64,
        #[case] expected: &str,
    ) {
        let err = Rates::new(lambda, mu, gamma).expect_err("rates must be rejected");
        assert!(matches!(err, SisError::InvalidRate { name, .. } if name == expected));
    }

    #[rstest]
    #[case(10.0, 5, 2.0)]
    #[case(1.0, 3, 1.0 / 3.0)]
    fn derives_lambda_from_budget(#[case] c: f64, #[case] population: usize, #[case] lambda: f64) {
        let rates = Rates::for_population(c, 1.0, 1.0, population).expect("valid rates");
        assert!((rates.lambda() - lambda).abs() < 1e-12);
    }

    #[rstest]
    fn model_rates_reject_zero_mu() {
        let err = ModelRates::new(1.0, 1.0, 0.0).expect_err("mu must be positive");
        assert!(matches!(err, SisError::InvalidRate { name: "mu", .. }));
    }

    #[rstest]
    fn model_rates_reject_overflowing_budget() {
        let err = ModelRates::new(1e300, 1e300, 1e-300).expect_err("c / mu overflows");
        assert!(matches!(err, SisError::InvalidRate { name: "c", .. }));
        for population in [1, 2, 30] {
            assert!(
                ModelRates::new(1.0, f64::MAX, 1.0)
                    .and_then(|model| model.rates_for(population))
                    .is_ok()
            );
        }
    }

    #[rstest]
    fn rejects_negative_budget() {
        let err = Rates::for_population(-1.0, 1.0, 1.0, 4).expect_err("negative c");
        assert!(matches!(err, SisError::InvalidRate { name: "c", .. }));
    }
}
