//! Error types for the sisstat core library.
//!
//! Defines the error enums exposed by the public API, their stable
//! machine-readable codes, and a convenient result alias.

use std::{fmt, io, path::PathBuf};

use thiserror::Error;

use crate::{solver::ExecutionStrategy, sweep::SweepState, topology::Topology};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// Error produced while building graphs, enumerating configurations or
/// computing stationary distributions.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SisError {
    /// Population sizes must be at least one node.
    #[error("population must contain at least one node (got {got})")]
    InvalidPopulation {
        /// The rejected population size.
        got: usize,
    },
    /// The configuration space of the population cannot be enumerated.
    #[error("population {population} exceeds the enumerable maximum of {max} nodes")]
    PopulationTooLarge {
        /// The rejected population size.
        population: usize,
        /// Largest supported population.
        max: usize,
    },
    /// A configuration index fell outside `[0, 2^N)`.
    #[error("configuration index {index} is out of range for {count} configurations")]
    ConfigurationOutOfRange {
        /// Requested configuration index.
        index: usize,
        /// Number of configurations for the population.
        count: usize,
    },
    /// Only the clique topology can be generated.
    #[error("topology `{topology}` is not supported; only the clique topology is implemented")]
    UnsupportedTopology {
        /// Topology that was requested.
        topology: Topology,
    },
    /// A model rate was negative, non-finite or otherwise unusable.
    #[error("rate `{name}` has invalid value {value}: {reason}")]
    InvalidRate {
        /// Name of the rate parameter.
        name: &'static str,
        /// Rejected value.
        value: f64,
        /// Constraint the value violated.
        reason: &'static str,
    },
    /// Sweep bounds were inconsistent.
    #[error("sweep bound `{name}` must be at least 1 (got {got})")]
    InvalidSweepBound {
        /// Name of the offending bound.
        name: &'static str,
        /// Rejected value.
        got: i64,
    },
    /// The drift tolerance must be finite and positive.
    #[error("normalisation tolerance must be finite and positive (got {got})")]
    InvalidTolerance {
        /// Rejected tolerance.
        got: f64,
    },
    /// The requested execution strategy is unavailable in the current build.
    #[error("the requested execution strategy {requested:?} is not available in this build")]
    BackendUnavailable {
        /// Strategy that could not be satisfied by the current build.
        requested: ExecutionStrategy,
    },
}

define_error_codes! {
    /// Stable codes describing [`SisError`] variants.
    enum SisErrorCode for SisError {
        /// Population sizes must be at least one node.
        InvalidPopulation => InvalidPopulation { .. } => "SIS_INVALID_POPULATION",
        /// The configuration space of the population cannot be enumerated.
        PopulationTooLarge => PopulationTooLarge { .. } => "SIS_POPULATION_TOO_LARGE",
        /// A configuration index fell outside the configuration space.
        ConfigurationOutOfRange => ConfigurationOutOfRange { .. } => "SIS_CONFIGURATION_OUT_OF_RANGE",
        /// Only the clique topology can be generated.
        UnsupportedTopology => UnsupportedTopology { .. } => "SIS_UNSUPPORTED_TOPOLOGY",
        /// A model rate was unusable.
        InvalidRate => InvalidRate { .. } => "SIS_INVALID_RATE",
        /// Sweep bounds were inconsistent.
        InvalidSweepBound => InvalidSweepBound { .. } => "SIS_INVALID_SWEEP_BOUND",
        /// The drift tolerance was unusable.
        InvalidTolerance => InvalidTolerance { .. } => "SIS_INVALID_TOLERANCE",
        /// The requested execution strategy is unavailable in the current build.
        BackendUnavailable => BackendUnavailable { .. } => "SIS_BACKEND_UNAVAILABLE",
    }
}

/// Errors raised while reading a parameter file.
#[derive(Debug, Error)]
pub enum ParameterFileError {
    /// The file could not be opened or read.
    #[error("failed to read parameter file `{path}`: {source}")]
    Io {
        /// Path of the parameter file.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The reader failed part way through.
    #[error("failed to read parameter line {line}: {source}")]
    Read {
        /// One-based line number being read.
        line: usize,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// A required line was absent.
    #[error("parameter file ended before line {line} ({field})")]
    MissingLine {
        /// One-based line number that was expected.
        line: usize,
        /// Field stored on that line.
        field: &'static str,
    },
    /// A line could not be parsed as the expected type.
    #[error("line {line} ({field}) has invalid value `{value}`")]
    InvalidValue {
        /// One-based line number of the offending value.
        line: usize,
        /// Field stored on that line.
        field: &'static str,
        /// Raw text found on that line.
        value: String,
    },
}

/// Errors raised by the sweep driver.
#[derive(Debug, Error)]
pub enum SweepError {
    /// The sweep stopped because one of its populations could not be computed.
    #[error("sweep aborted at population {population} ({state}): {source}")]
    Aborted {
        /// Population being processed when the sweep stopped.
        population: usize,
        /// State the driver ended in.
        state: SweepState,
        /// The core failure that triggered the abort.
        #[source]
        source: SisError,
    },
    /// Writing the result file failed.
    #[error("failed to write results: {source}")]
    Write {
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

impl SweepError {
    /// Retrieve the [`SisErrorCode`] of the underlying core failure, if any.
    #[must_use]
    pub const fn core_code(&self) -> Option<SisErrorCode> {
        match self {
            Self::Aborted { source, .. } => Some(source.code()),
            Self::Write { .. } => None,
        }
    }
}

/// Errors raised while comparing model output against simulator output.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// One of the files could not be read.
    #[error("failed to read `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The reader failed part way through.
    #[error("failed to read line {line}: {source}")]
    Read {
        /// One-based line number being read.
        line: usize,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// A row did not match the expected layout.
    #[error("line {line} is malformed: {reason}")]
    Malformed {
        /// One-based line number of the offending row.
        line: usize,
        /// Description of the problem.
        reason: String,
    },
    /// The simulator output lacks a population present in the model output.
    #[error("simulation output has no row for population {population}")]
    MissingSimulationRow {
        /// Population without a matching simulator row.
        population: usize,
    },
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, SisError>;
