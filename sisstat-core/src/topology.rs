//! Network topologies that a population can be arranged in.

use std::fmt;

/// Shape of the contact network connecting a population.
///
/// Parameter files select the topology with a numeric code; any code outside
/// the named shapes is kept as [`Topology::Custom`] so diagnostics can report
/// exactly what was requested.
///
/// # Examples
/// ```
/// use sisstat_core::{CustomCode, Topology};
///
/// assert_eq!(Topology::from_code(1), Topology::Clique);
/// assert_eq!(Topology::from_code(7), Topology::Custom(CustomCode::new(7).unwrap()));
/// assert!(Topology::Clique.is_supported());
/// assert!(!Topology::Star.is_supported());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    /// Every pair of distinct nodes is connected.
    Clique,
    /// One hub connected to every leaf.
    Star,
    /// Nodes arranged in a ring.
    Circular,
    /// Any other topology code.
    Custom(CustomCode),
}

/// Topology code that names none of the built-in shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CustomCode(i64);

impl CustomCode {
    /// Wraps `code`, or returns `None` when `code` is 1, 2 or 3.
    #[must_use]
    pub const fn new(code: i64) -> Option<Self> {
        match code {
            1..=3 => None,
            other => Some(Self(other)),
        }
    }

    /// The raw parameter-file code.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CustomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Topology {
    /// Maps a parameter-file topology code to a [`Topology`].
    #[must_use]
    pub const fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Clique,
            2 => Self::Star,
            3 => Self::Circular,
            other => Self::Custom(CustomCode(other)),
        }
    }

    /// Returns the parameter-file code for this topology.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Clique => 1,
            Self::Star => 2,
            Self::Circular => 3,
            Self::Custom(code) => code.get(),
        }
    }

    /// Whether the graph generator can build this topology.
    #[must_use]
    pub const fn is_supported(self) -> bool {
        matches!(self, Self::Clique)
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clique => f.write_str("clique"),
            Self::Star => f.write_str("star"),
            Self::Circular => f.write_str("circular"),
            Self::Custom(code) => write!(f, "custom({code})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn custom(code: i64) -> Topology {
        Topology::Custom(CustomCode::new(code).expect("code is outside the named shapes"))
    }

    #[rstest]
    #[case(1, Topology::Clique)]
    #[case(2, Topology::Star)]
    #[case(3, Topology::Circular)]
    #[case(0, custom(0))]
    #[case(-4, custom(-4))]
    fn codes_round_trip(#[case] code: i64, #[case] expected: Topology) {
        let topology = Topology::from_code(code);
        assert_eq!(topology, expected);
        assert_eq!(topology.code(), code);
    }

    #[rstest]
    #[case(Topology::Clique, "clique")]
    #[case(Topology::Circular, "circular")]
    #[case(custom(9), "custom(9)")]
    fn display_names(#[case] topology: Topology, #[case] expected: &str) {
        assert_eq!(topology.to_string(), expected);
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    fn custom_codes_exclude_named_shapes(#[case] code: i64) {
        assert_eq!(CustomCode::new(code), None);
        let topology = Topology::from_code(code);
        assert!(!matches!(topology, Topology::Custom(_)));
        assert_eq!(Topology::from_code(topology.code()), topology);
    }
}
