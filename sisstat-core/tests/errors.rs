use rstest::rstest;
use sisstat_core::{ExecutionStrategy, SisError, SisErrorCode, SweepError, SweepState, Topology};

#[rstest]
#[case(SisError::InvalidPopulation { got: 0 }, SisErrorCode::InvalidPopulation)]
#[case(
    SisError::PopulationTooLarge { population: 40, max: 32 },
    SisErrorCode::PopulationTooLarge,
)]
#[case(
    SisError::ConfigurationOutOfRange { index: 8, count: 8 },
    SisErrorCode::ConfigurationOutOfRange,
)]
#[case(
    SisError::UnsupportedTopology { topology: Topology::Circular },
    SisErrorCode::UnsupportedTopology,
)]
#[case(
    SisError::InvalidRate { name: "mu", value: 0.0, reason: "must be positive" },
    SisErrorCode::InvalidRate,
)]
#[case(
    SisError::InvalidSweepBound { name: "increment", got: 0 },
    SisErrorCode::InvalidSweepBound,
)]
#[case(SisError::InvalidTolerance { got: -1.0 }, SisErrorCode::InvalidTolerance)]
#[case(
    SisError::BackendUnavailable { requested: ExecutionStrategy::Parallel },
    SisErrorCode::BackendUnavailable,
)]
fn returns_expected_code(#[case] error: SisError, #[case] expected: SisErrorCode) {
    assert_eq!(error.code(), expected);
    assert!(expected.as_str().starts_with("SIS_"));
}

#[rstest]
fn code_strings_are_stable() {
    assert_eq!(
        SisErrorCode::UnsupportedTopology.as_str(),
        "SIS_UNSUPPORTED_TOPOLOGY"
    );
    assert_eq!(
        SisErrorCode::PopulationTooLarge.as_str(),
        "SIS_POPULATION_TOO_LARGE"
    );
}

#[rstest]
fn sweep_errors_expose_the_core_code() {
    let aborted = SweepError::Aborted {
        population: 5,
        state: SweepState::Aborted,
        source: SisError::UnsupportedTopology {
            topology: Topology::Star,
        },
    };
    assert_eq!(aborted.core_code(), Some(SisErrorCode::UnsupportedTopology));

    let write = SweepError::Write {
        source: std::io::Error::other("disk full"),
    };
    assert_eq!(write.core_code(), None);
}

#[rstest]
fn aborted_sweep_message_names_population_and_cause() {
    let err = SweepError::Aborted {
        population: 5,
        state: SweepState::Aborted,
        source: SisError::UnsupportedTopology {
            topology: Topology::Star,
        },
    };
    let message = err.to_string();
    assert!(message.contains("population 5"));
    assert!(message.contains("star"));
}
