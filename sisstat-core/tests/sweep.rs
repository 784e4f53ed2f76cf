//! End-to-end tests for the parameter file to result file pipeline.

mod common;

use rstest::rstest;
use sisstat_core::{
    ExecutionStrategy, ModelParameters, SisError, SolverBuilder, SweepError, SweepState,
    Topology, run_sweep,
};
use sisstat_test_support::{params::ParameterFile, tracing::record};
use tracing::Level;

fn sweep_text(file: &ParameterFile) -> (Result<usize, SweepError>, String) {
    let (_dir, path) = common::parameter_file(file);
    let params = ModelParameters::from_path(&path).expect("parameter file parses");
    let plan = params.sweep_plan().expect("plan is valid");
    let solver = SolverBuilder::new().build().expect("defaults are valid");
    let mut output = Vec::new();
    let outcome = run_sweep(&solver, &plan, &mut output).map(|report| report.rows.len());
    (outcome, String::from_utf8(output).expect("output is utf-8"))
}

#[rstest]
fn writes_header_and_one_row_per_population() {
    let (outcome, text) = sweep_text(&ParameterFile::default().sweep(2, 6, 2));
    assert_eq!(outcome.expect("sweep succeeds"), 3);

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "1.1");
    assert_eq!(lines.len(), 4);
    for (line, expected_population) in lines[1..].iter().zip([2, 4, 6]) {
        let (population, probability) = line.split_once(' ').expect("two columns");
        assert_eq!(population, expected_population.to_string());
        let (_, decimals) = probability.split_once('.').expect("decimal point");
        assert_eq!(decimals.len(), 5);
        let probability: f64 = probability.parse().expect("probability parses");
        assert!((0.0..=1.0).contains(&probability));
    }
}

#[rstest]
fn single_population_sweep() {
    let (outcome, text) = sweep_text(&ParameterFile::default().sweep(1, 1, 1));
    assert_eq!(outcome.expect("sweep succeeds"), 1);
    assert_eq!(text.lines().count(), 2);
    assert!(text.lines().nth(1).expect("row").starts_with("1 "));
}

#[rstest]
fn empty_range_writes_only_the_header() {
    let (outcome, text) = sweep_text(&ParameterFile::default().sweep(8, 4, 1));
    assert_eq!(outcome.expect("sweep succeeds"), 0);
    assert_eq!(text, "1.1\n");
}

#[rstest]
#[case("1e300", "1e300")]
#[case("0.0000001", "1e-7")]
#[case("2.5", "2.5")]
fn header_keeps_extreme_gamma_short(#[case] gamma: &str, #[case] expected: &str) {
    let file = ParameterFile {
        gamma: gamma.to_owned(),
        ..ParameterFile::default()
    }
    .sweep(2, 2, 1);
    let (outcome, text) = sweep_text(&file);
    outcome.expect("sweep succeeds");
    assert_eq!(text.lines().next(), Some(expected));
}

#[rstest]
fn overflowing_pressure_is_rejected_before_sweeping() {
    let file = ParameterFile {
        c: "1e300".to_owned(),
        mu: "1e-300".to_owned(),
        ..ParameterFile::default()
    };
    let (_dir, path) = common::parameter_file(&file);
    let params = ModelParameters::from_path(&path).expect("parameter file parses");
    let err = params.sweep_plan().expect_err("c / mu overflows");
    assert!(matches!(err, SisError::InvalidRate { name: "c", .. }));
}

#[rstest]
#[case(2, Topology::Star)]
#[case(3, Topology::Circular)]
#[case(7, Topology::from_code(7))]
fn unsupported_topology_aborts_after_the_header(#[case] code: i64, #[case] topology: Topology) {
    let (outcome, text) = sweep_text(&ParameterFile::default().topology(code));
    assert_eq!(text, "1.1\n");
    match outcome.expect_err("sweep must abort") {
        SweepError::Aborted {
            population,
            state,
            source,
        } => {
            assert_eq!(population, 2);
            assert_eq!(state, SweepState::Aborted);
            assert_eq!(source, SisError::UnsupportedTopology { topology });
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[rstest]
fn population_beyond_the_limit_aborts_with_partial_output() {
    let solver = SolverBuilder::new().build().expect("defaults are valid");
    let params = ModelParameters {
        gamma: 1.0,
        c: 1.0,
        mu: 1.0,
        start_population: 1,
        max_population: 1_000,
        increment: 999,
        topology: Topology::Clique,
        output_name: "out".to_owned(),
    };
    let plan = params.sweep_plan().expect("plan is valid");
    let mut output = Vec::new();
    let err = run_sweep(&solver, &plan, &mut output).expect_err("N=1000 cannot be enumerated");
    assert!(matches!(
        err,
        SweepError::Aborted {
            population: 1_000,
            source: SisError::PopulationTooLarge { .. },
            ..
        }
    ));
    let text = String::from_utf8(output).expect("output is utf-8");
    assert_eq!(text.lines().count(), 2);
}

#[rstest]
fn strategies_produce_identical_files() {
    let params = ModelParameters::from_reader(
        ParameterFile::default().sweep(10, 14, 2).render().as_bytes(),
    )
    .expect("parameters parse");
    let plan = params.sweep_plan().expect("plan is valid");

    let run = |strategy| {
        let solver = SolverBuilder::new()
            .with_execution_strategy(strategy)
            .build()
            .expect("strategy is valid");
        let mut output = Vec::new();
        run_sweep(&solver, &plan, &mut output).expect("sweep succeeds");
        output
    };

    let sequential = run(ExecutionStrategy::Sequential);
    assert_eq!(run(ExecutionStrategy::Auto), sequential);
    #[cfg(feature = "parallel")]
    assert_eq!(run(ExecutionStrategy::Parallel), sequential);
}

#[rstest]
fn sweep_is_instrumented() {
    let ((outcome, _text), layer) =
        record(|| sweep_text(&ParameterFile::default().sweep(2, 6, 2)));
    outcome.expect("sweep succeeds");

    let sweeps = layer.spans_named("core.sweep");
    assert_eq!(sweeps.len(), 1);
    assert_eq!(sweeps[0].fields["start"], "2");
    assert_eq!(sweeps[0].fields["max"], "6");
    assert_eq!(sweeps[0].fields["topology"], "clique");
    assert_eq!(layer.spans_named("core.solve").len(), 3);

    let header = layer.events_with_message(Level::INFO, "sweep header written");
    assert_eq!(header.len(), 1);
    assert_eq!(header[0].fields["gamma"], "1.1");
    assert_eq!(header[0].fields["c"], "10");
    assert_eq!(header[0].fields["mu"], "1");

    let finished = layer.events_with_message(Level::INFO, "sweep finished");
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].fields["state"], "done");
    assert_eq!(finished[0].span.as_deref(), Some("core.sweep"));
}

#[rstest]
fn abort_is_logged_with_its_code() {
    let ((outcome, _text), layer) = record(|| sweep_text(&ParameterFile::default().topology(2)));
    outcome.expect_err("sweep must abort");

    let aborted = layer.events_with_message(Level::ERROR, "sweep aborted");
    assert_eq!(aborted.len(), 1);
    assert_eq!(aborted[0].fields["code"], "SIS_UNSUPPORTED_TOPOLOGY");
    assert_eq!(aborted[0].fields["rows"], "0");
    assert!(layer.spans_named("core.solve").is_empty());
}
