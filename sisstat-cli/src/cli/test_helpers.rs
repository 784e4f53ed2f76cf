//! Small helpers shared across CLI tests.

use std::fs;
use std::path::PathBuf;

use sisstat_test_support::params::ParameterFile;
use tempfile::TempDir;

use super::{Cli, CliError, Command, StrategyArg, SweepCommand, run_cli};

pub(super) fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

pub(super) fn write_params(dir: &TempDir, file: &ParameterFile) -> PathBuf {
    let path = dir.path().join("params.txt");
    fs::write(&path, file.render()).expect("write parameter file");
    path
}

pub(super) fn sweep_cli(params: PathBuf, output: Option<PathBuf>) -> Cli {
    Cli {
        command: Command::Sweep(SweepCommand {
            params,
            output,
            strategy: StrategyArg::Auto,
            tolerance: sisstat_core::DEFAULT_DRIFT_TOLERANCE,
        }),
    }
}

pub(super) fn run_cli_expecting_error(cli: Cli, panic_msg: &str) -> CliError {
    match run_cli(cli) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}
