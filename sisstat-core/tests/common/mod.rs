//! Helpers shared by the integration tests.

use std::{fs, path::PathBuf};

use sisstat_test_support::params::ParameterFile;
use tempfile::TempDir;

/// Writes `file` as `params.txt` inside a fresh temporary directory.
pub fn parameter_file(file: &ParameterFile) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temporary directory");
    let path = dir.path().join("params.txt");
    fs::write(&path, file.render()).expect("write parameter file");
    (dir, path)
}
