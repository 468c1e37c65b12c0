//! Shared helpers for integration tests

use forkrun_core::domain::ExecutionRequest;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Install a test-friendly subscriber once per test binary
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("forkrun=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Request for `input.dat` / `output.out` inside `dir`, with `deck` written
pub fn request_in(dir: &Path, deck: &str) -> ExecutionRequest {
    let input = dir.join("input.dat");
    std::fs::write(&input, deck).unwrap();
    ExecutionRequest::from_paths(input, dir.join("output.out")).unwrap()
}
