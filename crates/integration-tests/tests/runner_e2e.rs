//! Solver runner end-to-end tests
//!
//! Decks go through a real executor: scratch layout, solver environment and
//! output collection around a fork- or spawn-isolated solver.

mod common;

use common::init_tracing;
use forkrun_core::application::{RunnerConfig, SolverRunner};
use forkrun_core::domain::{ExecutionOutcome, ExecutionRequest};
use forkrun_core::port::time_provider::SystemTimeProvider;
use forkrun_core::port::IsolatedExecutor;
use forkrun_infra_system::intercepts::{numeric_exit, numeric_stop};
use forkrun_infra_system::{ForkExecutor, SpawnExecutor};
use serial_test::serial;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Toy solver: counts deck lines, writes the count and a log, then EXITs
fn counting_solver(req: &ExecutionRequest) -> i32 {
    let deck = match std::fs::read_to_string(req.input_path()) {
        Ok(deck) => deck,
        Err(_) => numeric_exit(2),
    };
    let _ = std::fs::write(req.output_path(), format!("LINES {}", deck.lines().count()));

    if let Ok(log) = std::env::var("LOGNM") {
        let _ = std::fs::write(log, "END OF JOB");
    }
    numeric_exit(0)
}

fn runner(executor: impl IsolatedExecutor + 'static, config: RunnerConfig) -> SolverRunner {
    SolverRunner::new(Arc::new(executor), config, Arc::new(SystemTimeProvider))
}

fn config_with_log() -> RunnerConfig {
    let mut config = RunnerConfig::default();
    config
        .solver_env
        .insert("LOGNM".to_string(), "{scratch}/run.log".to_string());
    config
}

#[test]
#[serial]
fn test_fork_runner_collects_output_and_log() -> anyhow::Result<()> {
    init_tracing();
    let runner = runner(ForkExecutor::new(counting_solver), config_with_log());

    let report = runner.run("ID TEST\nSOL 1\nCEND\n")?;

    assert_eq!(report.outcome, ExecutionOutcome::Completed(0));
    assert_eq!(report.output, "LINES 3");
    assert_eq!(report.log, "END OF JOB");
    assert!(report.wall_time_ms >= 0);
    assert!(std::env::var_os("LOGNM").is_none());
    Ok(())
}

#[test]
#[serial]
fn test_fork_runner_reports_solver_status() -> anyhow::Result<()> {
    init_tracing();
    let runner = runner(
        ForkExecutor::new(|_: &ExecutionRequest| -> i32 { numeric_stop(5, true) }),
        RunnerConfig::default(),
    );

    let report = runner.run("deck")?;

    assert_eq!(report.return_code, 5);
    assert!(report.output.is_empty());
    Ok(())
}

#[test]
#[serial]
fn test_run_file_keeps_scratch() -> anyhow::Result<()> {
    init_tracing();
    let root = tempfile::tempdir()?;
    let deck = root.path().join("d01011a.inp");
    std::fs::write(&deck, "SOL 1\n")?;

    let config = RunnerConfig {
        scratch_root: Some(root.path().join("runs")),
        keep_scratch: true,
        ..config_with_log()
    };
    let report = runner(ForkExecutor::new(counting_solver), config).run_file(&deck)?;

    let kept: PathBuf = report.scratch_dir.expect("scratch kept");
    assert!(kept.starts_with(root.path().join("runs")));
    assert_eq!(std::fs::read_to_string(kept.join("output.out"))?, "LINES 1");
    assert_eq!(std::fs::read_to_string(kept.join("run.log"))?, "END OF JOB");
    Ok(())
}

#[test]
#[serial]
fn test_spawn_runner_pipes_deck_through_program() -> anyhow::Result<()> {
    init_tracing();
    let executor = SpawnExecutor::new("/bin/sh")
        .arg("-c")
        .arg("tr a-z A-Z; printf 'log' > \"$LOGNM\"");

    let report = runner(executor, config_with_log()).run("begin bulk\n")?;

    assert_eq!(report.outcome, ExecutionOutcome::Completed(0));
    assert_eq!(report.output, "BEGIN BULK\n");
    assert_eq!(report.log, "log");
    Ok(())
}

#[test]
#[serial]
fn test_spawn_runner_works_inside_scratch_dir() -> anyhow::Result<()> {
    init_tracing();
    let root = tempfile::tempdir()?;
    let config = RunnerConfig {
        scratch_root: Some(root.path().to_path_buf()),
        keep_scratch: true,
        log_file_name: None,
        ..RunnerConfig::default()
    };
    let executor = SpawnExecutor::new("/bin/sh")
        .arg("-c")
        .arg("cat > ftn12; echo done")
        .run_in_input_dir();

    let report = runner(executor, config).run("GRID 1\n")?;

    let kept = report.scratch_dir.expect("scratch kept");
    assert_eq!(report.output, "done\n");
    assert_eq!(std::fs::read_to_string(kept.join("ftn12"))?, "GRID 1\n");
    assert!(!PathBuf::from("ftn12").exists());
    Ok(())
}

#[test]
#[serial]
fn test_spawn_runner_timeout_reports_abnormal() -> anyhow::Result<()> {
    init_tracing();
    let executor = SpawnExecutor::new("/bin/sh")
        .arg("-c")
        .arg("sleep 30")
        .timeout(Duration::from_millis(200));

    let report = runner(executor, RunnerConfig::default()).run("deck")?;

    assert_eq!(report.outcome, ExecutionOutcome::AbnormalTermination);
    assert_eq!(report.return_code, -1);
    assert!(report.wall_time_ms < 10_000);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn test_async_runs_are_serialized() -> anyhow::Result<()> {
    init_tracing();
    let runner = Arc::new(runner(ForkExecutor::new(counting_solver), config_with_log()));

    let handles: Vec<_> = (1..=4)
        .map(|n| {
            let runner = runner.clone();
            tokio::spawn(runner.run_async("X\n".repeat(n)))
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let report = handle.await??;
        assert_eq!(report.return_code, 0);
        assert_eq!(report.output, format!("LINES {}", i + 1));
        assert_eq!(report.log, "END OF JOB");
    }
    Ok(())
}
