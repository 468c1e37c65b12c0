// Solver runner: scratch layout, solver environment, output collection
use crate::application::config::RunnerConfig;
use crate::domain::{ExecutionOutcome, ExecutionRequest};
use crate::error::{AppError, Result};
use crate::port::{IsolatedExecutor, TimeProvider};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Serializes environment edits across all runners in the process
static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Outcome of one run plus everything the solver left behind
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub outcome: ExecutionOutcome,
    /// `outcome` flattened to the integer contract
    pub return_code: i32,
    pub output: String,
    pub log: String,
    pub started_at_ms: i64,
    pub wall_time_ms: i64,
    /// Set only when the scratch directory was kept
    pub scratch_dir: Option<PathBuf>,
}

/// Runs input decks through an isolated executor
///
/// Each run gets a fresh scratch directory holding the input deck, the
/// solver's output file and its log. The configured solver environment is
/// visible to the host only for the duration of the run.
pub struct SolverRunner {
    executor: Arc<dyn IsolatedExecutor>,
    config: RunnerConfig,
    time_provider: Arc<dyn TimeProvider>,
}

impl SolverRunner {
    /// Create a new runner
    ///
    /// # Arguments
    /// * `executor` - Isolation layer (fork or spawn based)
    /// * `config` - Scratch layout and solver environment
    /// * `time_provider` - Clock for wall time
    ///
    /// # Example
    /// ```ignore
    /// let runner = SolverRunner::new(
    ///     Arc::new(ForkExecutor::new(solver)),
    ///     RunnerConfig::from_env()?,
    ///     Arc::new(SystemTimeProvider),
    /// );
    /// let report = runner.run(deck)?;
    /// ```
    pub fn new(
        executor: Arc<dyn IsolatedExecutor>,
        config: RunnerConfig,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            executor,
            config,
            time_provider,
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run one input deck to completion
    ///
    /// # Errors
    /// Only scratch-directory I/O fails a run. Every solver fate, including
    /// spawn failure, is reported through `RunReport::outcome`.
    pub fn run(&self, input_deck: &str) -> Result<RunReport> {
        let scratch = self.create_scratch_dir()?;
        let dir = scratch.path().to_path_buf();

        let input_path = dir.join(&self.config.input_file_name);
        let output_path = dir.join(&self.config.output_file_name);
        fs::write(&input_path, input_deck)?;

        let request = ExecutionRequest::from_paths(&input_path, &output_path)?;

        info!(scratch_dir = %dir.display(), "Starting solver run");

        let started_at_ms = self.time_provider.now_millis();
        let outcome = {
            let _env = ScopedEnv::apply(self.config.resolved_env(&dir));
            self.executor.execute(&request)
        };
        let wall_time_ms = self.time_provider.now_millis() - started_at_ms;

        let output = read_if_exists(&output_path)?;
        let log = match &self.config.log_file_name {
            Some(name) => read_if_exists(&dir.join(name))?,
            None => String::new(),
        };

        let scratch_dir = if self.config.keep_scratch {
            Some(scratch.keep())
        } else {
            scratch.close()?;
            None
        };

        if outcome.is_success() {
            info!(outcome = %outcome, wall_time_ms = %wall_time_ms, "Solver run finished");
        } else {
            warn!(outcome = %outcome, wall_time_ms = %wall_time_ms, "Solver run did not succeed");
        }

        Ok(RunReport {
            outcome,
            return_code: outcome.code(),
            output,
            log,
            started_at_ms,
            wall_time_ms,
            scratch_dir,
        })
    }

    /// Run a deck stored on disk
    pub fn run_file(&self, path: impl AsRef<Path>) -> Result<RunReport> {
        let deck = fs::read_to_string(path.as_ref())?;
        self.run(&deck)
    }

    /// Run on tokio's blocking pool, for async hosts
    ///
    /// Executions are still serialized by the executor; this only keeps the
    /// blocking wait off the async workers.
    pub async fn run_async(self: Arc<Self>, input_deck: String) -> Result<RunReport> {
        tokio::task::spawn_blocking(move || self.run(&input_deck))
            .await
            .map_err(|e| AppError::Internal(format!("runner task failed: {}", e)))?
    }

    fn create_scratch_dir(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(&self.config.scratch_prefix);

        let dir = match &self.config.scratch_root {
            Some(root) => {
                fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };

        debug!(scratch_dir = %dir.path().display(), "Created scratch directory");
        Ok(dir)
    }
}

/// Missing files read as empty; solvers may die before creating them
fn read_if_exists(path: &Path) -> Result<String> {
    match fs::read(path) {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e.into()),
    }
}

/// Host environment edits that are undone on drop
struct ScopedEnv {
    previous: Vec<(String, Option<OsString>)>,
    _guard: MutexGuard<'static, ()>,
}

impl ScopedEnv {
    fn apply(vars: Vec<(String, String)>) -> Self {
        let guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let previous = vars
            .into_iter()
            .map(|(key, value)| {
                let old = std::env::var_os(&key);
                std::env::set_var(&key, value);
                (key, old)
            })
            .collect();

        Self {
            previous,
            _guard: guard,
        }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (key, old) in self.previous.drain(..).rev() {
            match old {
                Some(value) => std::env::set_var(&key, value),
                None => std::env::remove_var(&key),
            }
        }
    }
}
