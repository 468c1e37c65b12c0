// Spawn executor: runs a standalone solver program as a fresh process
use forkrun_core::domain::{ExecutionOutcome, ExecutionRequest};
use forkrun_core::port::IsolatedExecutor;
use std::ffi::{OsStr, OsString};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::exit_status::translate_exit_status;

/// How often a timed wait checks whether the program has exited
const TIMEOUT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Working directory of the spawned program
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkingDir {
    /// Same as the host
    Inherit,
    /// One directory for every run
    Fixed(PathBuf),
    /// Directory holding the request's input file (the run's scratch dir)
    InputParent,
}

/// Spawn executor
///
/// Launches the solver's standalone program instead of duplicating the host,
/// so it is safe from multithreaded hosts. The program reads the input deck on
/// stdin and its stdout becomes the output file. `Command` carries the host's
/// environment and stderr over to the program, as a forked child would have
/// them.
///
/// Unlike the fork executor, a wall-clock limit can be set: on expiry the
/// program is killed, reaped and reported as abnormally terminated.
#[derive(Debug, Clone)]
pub struct SpawnExecutor {
    program: PathBuf,
    args: Vec<OsString>,
    env: Vec<(OsString, OsString)>,
    working_dir: WorkingDir,
    timeout: Option<Duration>,
}

impl SpawnExecutor {
    /// Create a spawn executor for a solver binary
    ///
    /// # Example
    /// ```ignore
    /// let executor = SpawnExecutor::new("/opt/solver/bin/nastrn")
    ///     .env("DBMEM", "12000000")
    ///     .run_in_input_dir()
    ///     .timeout(Duration::from_secs(300));
    /// ```
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            working_dir: WorkingDir::Inherit,
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Extra variable on top of the inherited environment
    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.env
            .push((key.as_ref().to_os_string(), value.as_ref().to_os_string()));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = WorkingDir::Fixed(dir.as_ref().to_path_buf());
        self
    }

    /// Run each request inside the directory of its input file
    pub fn run_in_input_dir(mut self) -> Self {
        self.working_dir = WorkingDir::InputParent;
        self
    }

    /// Kill the program if it runs longer than `limit`
    pub fn timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    fn working_dir_for<'a>(&'a self, request: &'a ExecutionRequest) -> Option<&'a Path> {
        match &self.working_dir {
            WorkingDir::Inherit => None,
            WorkingDir::Fixed(dir) => Some(dir),
            WorkingDir::InputParent => request
                .input_path()
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty()),
        }
    }

    /// Open the request's files and start the program
    fn spawn(&self, request: &ExecutionRequest) -> io::Result<Child> {
        let stdin = File::open(request.input_path())?;
        let stdout = File::create(request.output_path())?;

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .envs(self.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::from(stdin))
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::inherit());

        if let Some(dir) = self.working_dir_for(request) {
            command.current_dir(dir);
        }

        command.spawn()
    }

    /// Wait for the program, giving up after `limit` (`Ok(None)`)
    fn wait_with_timeout(child: &mut Child, limit: Duration) -> io::Result<Option<ExitStatus>> {
        let deadline = Instant::now() + limit;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(Some(status));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            std::thread::sleep(TIMEOUT_POLL_INTERVAL);
        }
    }

    fn wait(&self, child: &mut Child) -> ExecutionOutcome {
        let pid = child.id();

        let status = match self.timeout {
            None => child.wait().map(Some),
            Some(limit) => Self::wait_with_timeout(child, limit),
        };

        match status {
            Ok(Some(status)) => translate_exit_status(status),
            Ok(None) => {
                warn!(
                    pid = %pid,
                    timeout_ms = ?self.timeout.map(|t| t.as_millis()),
                    "Solver program timed out, killing"
                );
                if let Err(e) = child.kill() {
                    warn!(pid = %pid, error = %e, "kill failed");
                }
                // Reap so no zombie is left behind
                if let Err(e) = child.wait() {
                    error!(pid = %pid, error = %e, "wait after kill failed");
                }
                ExecutionOutcome::AbnormalTermination
            }
            Err(e) => {
                error!(pid = %pid, error = %e, "wait failed");
                ExecutionOutcome::AbnormalTermination
            }
        }
    }
}

impl IsolatedExecutor for SpawnExecutor {
    fn execute(&self, request: &ExecutionRequest) -> ExecutionOutcome {
        info!(
            program = %self.program.display(),
            args = ?self.args,
            input = %request.input_path().display(),
            timeout_ms = ?self.timeout.map(|t| t.as_millis()),
            "Starting solver program"
        );

        let mut child = match self.spawn(request) {
            Ok(child) => child,
            Err(e) => {
                warn!(program = %self.program.display(), error = %e, "Solver program not started");
                return ExecutionOutcome::InfrastructureFailure;
            }
        };

        let pid = child.id();
        let outcome = self.wait(&mut child);

        info!(pid = %pid, outcome = %outcome, "Solver program finished");
        outcome
    }
}
