// Fork executor: runs the solver in a disposable duplicate of the host
use forkrun_core::domain::{ExecutionOutcome, ExecutionRequest};
use forkrun_core::port::{IsolatedExecutor, SolverEntry};
use nix::errno::Errno;
use nix::unistd::{ForkResult, Pid};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::exit_status::translate_wait_status;
use crate::intercepts;
use crate::process_ops::{NixProcessOps, ProcessOps};

/// One in-flight fork per host process.
///
/// A fork only carries the calling thread into the child, so two threads
/// forking at once could each hand the other's half-finished state to a child.
static EXECUTION_LOCK: Mutex<()> = Mutex::new(());

/// Fork executor
///
/// Spawns the solver in a copy-on-write duplicate of the host. The child
/// inherits open descriptors, environment and working directory; whatever
/// way the solver ends, only the child ends.
pub struct ForkExecutor<S, P = NixProcessOps> {
    solver: S,
    ops: P,
}

impl<S: SolverEntry> ForkExecutor<S> {
    /// Create a fork executor around a solver entry point
    ///
    /// # Example
    /// ```ignore
    /// let executor = ForkExecutor::new(|req: &ExecutionRequest| -> i32 {
    ///     legacy_solve(req.input_path(), req.output_path());
    ///     intercepts::numeric_exit(0)
    /// });
    /// let code = executor.execute(&request).code();
    /// ```
    pub fn new(solver: S) -> Self {
        Self::with_process_ops(solver, NixProcessOps)
    }
}

impl<S: SolverEntry, P: ProcessOps> ForkExecutor<S, P> {
    /// Same as [`ForkExecutor::new`] with custom fork/wait primitives
    pub fn with_process_ops(solver: S, ops: P) -> Self {
        Self { solver, ops }
    }

    pub fn process_ops(&self) -> &P {
        &self.ops
    }

    /// Child branch. Never returns into the caller.
    ///
    /// On the non-panicking path nothing here logs or takes locks: other host
    /// threads may have held them at the moment of the fork. A panicking
    /// solver goes through the panic hook before `abort`, and the hook does
    /// lock stderr.
    fn run_child(&self, request: &ExecutionRequest) -> ! {
        intercepts::mark_worker_process();

        match catch_unwind(AssertUnwindSafe(|| self.solver.solve(request))) {
            // Solver returned instead of terminating
            Ok(code) => intercepts::terminate_abruptly(code),
            // Unwinding further would run host code in the child
            Err(_) => std::process::abort(),
        }
    }

    /// Parent branch: block until this specific child has terminated
    fn wait_for_child(&self, child: Pid) -> ExecutionOutcome {
        loop {
            match self.ops.wait(child) {
                Ok(status) => {
                    if let Some(outcome) = translate_wait_status(status) {
                        return outcome;
                    }
                    debug!(pid = %child, status = ?status, "Child not terminated yet, waiting");
                }
                Err(Errno::EINTR) => continue,
                Err(e) => {
                    // Child already reaped elsewhere (e.g. SIGCHLD ignored): fate unknown
                    error!(pid = %child, error = %e, "waitpid failed");
                    return ExecutionOutcome::AbnormalTermination;
                }
            }
        }
    }
}

impl<S: SolverEntry, P: ProcessOps> IsolatedExecutor for ForkExecutor<S, P> {
    fn execute(&self, request: &ExecutionRequest) -> ExecutionOutcome {
        // Poisoning is irrelevant: the lock guards no data
        let _guard = EXECUTION_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        debug!(
            input = %request.input_path().display(),
            output = %request.output_path().display(),
            "Forking solver child"
        );

        // SAFETY: the child only runs the solver and then terminates through
        // an intercept, `_exit` or `abort`; it never returns from this match.
        match unsafe { self.ops.fork() } {
            Err(e) => {
                warn!(error = %e, "fork failed, solver not started");
                ExecutionOutcome::InfrastructureFailure
            }
            Ok(ForkResult::Child) => self.run_child(request),
            Ok(ForkResult::Parent { child }) => {
                let outcome = self.wait_for_child(child);

                match outcome {
                    ExecutionOutcome::Completed(code) => {
                        info!(pid = %child, code = %code, "Solver child exited")
                    }
                    _ => {
                        warn!(pid = %child, outcome = %outcome, "Solver child terminated abnormally")
                    }
                }

                outcome
            }
        }
    }
}
