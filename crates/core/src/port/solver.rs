// Solver Entry Point Port
// The wrapped program, as seen from inside the disposable child

use crate::domain::ExecutionRequest;

/// Entry point of a solver designed to run as a standalone program.
///
/// Implementations are expected to end the process themselves (through the
/// termination intercepts). Returning is tolerated: the returned value is the
/// solver's reported status and the caller terminates the child with it.
///
/// Only ever called in a forked child; implementations must not rely on
/// threads or locks owned by the host.
///
/// A panic is turned into an abort of the child, but the panic hook runs
/// first: it locks stderr and may capture a backtrace. In a multithreaded
/// host either can deadlock the child, which then never reports back. Solvers
/// that may panic should be run from single-threaded hosts or through the
/// spawn executor.
pub trait SolverEntry: Send + Sync {
    fn solve(&self, request: &ExecutionRequest) -> i32;
}

impl<F> SolverEntry for F
where
    F: Fn(&ExecutionRequest) -> i32 + Send + Sync,
{
    fn solve(&self, request: &ExecutionRequest) -> i32 {
        self(request)
    }
}
