// Native solver entry point adapter (fixed-length string calling convention)
use forkrun_core::domain::ExecutionRequest;
use forkrun_core::port::SolverEntry;
use libc::{c_char, c_int};

/// Native entry point: `SUBROUTINE SOLVE(INPUTF, OUTPUTF, IRETURN)`.
///
/// Character arguments are not NUL-terminated; their lengths are appended as
/// trailing hidden arguments, in argument order.
pub type NativeEntryPoint = unsafe extern "C" fn(
    input: *const c_char,
    output: *const c_char,
    status: *mut c_int,
    input_len: c_int,
    output_len: c_int,
);

/// Solver backed by a linked native entry point
#[derive(Clone, Copy)]
pub struct ForeignSolver {
    entry: NativeEntryPoint,
}

impl ForeignSolver {
    /// # Safety
    /// `entry` must follow the [`NativeEntryPoint`] convention: read at most
    /// the given number of bytes from each path and write only to `status`.
    pub unsafe fn new(entry: NativeEntryPoint) -> Self {
        Self { entry }
    }
}

impl SolverEntry for ForeignSolver {
    fn solve(&self, request: &ExecutionRequest) -> i32 {
        let mut status: c_int = 0;

        // SAFETY: both buffers live for the call and their exact lengths are
        // passed alongside; `status` is a valid, initialized out-parameter.
        unsafe {
            (self.entry)(
                request.input().as_ptr().cast(),
                request.output().as_ptr().cast(),
                &mut status,
                request.input_len(),
                request.output_len(),
            );
        }

        status
    }
}

impl std::fmt::Debug for ForeignSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForeignSolver")
            .field("entry", &(self.entry as *const ()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fork_executor::ForkExecutor;
    use forkrun_core::domain::ExecutionOutcome;
    use forkrun_core::port::IsolatedExecutor;
    use serial_test::serial;

    /// Reports `input_len * 10 + output_len`, or 99 if the paths mismatch
    unsafe extern "C" fn reports_path_lengths(
        input: *const c_char,
        output: *const c_char,
        status: *mut c_int,
        input_len: c_int,
        output_len: c_int,
    ) {
        let input = std::slice::from_raw_parts(input.cast::<u8>(), input_len as usize);
        let output = std::slice::from_raw_parts(output.cast::<u8>(), output_len as usize);

        *status = if input == b"in.dat" && output == b"result.out" {
            input_len * 10 + output_len
        } else {
            99
        };
    }

    /// Terminates the process itself, as legacy solvers do
    unsafe extern "C" fn stops_with_code(
        _input: *const c_char,
        _output: *const c_char,
        _status: *mut c_int,
        _input_len: c_int,
        _output_len: c_int,
    ) {
        crate::intercepts::numeric_stop(21, false)
    }

    fn request() -> ExecutionRequest {
        ExecutionRequest::new(b"in.dat".to_vec(), b"result.out".to_vec()).unwrap()
    }

    #[test]
    fn test_lengths_passed_as_hidden_arguments() {
        let solver = unsafe { ForeignSolver::new(reports_path_lengths) };

        assert_eq!(solver.solve(&request()), 70);
    }

    #[test]
    #[serial]
    fn test_returning_entry_point_through_fork() {
        let executor = ForkExecutor::new(unsafe { ForeignSolver::new(reports_path_lengths) });

        assert_eq!(executor.execute(&request()), ExecutionOutcome::Completed(70));
    }

    #[test]
    #[serial]
    fn test_terminating_entry_point_through_fork() {
        let executor = ForkExecutor::new(unsafe { ForeignSolver::new(stops_with_code) });

        assert_eq!(executor.execute(&request()), ExecutionOutcome::Completed(21));
    }
}
