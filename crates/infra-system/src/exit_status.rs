// Exit status translation: OS-level child fate -> ExecutionOutcome
use forkrun_core::domain::ExecutionOutcome;
use nix::sys::wait::WaitStatus;
use std::process::ExitStatus;

/// Map a `waitpid` status to an outcome
///
/// Returns `None` for statuses that do not mean the child is gone
/// (stopped, continued, ptrace stops); the waiter keeps waiting on those.
pub fn translate_wait_status(status: WaitStatus) -> Option<ExecutionOutcome> {
    match status {
        WaitStatus::Exited(_, code) => Some(ExecutionOutcome::Completed(code)),
        WaitStatus::Signaled(_, _, _) => Some(ExecutionOutcome::AbnormalTermination),
        _ => None,
    }
}

/// Map a `std::process` exit status (spawned programs) to an outcome
pub fn translate_exit_status(status: ExitStatus) -> ExecutionOutcome {
    match status.code() {
        Some(code) => ExecutionOutcome::Completed(code),
        // No code means the program was killed by a signal
        None => ExecutionOutcome::AbnormalTermination,
    }
}
