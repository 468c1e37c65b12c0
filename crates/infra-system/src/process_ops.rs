// Process primitives seam (fork / waitpid), swappable for fault injection
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{ForkResult, Pid};

/// The two OS calls the fork executor is built on
pub trait ProcessOps: Send + Sync {
    /// Duplicate the calling process
    ///
    /// # Safety
    /// Same contract as [`nix::unistd::fork`]: in a multithreaded process the
    /// child may only run code that does not depend on other threads' locks
    /// and must terminate without returning into the caller's logic.
    unsafe fn fork(&self) -> nix::Result<ForkResult>;

    /// Block until `child` changes state
    fn wait(&self, child: Pid) -> nix::Result<WaitStatus>;
}

/// Production implementation backed by nix
#[derive(Debug, Default, Clone, Copy)]
pub struct NixProcessOps;

impl ProcessOps for NixProcessOps {
    unsafe fn fork(&self) -> nix::Result<ForkResult> {
        nix::unistd::fork()
    }

    fn wait(&self, child: Pid) -> nix::Result<WaitStatus> {
        waitpid(child, None)
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use nix::errno::Errno;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fork that always fails; counts any wait attempted afterwards
    pub struct FailingFork {
        errno: Errno,
        fork_calls: AtomicUsize,
        wait_calls: AtomicUsize,
    }

    impl FailingFork {
        pub fn new(errno: Errno) -> Self {
            Self {
                errno,
                fork_calls: AtomicUsize::new(0),
                wait_calls: AtomicUsize::new(0),
            }
        }

        /// Process table full
        pub fn exhausted() -> Self {
            Self::new(Errno::EAGAIN)
        }

        pub fn fork_calls(&self) -> usize {
            self.fork_calls.load(Ordering::SeqCst)
        }

        pub fn wait_calls(&self) -> usize {
            self.wait_calls.load(Ordering::SeqCst)
        }
    }

    impl ProcessOps for FailingFork {
        unsafe fn fork(&self) -> nix::Result<ForkResult> {
            self.fork_calls.fetch_add(1, Ordering::SeqCst);
            Err(self.errno)
        }

        fn wait(&self, _child: Pid) -> nix::Result<WaitStatus> {
            self.wait_calls.fetch_add(1, Ordering::SeqCst);
            Err(Errno::ECHILD)
        }
    }

    /// Real fork, but `waitpid` is interrupted a fixed number of times first
    pub struct InterruptedWait {
        remaining_interrupts: AtomicUsize,
        wait_calls: AtomicUsize,
    }

    impl InterruptedWait {
        pub fn new(interrupts: usize) -> Self {
            Self {
                remaining_interrupts: AtomicUsize::new(interrupts),
                wait_calls: AtomicUsize::new(0),
            }
        }

        pub fn wait_calls(&self) -> usize {
            self.wait_calls.load(Ordering::SeqCst)
        }
    }

    impl ProcessOps for InterruptedWait {
        unsafe fn fork(&self) -> nix::Result<ForkResult> {
            nix::unistd::fork()
        }

        fn wait(&self, child: Pid) -> nix::Result<WaitStatus> {
            self.wait_calls.fetch_add(1, Ordering::SeqCst);
            let interrupted = self
                .remaining_interrupts
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if interrupted {
                return Err(Errno::EINTR);
            }
            waitpid(child, None)
        }
    }
}
