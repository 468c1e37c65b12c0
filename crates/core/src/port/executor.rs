// Isolated Executor Port
// Runs a solver where its termination cannot reach the host

use crate::domain::{ExecutionOutcome, ExecutionRequest};

/// Isolation layer contract.
///
/// Implementations:
/// - ForkExecutor: duplicates the host, runs the solver in the child
/// - SpawnExecutor: launches the solver as a standalone program
pub trait IsolatedExecutor: Send + Sync {
    /// Run one request to completion.
    ///
    /// Blocks until the child has terminated and been reaped. Never fails:
    /// spawn failure, abnormal death and the solver's own status are all
    /// reported through [`ExecutionOutcome`].
    fn execute(&self, request: &ExecutionRequest) -> ExecutionOutcome;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::port::SolverEntry;
    use std::sync::{Arc, Mutex};

    /// Mock executor behavior
    #[derive(Clone)]
    pub enum MockBehavior {
        /// Return this outcome without touching any files
        Outcome(ExecutionOutcome),
        /// Call the solver on the calling thread and report its status
        InProcess(Arc<dyn SolverEntry>),
    }

    /// Mock Isolated Executor for testing
    pub struct MockIsolatedExecutor {
        behavior: MockBehavior,
        requests: Arc<Mutex<Vec<ExecutionRequest>>>,
    }

    impl MockIsolatedExecutor {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior,
                requests: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn returning(outcome: ExecutionOutcome) -> Self {
            Self::new(MockBehavior::Outcome(outcome))
        }

        pub fn in_process(solver: impl SolverEntry + 'static) -> Self {
            Self::new(MockBehavior::InProcess(Arc::new(solver)))
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn requests(&self) -> Vec<ExecutionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl IsolatedExecutor for MockIsolatedExecutor {
        fn execute(&self, request: &ExecutionRequest) -> ExecutionOutcome {
            self.requests.lock().unwrap().push(request.clone());

            match &self.behavior {
                MockBehavior::Outcome(outcome) => *outcome,
                MockBehavior::InProcess(solver) => {
                    ExecutionOutcome::Completed(solver.solve(request))
                }
            }
        }
    }
}
