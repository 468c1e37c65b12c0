// Forkrun Infrastructure - System Adapters
// Implements: IsolatedExecutor (fork and spawn based), termination intercepts

pub mod exit_status;
pub mod foreign_solver;
pub mod fork_executor;
pub mod intercepts;
pub mod process_ops;
pub mod spawn_executor;

pub use exit_status::{translate_exit_status, translate_wait_status};
pub use foreign_solver::{ForeignSolver, NativeEntryPoint};
pub use fork_executor::ForkExecutor;
pub use process_ops::{NixProcessOps, ProcessOps};
pub use spawn_executor::SpawnExecutor;
