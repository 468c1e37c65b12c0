// Port Layer - Interfaces for the solver, the isolation mechanism and the clock

pub mod executor;
pub mod solver;
pub mod time_provider;

// Re-exports
pub use executor::IsolatedExecutor;
pub use solver::SolverEntry;
pub use time_provider::TimeProvider;
