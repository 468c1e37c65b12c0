// Application Layer - Solver runs around the isolation layer

pub mod config;
pub mod runner;

// Re-exports
pub use config::RunnerConfig;
pub use runner::{RunReport, SolverRunner};
