// Domain Layer - Requests, outcomes and their invariants

pub mod error;
pub mod outcome;
pub mod request;

// Re-exports
pub use error::DomainError;
pub use outcome::{
    is_reserved_code, ExecutionOutcome, ABNORMAL_TERMINATION_CODE, INFRASTRUCTURE_FAILURE_CODE,
};
pub use request::{ExecutionRequest, MAX_PATH_LEN};
