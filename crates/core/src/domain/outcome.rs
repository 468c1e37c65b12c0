// Execution Outcome Domain Model

use serde::{Deserialize, Serialize};

/// Child died outside the solver's own termination paths (signal, crash)
pub const ABNORMAL_TERMINATION_CODE: i32 = -1;

/// The isolation mechanism itself could not run (spawn failed)
pub const INFRASTRUCTURE_FAILURE_CODE: i32 = -99;

/// Fate of one isolated execution, reduced to what the caller can act on.
///
/// Flattens to a single integer via [`ExecutionOutcome::code`]:
/// the solver's own status, `-1`, or `-99`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionOutcome {
    /// Solver terminated itself with this status (0 = success by convention)
    Completed(i32),
    /// Killed by a signal or crashed; the cause is not recovered
    AbnormalTermination,
    /// Child could not be spawned; nothing was waited on
    InfrastructureFailure,
}

impl ExecutionOutcome {
    /// Result code handed back across the call boundary
    pub fn code(&self) -> i32 {
        match self {
            ExecutionOutcome::Completed(code) => *code,
            ExecutionOutcome::AbnormalTermination => ABNORMAL_TERMINATION_CODE,
            ExecutionOutcome::InfrastructureFailure => INFRASTRUCTURE_FAILURE_CODE,
        }
    }

    /// Inverse of [`code`](Self::code). Reserved values always map to the sentinel tiers.
    pub fn from_code(code: i32) -> Self {
        match code {
            ABNORMAL_TERMINATION_CODE => ExecutionOutcome::AbnormalTermination,
            INFRASTRUCTURE_FAILURE_CODE => ExecutionOutcome::InfrastructureFailure,
            other => ExecutionOutcome::Completed(other),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Completed(0))
    }
}

impl From<ExecutionOutcome> for i32 {
    fn from(outcome: ExecutionOutcome) -> Self {
        outcome.code()
    }
}

impl std::fmt::Display for ExecutionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionOutcome::Completed(code) => write!(f, "COMPLETED({})", code),
            ExecutionOutcome::AbnormalTermination => write!(f, "ABNORMAL_TERMINATION"),
            ExecutionOutcome::InfrastructureFailure => write!(f, "INFRASTRUCTURE_FAILURE"),
        }
    }
}

/// True if a solver status would be indistinguishable from a sentinel.
///
/// Not enforced anywhere: a child's exit status is 0..=255 once it passes
/// through the OS, so it cannot collide. Callers building outcomes from other
/// sources can use this to flag the ambiguity.
pub fn is_reserved_code(code: i32) -> bool {
    code == ABNORMAL_TERMINATION_CODE || code == INFRASTRUCTURE_FAILURE_CODE
}
