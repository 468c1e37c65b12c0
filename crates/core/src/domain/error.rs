// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("{which} path is {len} bytes, longer than the solver can address ({max})")]
    PathTooLong {
        which: &'static str,
        len: usize,
        max: usize,
    },
}

pub type Result<T> = std::result::Result<T, DomainError>;
