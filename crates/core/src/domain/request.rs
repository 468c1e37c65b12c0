// Execution Request Domain Model

use super::error::{DomainError, Result};
use std::ffi::OsStr;
use std::os::raw::c_int;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// Longest path the solver's calling convention can carry (length is a C `int`)
pub const MAX_PATH_LEN: usize = c_int::MAX as usize;

/// Input/output file pair handed to the solver.
///
/// Paths are opaque bytes: they are never interpreted, NUL-terminated or
/// re-encoded, and always travel together with their explicit length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    input: Vec<u8>,
    output: Vec<u8>,
}

impl ExecutionRequest {
    /// Build a request from raw path bytes
    ///
    /// # Errors
    /// - `DomainError::PathTooLong` if either path exceeds `MAX_PATH_LEN`
    pub fn new(input: impl Into<Vec<u8>>, output: impl Into<Vec<u8>>) -> Result<Self> {
        let input = input.into();
        let output = output.into();

        check_len("input", input.len())?;
        check_len("output", output.len())?;

        Ok(Self { input, output })
    }

    /// Build a request from filesystem paths (raw OS bytes, no UTF-8 requirement)
    pub fn from_paths(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<Self> {
        Self::new(
            input.as_ref().as_os_str().as_bytes(),
            output.as_ref().as_os_str().as_bytes(),
        )
    }

    pub fn input(&self) -> &[u8] {
        &self.input
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Input path length as the solver expects it
    pub fn input_len(&self) -> c_int {
        // Bounded by MAX_PATH_LEN at construction
        self.input.len() as c_int
    }

    /// Output path length as the solver expects it
    pub fn output_len(&self) -> c_int {
        self.output.len() as c_int
    }

    pub fn input_path(&self) -> &Path {
        Path::new(OsStr::from_bytes(&self.input))
    }

    pub fn output_path(&self) -> &Path {
        Path::new(OsStr::from_bytes(&self.output))
    }
}

fn check_len(which: &'static str, len: usize) -> Result<()> {
    if len > MAX_PATH_LEN {
        return Err(DomainError::PathTooLong {
            which,
            len,
            max: MAX_PATH_LEN,
        });
    }
    Ok(())
}
