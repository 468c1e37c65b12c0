// Runner configuration (defaults, env overrides, JSON)

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

/// Placeholder in `solver_env` values replaced with the run's scratch directory
pub const SCRATCH_TOKEN: &str = "{scratch}";

const ENV_PREFIX: &str = "FORKRUN_";
const ENV_SCRATCH_ROOT: &str = "FORKRUN_SCRATCH_ROOT";
const ENV_KEEP_SCRATCH: &str = "FORKRUN_KEEP_SCRATCH";
const ENV_SOLVER_PREFIX: &str = "FORKRUN_ENV_";

/// How a [`SolverRunner`](super::SolverRunner) lays out and prepares a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Parent of per-run scratch directories (None = system temp dir)
    pub scratch_root: Option<PathBuf>,
    pub scratch_prefix: String,
    pub input_file_name: String,
    pub output_file_name: String,
    /// Solver-side log collected after the run, if any
    pub log_file_name: Option<String>,
    /// Leave the scratch directory on disk after the run
    pub keep_scratch: bool,
    /// Variables the solver reads from its environment
    pub solver_env: BTreeMap<String, String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            scratch_root: None,
            scratch_prefix: "solver_".to_string(),
            input_file_name: "input.dat".to_string(),
            output_file_name: "output.out".to_string(),
            log_file_name: Some("run.log".to_string()),
            keep_scratch: false,
            solver_env: BTreeMap::new(),
        }
    }
}

impl RunnerConfig {
    /// Defaults overridden by `FORKRUN_*` process environment variables
    ///
    /// Variables outside the `FORKRUN_` namespace are never decoded, so
    /// non-UTF-8 entries elsewhere in the environment are harmless.
    pub fn from_env() -> Result<Self> {
        Self::from_env_vars(std::env::vars_os())
    }

    /// Defaults overridden by the given variables
    ///
    /// - `FORKRUN_SCRATCH_ROOT`: scratch parent directory (raw OS bytes)
    /// - `FORKRUN_KEEP_SCRATCH`: `1`/`true`/`0`/`false`
    /// - `FORKRUN_ENV_<NAME>`: sets `<NAME>` in `solver_env`
    ///
    /// # Errors
    /// - `AppError::Config` for a `FORKRUN_*` entry that is not UTF-8 or
    ///   does not parse
    pub fn from_env_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<OsStr>,
        V: AsRef<OsStr>,
    {
        let mut config = Self::default();

        for (key, value) in vars {
            let (key, value) = (key.as_ref(), value.as_ref());
            if !key.as_bytes().starts_with(ENV_PREFIX.as_bytes()) {
                continue;
            }
            let key = key.to_str().ok_or_else(|| {
                AppError::Config(format!("{:?} is not a UTF-8 variable name", key))
            })?;

            if key == ENV_SCRATCH_ROOT {
                config.scratch_root = Some(PathBuf::from(value));
                continue;
            }

            let value = value
                .to_str()
                .ok_or_else(|| AppError::Config(format!("{} is not valid UTF-8", key)))?;

            if key == ENV_KEEP_SCRATCH {
                config.keep_scratch = parse_flag(key, value)?;
            } else if let Some(name) = key.strip_prefix(ENV_SOLVER_PREFIX) {
                if name.is_empty() {
                    return Err(AppError::Config(format!(
                        "{} needs a variable name suffix",
                        ENV_SOLVER_PREFIX
                    )));
                }
                config
                    .solver_env
                    .insert(name.to_string(), value.to_string());
            }
        }

        Ok(config)
    }

    /// Parse a JSON document; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// `solver_env` with the scratch placeholder resolved
    pub fn resolved_env(&self, scratch_dir: &Path) -> Vec<(String, String)> {
        let scratch = scratch_dir.to_string_lossy();
        self.solver_env
            .iter()
            .map(|(k, v)| (k.clone(), v.replace(SCRATCH_TOKEN, &scratch)))
            .collect()
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        other => Err(AppError::Config(format!(
            "{} expects a boolean, got {:?}",
            key, other
        ))),
    }
}
