//! Earthworm environment handed to the external tank tools.

use crate::error::{Result, TankplayError};
use serde::Serialize;
use std::path::PathBuf;
use std::process::Command;

pub const EW_PARAMS: &str = "EW_PARAMS";
pub const EW_INSTALLATION: &str = "EW_INSTALLATION";
pub const EW_LOG: &str = "EW_LOG";

pub const DEFAULT_INSTALLATION: &str = "INST_UNKNOWN";

/// Read the `EW_PARAMS` directory left behind by sourcing an Earthworm
/// environment. Absent or empty means nothing was sourced.
pub fn require_sourced<F>(lookup: F) -> Result<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(EW_PARAMS) {
        Some(v) if !v.trim().is_empty() => Ok(PathBuf::from(v)),
        _ => Err(TankplayError::EnvNotSourced),
    }
}

/// Values exported as `EW_PARAMS`, `EW_INSTALLATION` and `EW_LOG` to every
/// child process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EwEnvironment {
    pub params: PathBuf,
    pub installation: String,
    pub log: PathBuf,
}

impl EwEnvironment {
    pub fn vars(&self) -> [(&'static str, String); 3] {
        [
            (EW_PARAMS, self.params.display().to_string()),
            (EW_INSTALLATION, self.installation.clone()),
            (EW_LOG, self.log.display().to_string()),
        ]
    }

    pub fn apply(&self, cmd: &mut Command) {
        for (key, value) in self.vars() {
            cmd.env(key, value);
        }
    }
}
