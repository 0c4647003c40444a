//! Start/end times of a tankfile, read through the external `tanksniff` tool.
//!
//! `tanksniff` prints one line per trace packet in the tank. Each line carries
//! the packet start and end as epoch seconds in parentheses:
//!
//! ```text
//! BKS.HHZ.BK.00 (0x32 0x30) 0 i4 100 100.0 2014/08/24 10:20:44.00 (1408875644.0000) 2014/08/24 10:20:44.99 (1408875644.9900) ...
//! ```
//!
//! The container format itself is never decoded here.

use crate::env::EwEnvironment;
use crate::error::{Result, TankplayError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::OnceLock;

/// First and last sample time in a tank, epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

static EPOCH_RE: OnceLock<Regex> = OnceLock::new();

fn epoch_re() -> &'static Regex {
    EPOCH_RE.get_or_init(|| Regex::new(r"\(\s*(-?\d+\.\d+)\s*\)").unwrap())
}

/// Fold `tanksniff` output into the overall range covered by its packets.
/// Lines without a start/end pair are ignored.
pub fn parse_sniff_output(stdout: &str, wave_file: &str) -> Result<TimeRange> {
    let mut range: Option<TimeRange> = None;

    for line in stdout.lines() {
        let epochs: Vec<f64> = epoch_re()
            .captures_iter(line)
            .filter_map(|c| c[1].parse::<f64>().ok())
            .collect();
        if epochs.len() < 2 {
            continue;
        }
        let (start, end) = (epochs[0], epochs[epochs.len() - 1]);
        range = Some(match range {
            None => TimeRange { start, end },
            Some(r) => TimeRange {
                start: r.start.min(start),
                end: r.end.max(end),
            },
        });
    }

    range.ok_or_else(|| TankplayError::SniffOutput(wave_file.to_string()))
}

/// Run `sniff_exe <wave_file>` and return the tank's time range.
pub fn query_time_range(
    sniff_exe: &Path,
    wave_file: &str,
    env: &EwEnvironment,
) -> Result<TimeRange> {
    let mut cmd = Command::new(sniff_exe);
    cmd.arg(wave_file);
    env.apply(&mut cmd);
    cmd.stdin(Stdio::null());

    tracing::debug!(sniff = %sniff_exe.display(), wave_file, "querying tank time range");

    let output = cmd.output().map_err(|source| TankplayError::Spawn {
        program: sniff_exe.display().to_string(),
        source,
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(TankplayError::SniffFailed {
            wave_file: wave_file.to_string(),
            status: output.status.to_string(),
            stderr: stderr.trim().chars().take(500).collect(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let range = parse_sniff_output(&stdout, wave_file)?;
    tracing::debug!(wave_file, start = range.start, end = range.end, "tank time range");
    Ok(range)
}
