//! Extraction of the `WaveFile` entry from a tankplayer configuration file.
//!
//! Tankplayer `.d` files are line oriented. The entry we care about looks like
//!
//! ```text
//! WaveFile  /data/events/napa/seismic.tnk   # tank to replay
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. When the directive
//! appears more than once the last occurrence wins.

use crate::error::{Result, TankplayError};
use std::path::Path;

pub const WAVE_FILE_DIRECTIVE: &str = "WaveFile ";

/// Scan tankplayer configuration text and return the last `WaveFile` path,
/// or an empty string when no line carries one.
pub fn scan_wave_file(contents: &str) -> String {
    let mut wave_file = String::new();

    for (idx, line) in contents.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if !line.contains(WAVE_FILE_DIRECTIVE) {
            continue;
        }

        let body = line.split('#').next().unwrap_or_default();
        match body.split_whitespace().nth(1) {
            Some(token) => {
                if !wave_file.is_empty() {
                    tracing::debug!(
                        line = idx + 1,
                        previous = %wave_file,
                        replacement = token,
                        "WaveFile listed more than once; keeping the later entry"
                    );
                }
                wave_file = token.to_string();
            }
            None => {
                tracing::warn!(
                    line = idx + 1,
                    text = trimmed,
                    "WaveFile directive has no path; ignoring line"
                );
            }
        }
    }

    wave_file
}

/// Read `path` and extract its `WaveFile` entry.
///
/// Fails with [`TankplayError::ConfigUnreadable`] when the file cannot be
/// opened. A file without the directive yields `Ok("")`.
pub fn read_wave_file(path: &Path) -> Result<String> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(
                path = %path.display(),
                error = %e,
                "Configuration file \"{}\" could not be opened.",
                path.display()
            );
            return Err(TankplayError::ConfigUnreadable(path.to_path_buf()));
        }
    };
    Ok(scan_wave_file(&contents))
}
