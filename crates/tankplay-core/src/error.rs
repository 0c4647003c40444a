use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TankplayError {
    #[error("EW_PARAMS is not set: source an Earthworm environment first")]
    EnvNotSourced,

    #[error("configuration file \"{}\" could not be opened", .0.display())]
    ConfigUnreadable(PathBuf),

    #[error("no WaveFile entry found in {}", .0.display())]
    WaveFileMissing(PathBuf),

    #[error("settings file not found: {}", .0.display())]
    SettingsNotFound(PathBuf),

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("tanksniff failed on {wave_file} ({status}): {stderr}")]
    SniffFailed {
        wave_file: String,
        status: String,
        stderr: String,
    },

    #[error("no trace packets found in tanksniff output for {0}")]
    SniffOutput(String),

    #[error("offset of {0}s is out of range for a launch delay")]
    OffsetOutOfRange(f64),

    #[error("{0} player thread panicked")]
    PlayerPanicked(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, TankplayError>;
