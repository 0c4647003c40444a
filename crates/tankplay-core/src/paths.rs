use crate::stream::Stream;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// File name constants
// ---------------------------------------------------------------------------

pub const INP_DIR: &str = "inp";
pub const TANKPLAYER_CONFIG_PREFIX: &str = "tankplayer.d";
pub const START_LOG_FILE: &str = "tank_start.log";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// `<params>/inp/tankplayer.d.<stream>`
pub fn tankplayer_config(params: &Path, stream: Stream) -> PathBuf {
    params
        .join(INP_DIR)
        .join(format!("{TANKPLAYER_CONFIG_PREFIX}.{}", stream.as_str()))
}

pub fn start_log_path(log_dir: &Path) -> PathBuf {
    log_dir.join(START_LOG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_helpers() {
        let params = Path::new("/opt/ew/params");
        assert_eq!(
            tankplayer_config(params, Stream::Seismic),
            PathBuf::from("/opt/ew/params/inp/tankplayer.d.seismic")
        );
        assert_eq!(
            tankplayer_config(params, Stream::Geodetic),
            PathBuf::from("/opt/ew/params/inp/tankplayer.d.geodetic")
        );
        assert_eq!(
            start_log_path(Path::new("/var/log/playback")),
            PathBuf::from("/var/log/playback/tank_start.log")
        );
    }
}
