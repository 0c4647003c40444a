use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "tankplay",
    about = "Playback seismic and geodetic tankfiles with their real relative start times",
    version
)]
pub struct Cli {
    /// Name of event
    pub event_name: String,

    /// Seismic - geodetic tankplayer start times (s). Calculated from the
    /// tankplayer configs by default
    #[arg(
        long = "offset_time",
        visible_alias = "offset-time",
        value_name = "SECONDS",
        allow_negative_numbers = true
    )]
    pub offset_time: Option<f64>,

    /// YAML settings file
    #[arg(long, env = "TANKPLAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory for tank_start.log
    #[arg(long, env = "TANKPLAY_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// tankplayer binary (path or name on PATH)
    #[arg(long, env = "TANKPLAY_PLAYER")]
    pub tankplayer: Option<String>,

    /// tanksniff binary (path or name on PATH)
    #[arg(long, env = "TANKPLAY_SNIFF")]
    pub tanksniff: Option<String>,

    /// Work out the launch plan without starting any player
    #[arg(long)]
    pub dry_run: bool,

    /// Output as JSON
    #[arg(long, short = 'j')]
    pub json: bool,
}
