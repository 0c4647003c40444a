use crate::env::EwEnvironment;
use crate::error::{Result, TankplayError};
use crate::sniff::{query_time_range, TimeRange};
use crate::wavefile::read_wave_file;
use std::path::Path;

/// Seismic start minus geodetic start, in seconds. Positive means the
/// geodetic tank begins earlier.
pub fn offset_between(seismic: &TimeRange, geodetic: &TimeRange) -> f64 {
    seismic.start - geodetic.start
}

/// Tank ranges behind an offset, kept for reporting.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct OffsetSource {
    pub seismic: TimeRange,
    pub geodetic: TimeRange,
    pub offset: f64,
}

/// Resolve each tankplayer config to its tank, sniff both tanks and return
/// their start-time difference.
pub fn compute_offset(
    sniff_exe: &Path,
    seismic_cfg: &Path,
    geodetic_cfg: &Path,
    env: &EwEnvironment,
) -> Result<OffsetSource> {
    let seismic_tank = tank_for(seismic_cfg)?;
    let geodetic_tank = tank_for(geodetic_cfg)?;

    let seismic = query_time_range(sniff_exe, &seismic_tank, env)?;
    let geodetic = query_time_range(sniff_exe, &geodetic_tank, env)?;

    let offset = offset_between(&seismic, &geodetic);
    tracing::info!(
        seismic_start = seismic.start,
        geodetic_start = geodetic.start,
        seismic_span = seismic.duration(),
        geodetic_span = geodetic.duration(),
        offset,
        "computed start offset"
    );
    Ok(OffsetSource {
        seismic,
        geodetic,
        offset,
    })
}

fn tank_for(cfg: &Path) -> Result<String> {
    let tank = read_wave_file(cfg)?;
    if tank.is_empty() {
        return Err(TankplayError::WaveFileMissing(cfg.to_path_buf()));
    }
    Ok(tank)
}
