use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two sensor modalities replayed side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stream {
    Seismic,
    Geodetic,
}

impl Stream {
    pub const ALL: [Stream; 2] = [Stream::Seismic, Stream::Geodetic];

    pub fn as_str(self) -> &'static str {
        match self {
            Stream::Seismic => "seismic",
            Stream::Geodetic => "geodetic",
        }
    }

    /// Capitalised name used in the start log.
    pub fn label(self) -> &'static str {
        match self {
            Stream::Seismic => "Seismic",
            Stream::Geodetic => "Geodetic",
        }
    }

    pub fn other(self) -> Stream {
        match self {
            Stream::Seismic => Stream::Geodetic,
            Stream::Geodetic => Stream::Seismic,
        }
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
