//! Staggered start of the two tank players.
//!
//! The order and the pause between the two launches are fixed by the offset
//! before anything starts. Each player runs on its own thread; the calling
//! thread sleeps between the two spawns and does not wait for the players
//! unless asked to via [`Launch::wait`].

use crate::error::{Result, TankplayError};
use crate::io::atomic_write;
use crate::stream::Stream;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::process::ExitStatus;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

// ---------------------------------------------------------------------------
// LaunchPlan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LaunchPlan {
    pub offset: f64,
    pub first: Stream,
    pub second: Stream,
    #[serde(serialize_with = "serialize_secs")]
    pub delay: Duration,
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

impl LaunchPlan {
    /// `offset` is seismic start minus geodetic start. A positive offset
    /// starts geodetic first; zero or negative starts seismic first.
    /// NaN starts seismic first with no delay. An offset too large for a
    /// `Duration` is rejected.
    pub fn from_offset(offset: f64) -> Result<Self> {
        let first = if offset > 0.0 {
            Stream::Geodetic
        } else {
            Stream::Seismic
        };
        let delay = if offset.is_nan() {
            Duration::ZERO
        } else {
            Duration::try_from_secs_f64(offset.abs())
                .map_err(|_| TankplayError::OffsetOutOfRange(offset))?
        };
        Ok(Self {
            offset,
            first,
            second: first.other(),
            delay,
        })
    }

    pub fn order(&self) -> [Stream; 2] {
        [self.first, self.second]
    }
}

// ---------------------------------------------------------------------------
// LaunchRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaunchRecord {
    pub stream: Stream,
    pub started_at: DateTime<Utc>,
}

impl LaunchRecord {
    /// `2021-05-05 17:03:11.532811+00:00`
    pub fn timestamp(&self) -> String {
        format_timestamp(&self.started_at)
    }
}

pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S%.6f%:z").to_string()
}

// ---------------------------------------------------------------------------
// Player threads
// ---------------------------------------------------------------------------

pub struct PlayerHandle {
    stream: Stream,
    handle: JoinHandle<Result<ExitStatus>>,
}

#[derive(Debug)]
pub struct PlayerOutcome {
    pub stream: Stream,
    pub status: Result<ExitStatus>,
}

impl PlayerOutcome {
    pub fn success(&self) -> bool {
        matches!(&self.status, Ok(s) if s.success())
    }
}

impl PlayerHandle {
    pub fn join(self) -> PlayerOutcome {
        let status = self
            .handle
            .join()
            .unwrap_or_else(|_| Err(TankplayError::PlayerPanicked(self.stream.to_string())));
        PlayerOutcome {
            stream: self.stream,
            status,
        }
    }
}

/// Run `task` for `stream` on a dedicated thread named `Thread-<stream>`.
pub fn spawn_player<F>(stream: Stream, task: F) -> Result<PlayerHandle>
where
    F: FnOnce(Stream) -> Result<ExitStatus> + Send + 'static,
{
    let handle = thread::Builder::new()
        .name(format!("Thread-{stream}"))
        .spawn(move || {
            tracing::info!(stream = %stream, "starting player thread");
            let status = task(stream);
            match &status {
                Ok(s) if s.success() => tracing::info!(stream = %stream, "player exited"),
                Ok(s) => tracing::warn!(stream = %stream, status = %s, "player exited with failure"),
                Err(e) => tracing::error!(stream = %stream, error = %e, "player did not run"),
            }
            status
        })?;
    Ok(PlayerHandle { stream, handle })
}

// ---------------------------------------------------------------------------
// Launcher
// ---------------------------------------------------------------------------

type SleepFn = Box<dyn Fn(Duration) + Send + Sync>;

pub struct Launcher {
    sleep: SleepFn,
}

impl Default for Launcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Launcher {
    pub fn new() -> Self {
        Self {
            sleep: Box::new(thread::sleep),
        }
    }

    /// Replace the pause between launches.
    pub fn with_sleep<F>(sleep: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        Self {
            sleep: Box::new(sleep),
        }
    }

    /// Start `first`, pause for the plan's delay, then start `second`.
    /// Returns as soon as both players have been started.
    pub fn launch<F>(&self, plan: &LaunchPlan, play: F) -> Result<Launch>
    where
        F: Fn(Stream) -> Result<ExitStatus> + Send + Sync + 'static,
    {
        let play = Arc::new(play);
        let mut records = Vec::with_capacity(2);
        let mut handles = Vec::with_capacity(2);

        for (i, stream) in plan.order().into_iter().enumerate() {
            if i == 1 {
                tracing::debug!(delay_secs = plan.delay.as_secs_f64(), "waiting before second launch");
                (self.sleep)(plan.delay);
            }
            let record = LaunchRecord {
                stream,
                started_at: Utc::now(),
            };
            tracing::info!("[{}] Start the {} tankplayer", record.timestamp(), stream);
            let play = Arc::clone(&play);
            match spawn_player(stream, move |s| (*play)(s)) {
                Ok(handle) => handles.push(handle),
                Err(e) => return Err(abandon_launch(stream, handles, e)),
            }
            records.push(record);
        }

        Ok(Launch {
            plan: *plan,
            records,
            handles,
        })
    }
}

/// A later player could not be started: wait for the ones already running
/// so none is left detached, then hand back the spawn error.
fn abandon_launch(
    stream: Stream,
    started: Vec<PlayerHandle>,
    err: TankplayError,
) -> TankplayError {
    tracing::error!(stream = %stream, error = %err, "could not start player thread");
    for outcome in started.into_iter().map(PlayerHandle::join) {
        tracing::warn!(
            stream = %outcome.stream,
            success = outcome.success(),
            "player finished after aborted launch"
        );
    }
    err
}

// ---------------------------------------------------------------------------
// Launch
// ---------------------------------------------------------------------------

/// Both players started; records are in launch order.
pub struct Launch {
    pub plan: LaunchPlan,
    pub records: Vec<LaunchRecord>,
    handles: Vec<PlayerHandle>,
}

impl Launch {
    pub fn record(&self, stream: Stream) -> Option<&LaunchRecord> {
        self.records.iter().find(|r| r.stream == stream)
    }

    pub fn write_start_log(&self, path: &Path) -> Result<()> {
        write_start_log(path, &self.records)
    }

    /// Block until both players exit.
    pub fn wait(self) -> Vec<PlayerOutcome> {
        self.handles.into_iter().map(PlayerHandle::join).collect()
    }
}

/// Seismic line first, geodetic second, whatever the launch order was.
/// A stream that never started is logged as `0`.
pub fn render_start_log(records: &[LaunchRecord]) -> String {
    let mut out = String::new();
    for stream in Stream::ALL {
        let ts = records
            .iter()
            .find(|r| r.stream == stream)
            .map(LaunchRecord::timestamp)
            .unwrap_or_else(|| "0".to_string());
        out.push_str(&format!("{} start: {}\n", stream.label(), ts));
    }
    out
}

pub fn write_start_log(path: &Path, records: &[LaunchRecord]) -> Result<()> {
    atomic_write(path, render_start_log(records).as_bytes())?;
    tracing::info!(path = %path.display(), "wrote start log");
    Ok(())
}
