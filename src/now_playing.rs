//! OS "now playing" surface: what the playback core pushes to it, and the
//! MPRIS implementation that doubles as the remote-control surface.

use std::path::PathBuf;
use std::time::Duration;

pub mod mpris;

/// Transport status as shown by desktop media widgets.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TransportStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Full now-playing snapshot, pushed when the track or transport state changes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NowPlayingInfo {
    pub track_id: Option<u64>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub artwork: Option<PathBuf>,
    pub media: Option<PathBuf>,
    pub elapsed: Duration,
    pub duration: Option<Duration>,
    /// 1.0 while playing, 0.0 otherwise.
    pub rate: f64,
    pub status: TransportStatus,
}

/// Why an elapsed-only update was pushed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ElapsedKind {
    Poll,
    Seek,
}

pub trait NowPlaying: Send {
    fn publish(&self, info: &NowPlayingInfo);
    fn publish_elapsed(&self, elapsed: Duration, kind: ElapsedKind);
    /// Volume changed without any track or transport change.
    fn publish_volume(&self, volume: f32);
}

/// Used when no OS surface is attached.
pub struct Detached;

impl NowPlaying for Detached {
    fn publish(&self, _info: &NowPlayingInfo) {}

    fn publish_elapsed(&self, _elapsed: Duration, _kind: ElapsedKind) {}

    fn publish_volume(&self, _volume: f32) {}
}
