//! Messages and shared handles between `RodioEngine` and its audio thread.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::library::Track;

use super::engine::Completion;

pub(super) enum EngineCmd {
    /// Replace the current sink with `track`, paused at zero.
    Load {
        track: Track,
        reply: Completion<Option<Duration>>,
    },
    Play,
    Pause,
    /// Stop and drop the current sink.
    Stop,
    /// Rebuild the current sink starting at `to`.
    Seek { to: Duration, reply: Completion<()> },
    SetVolume(f32),
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

/// Engine progress refreshed by the audio thread.
#[derive(Debug, Clone, Default)]
pub(super) struct EngineInfo {
    pub elapsed: Duration,
    pub finished: bool,
}

pub(super) type EngineHandle = Arc<Mutex<EngineInfo>>;
