use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::library::Track;
use crate::playback::PlaybackError;

use super::thread::spawn_audio_thread;
use super::types::{EngineCmd, EngineHandle, EngineInfo};

type Callback<T> = Box<dyn FnOnce(Result<T, PlaybackError>) + Send>;

/// Reply slot for an engine operation that finishes off the caller's thread.
///
/// Called exactly once: either with the result, or with `EngineUnavailable`
/// when the engine drops it unanswered.
pub struct Completion<T> {
    done: Option<Callback<T>>,
}

impl<T> Completion<T> {
    pub fn new(done: impl FnOnce(Result<T, PlaybackError>) + Send + 'static) -> Self {
        Self {
            done: Some(Box::new(done)),
        }
    }

    pub fn finish(mut self, result: Result<T, PlaybackError>) {
        if let Some(done) = self.done.take() {
            done(result);
        }
    }
}

impl<T> Drop for Completion<T> {
    fn drop(&mut self) {
        if let Some(done) = self.done.take() {
            done(Err(gone()));
        }
    }
}

/// What the playback core needs from an audio backend.
///
/// Calls are made from the dispatcher's worker thread only, one at a time.
/// `load` and `seek` may touch the filesystem, so they return at once and
/// report through a `Completion`.
pub trait AudioEngine: Send {
    /// Prepare `track` for playback, paused at the start. Completes with its
    /// length when the backend can tell.
    fn load(&mut self, track: &Track, done: Completion<Option<Duration>>);
    /// Start or resume the loaded track.
    fn play_current(&mut self);
    fn pause(&mut self);
    /// Stop and unload.
    fn stop(&mut self);
    fn seek(&mut self, to: Duration, done: Completion<()>);
    fn set_volume(&mut self, volume: f32);
    fn elapsed(&self) -> Duration;
    /// The loaded track played through to its end.
    fn is_finished(&self) -> bool;
    /// Release the backend, fading out over `fade_out` where supported.
    fn shutdown(&mut self, _fade_out: Duration) {
        self.stop();
    }
}

/// `rodio` output driven through a command channel; the output stream lives on
/// the audio thread.
pub struct RodioEngine {
    tx: Sender<EngineCmd>,
    info: EngineHandle,
    join: Option<JoinHandle<()>>,
}

impl RodioEngine {
    /// Open the default output device. Fails when no device is available.
    pub fn open(volume: f32) -> Result<Self, PlaybackError> {
        let (tx, rx) = mpsc::channel::<EngineCmd>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), PlaybackError>>();
        let info: EngineHandle = Arc::new(Mutex::new(EngineInfo::default()));

        let join = spawn_audio_thread(rx, info.clone(), volume, ready_tx);
        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                tx,
                info,
                join: Some(join),
            }),
            Ok(Err(e)) => {
                let _ = join.join();
                Err(e)
            }
            Err(_) => Err(PlaybackError::EngineUnavailable(
                "audio thread exited during startup".to_string(),
            )),
        }
    }

    fn send(&self, cmd: EngineCmd) {
        if self.tx.send(cmd).is_err() {
            log::warn!("audio: engine thread is gone, command dropped");
        }
    }

    fn read_info(&self) -> EngineInfo {
        self.info.lock().map(|i| i.clone()).unwrap_or_default()
    }
}

fn gone() -> PlaybackError {
    PlaybackError::EngineUnavailable("audio thread is not running".to_string())
}

impl AudioEngine for RodioEngine {
    // A failed send drops the command, and with it the completion.
    fn load(&mut self, track: &Track, done: Completion<Option<Duration>>) {
        self.send(EngineCmd::Load {
            track: track.clone(),
            reply: done,
        });
    }

    fn play_current(&mut self) {
        self.send(EngineCmd::Play);
    }

    fn pause(&mut self) {
        self.send(EngineCmd::Pause);
    }

    fn stop(&mut self) {
        self.send(EngineCmd::Stop);
    }

    fn seek(&mut self, to: Duration, done: Completion<()>) {
        self.send(EngineCmd::Seek { to, reply: done });
    }

    fn set_volume(&mut self, volume: f32) {
        self.send(EngineCmd::SetVolume(volume));
    }

    fn elapsed(&self) -> Duration {
        self.read_info().elapsed
    }

    fn is_finished(&self) -> bool {
        self.read_info().finished
    }

    fn shutdown(&mut self, fade_out: Duration) {
        self.send(EngineCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });
        if let Some(h) = self.join.take() {
            let _ = h.join();
        }
    }
}

impl Drop for RodioEngine {
    fn drop(&mut self) {
        if self.join.is_some() {
            self.shutdown(Duration::ZERO);
        }
    }
}

/// Stand-in used when no output device could be opened: every load fails with
/// `EngineUnavailable`, everything else is a no-op.
#[derive(Debug, Clone)]
pub struct SilentEngine {
    reason: String,
}

impl SilentEngine {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl AudioEngine for SilentEngine {
    fn load(&mut self, _track: &Track, done: Completion<Option<Duration>>) {
        done.finish(Err(PlaybackError::EngineUnavailable(self.reason.clone())));
    }

    fn play_current(&mut self) {}

    fn pause(&mut self) {}

    fn stop(&mut self) {}

    fn seek(&mut self, _to: Duration, done: Completion<()>) {
        done.finish(Err(PlaybackError::EngineUnavailable(self.reason.clone())));
    }

    fn set_volume(&mut self, _volume: f32) {}

    fn elapsed(&self) -> Duration {
        Duration::ZERO
    }

    fn is_finished(&self) -> bool {
        false
    }
}
