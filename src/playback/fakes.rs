//! Test doubles for the audio engine and the now-playing surface.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::audio::{AudioEngine, Completion};
use crate::config::PlaybackSettings;
use crate::library::Track;
use crate::now_playing::{ElapsedKind, NowPlaying, NowPlayingInfo};

use super::error::PlaybackError;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Load(PathBuf),
    Play,
    Pause,
    Stop,
    Seek(Duration),
    SetVolume(f32),
    Shutdown(Duration),
}

#[derive(Debug, Default)]
pub struct EngineScript {
    pub calls: Vec<EngineCall>,
    pub duration: Option<Duration>,
    pub elapsed: Duration,
    pub finished: bool,
    pub missing: HashSet<PathBuf>,
    /// Answer loads from another thread after this long.
    pub load_delay: Option<Duration>,
    pub fail_seeks: bool,
    /// Added to every elapsed read, like a backend clock running past the end.
    pub drift: Duration,
}

/// Shared view of a `FakeEngine`, kept by the test after the engine is boxed.
#[derive(Clone, Default)]
pub struct EngineProbe(Arc<Mutex<EngineScript>>);

impl EngineProbe {
    pub fn with<T>(&self, f: impl FnOnce(&mut EngineScript) -> T) -> T {
        f(&mut self.0.lock().unwrap())
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.with(|s| s.calls.clone())
    }

    pub fn loads(&self) -> usize {
        self.with(|s| {
            s.calls
                .iter()
                .filter(|c| matches!(c, EngineCall::Load(_)))
                .count()
        })
    }
}

pub struct FakeEngine(EngineProbe);

impl FakeEngine {
    pub fn new() -> (Box<dyn AudioEngine>, EngineProbe) {
        let probe = EngineProbe::default();
        probe.with(|s| s.duration = Some(Duration::from_secs(180)));
        (Box::new(FakeEngine(probe.clone())), probe)
    }

    fn record(&self, call: EngineCall) {
        self.0.with(|s| s.calls.push(call));
    }
}

impl AudioEngine for FakeEngine {
    fn load(&mut self, track: &Track, done: Completion<Option<Duration>>) {
        self.record(EngineCall::Load(track.path.clone()));
        let (result, delay) = self.0.with(|s| {
            let result = if s.missing.contains(&track.path) {
                Err(PlaybackError::MediaNotFound(track.path.clone()))
            } else {
                s.elapsed = Duration::ZERO;
                s.finished = false;
                Ok(s.duration)
            };
            (result, s.load_delay)
        });
        match delay {
            Some(delay) => {
                thread::spawn(move || {
                    thread::sleep(delay);
                    done.finish(result);
                });
            }
            None => done.finish(result),
        }
    }

    fn play_current(&mut self) {
        self.record(EngineCall::Play);
    }

    fn pause(&mut self) {
        self.record(EngineCall::Pause);
    }

    fn stop(&mut self) {
        self.record(EngineCall::Stop);
    }

    fn seek(&mut self, to: Duration, done: Completion<()>) {
        self.record(EngineCall::Seek(to));
        let failed = self.0.with(|s| {
            if !s.fail_seeks {
                s.elapsed = to;
            }
            s.fail_seeks
        });
        done.finish(if failed {
            Err(PlaybackError::EngineUnavailable("seek refused".into()))
        } else {
            Ok(())
        });
    }

    fn set_volume(&mut self, volume: f32) {
        self.record(EngineCall::SetVolume(volume));
    }

    fn elapsed(&self) -> Duration {
        self.0.with(|s| s.elapsed + s.drift)
    }

    fn is_finished(&self) -> bool {
        self.0.with(|s| s.finished)
    }

    fn shutdown(&mut self, fade_out: Duration) {
        self.record(EngineCall::Shutdown(fade_out));
    }
}

#[derive(Debug, Default)]
pub struct Pushed {
    pub full: Vec<NowPlayingInfo>,
    pub elapsed: Vec<(Duration, ElapsedKind)>,
    pub volumes: Vec<f32>,
}

#[derive(Clone, Default)]
pub struct RecordingNowPlaying(pub Arc<Mutex<Pushed>>);

impl RecordingNowPlaying {
    pub fn full(&self) -> Vec<NowPlayingInfo> {
        self.0.lock().unwrap().full.clone()
    }

    pub fn elapsed(&self) -> Vec<(Duration, ElapsedKind)> {
        self.0.lock().unwrap().elapsed.clone()
    }

    pub fn volumes(&self) -> Vec<f32> {
        self.0.lock().unwrap().volumes.clone()
    }
}

impl NowPlaying for RecordingNowPlaying {
    fn publish(&self, info: &NowPlayingInfo) {
        self.0.lock().unwrap().full.push(info.clone());
    }

    fn publish_elapsed(&self, elapsed: Duration, kind: ElapsedKind) {
        self.0.lock().unwrap().elapsed.push((elapsed, kind));
    }

    fn publish_volume(&self, volume: f32) {
        self.0.lock().unwrap().volumes.push(volume);
    }
}

pub fn track(id: u64) -> Track {
    let title = format!("Track {id}");
    Track {
        id,
        path: PathBuf::from(format!("/music/{id:02}.flac")),
        title: title.clone(),
        artist: Some("Artist".into()),
        album: Some("Album".into()),
        artwork: None,
        duration: None,
        display: title,
    }
}

pub fn playlist(n: u64) -> Arc<[Track]> {
    (0..n).map(track).collect()
}

/// Default playback settings with a long poll interval, so tests drive ticks by hand.
pub fn quiet_settings() -> PlaybackSettings {
    PlaybackSettings {
        poll_interval_ms: 60_000,
        ..PlaybackSettings::default()
    }
}
