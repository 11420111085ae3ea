//! The playback state machine.
//!
//! `PlayerCore` owns the state, the audio engine and the position poll. It is
//! only ever driven from the dispatcher's worker thread, so each `apply` runs
//! to completion before the next one starts.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, info, warn};

use crate::audio::{AudioEngine, Completion};
use crate::config::PlaybackSettings;
use crate::library::Track;
use crate::now_playing::{ElapsedKind, NowPlaying, NowPlayingInfo, TransportStatus};

use super::action::Action;
use super::dispatcher::Envelope;
use super::error::PlaybackError;
use super::events::{Observers, PlaybackEvent, PlaybackHandle};
use super::position::PositionSync;
use super::state::PlaybackState;

/// Whether a commit also goes to the now-playing surface.
#[derive(Copy, Clone, PartialEq, Eq)]
enum Push {
    NowPlaying,
    ObserversOnly,
}

/// A load the engine has not answered yet.
#[derive(Debug, Copy, Clone)]
struct PendingLoad {
    index: usize,
    generation: u64,
    /// Start playing once loaded. Play, pause and toggle arriving meanwhile set it.
    play: bool,
}

pub struct PlayerCore {
    state: PlaybackState,
    engine: Box<dyn AudioEngine>,
    now_playing: Box<dyn NowPlaying>,
    observers: Observers,
    handle: PlaybackHandle,
    position: PositionSync,
    /// Engine answers come back through the dispatcher queue.
    queue: Sender<Envelope>,
    /// Playlist index whose media the engine currently holds.
    loaded: Option<usize>,
    /// Load generation that produced `loaded`.
    media_generation: u64,
    load_generation: u64,
    pending: Option<PendingLoad>,
    /// `sync` callers waiting for `pending` to resolve.
    settled: Vec<Sender<()>>,
    auto_advance: bool,
}

impl PlayerCore {
    pub(crate) fn new(
        playlist: Arc<[Track]>,
        mut engine: Box<dyn AudioEngine>,
        now_playing: Box<dyn NowPlaying>,
        settings: &PlaybackSettings,
        queue: Sender<Envelope>,
    ) -> Self {
        let state = PlaybackState::new(playlist, settings.initial_volume);
        engine.set_volume(state.volume());
        let handle = Arc::new(Mutex::new(state.snapshot()));
        Self {
            state,
            engine,
            now_playing,
            observers: Observers::default(),
            handle,
            position: PositionSync::new(
                Duration::from_millis(settings.poll_interval_ms.max(1)),
                queue.clone(),
            ),
            queue,
            loaded: None,
            media_generation: 0,
            load_generation: 0,
            pending: None,
            settled: Vec::new(),
            auto_advance: settings.auto_advance,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn handle(&self) -> PlaybackHandle {
        self.handle.clone()
    }

    pub fn observers(&self) -> Observers {
        self.observers.clone()
    }

    pub fn is_polling(&self) -> bool {
        self.position.is_running()
    }

    /// Whether a load is waiting on the engine.
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn apply(&mut self, action: Action) {
        debug!("playback: applying {action:?}");
        match action {
            Action::Play => self.play(),
            Action::Pause => self.pause(),
            Action::Toggle => {
                if self.will_play() {
                    self.pause();
                } else {
                    self.play();
                }
            }
            Action::Stop => self.stop(),
            Action::Next => match self.target_index() {
                Some(i) => self.start_track(self.state.after(i)),
                None => debug!("playback: next ignored, playlist is empty"),
            },
            Action::Previous => match self.target_index() {
                Some(i) => self.start_track(self.state.before(i)),
                None => debug!("playback: previous ignored, playlist is empty"),
            },
            Action::SetVolume(v) => self.set_volume(v),
            Action::StepVolume(delta) => self.set_volume(self.state.volume() + delta),
            Action::Seek(t) => self.seek(t),
            Action::SeekForward(by) => self.seek(self.state.current_time().saturating_add(by)),
            Action::SeekBackward(by) => self.seek(self.state.current_time().saturating_sub(by)),
            Action::PlayIndex(i) => {
                let len = self.state.playlist().len();
                if i < len {
                    self.start_track(i);
                } else {
                    self.report(PlaybackError::InvalidIndex { index: i, len });
                }
            }
        }
    }

    /// The track navigation starts from: the one being loaded, else the current one.
    fn target_index(&self) -> Option<usize> {
        self.pending
            .map(|p| p.index)
            .or(self.state.current_index())
    }

    /// Playing now, or about to once the pending load lands.
    fn will_play(&self) -> bool {
        self.pending.map_or(self.state.is_playing(), |p| p.play)
    }

    /// Start or resume the current track.
    fn play(&mut self) {
        if let Some(pending) = &mut self.pending {
            pending.play = true;
            return;
        }
        let Some(index) = self.state.current_index() else {
            debug!("playback: play ignored, playlist is empty");
            return;
        };
        if self.loaded != Some(index) {
            return self.begin_load(index);
        }
        if !self.state.is_playing() {
            self.start_playing(index);
        }
    }

    fn pause(&mut self) {
        if let Some(pending) = &mut self.pending {
            pending.play = false;
        }
        self.engine.pause();
        if self.loaded.is_some() {
            self.state.set_current_time(self.engine.elapsed());
        }
        self.state.set_playing(false);
        self.position.stop();
        self.commit(Push::NowPlaying);
    }

    fn stop(&mut self) {
        if let Some(p) = self.pending.take() {
            debug!("playback: load of #{} cancelled", p.index);
        }
        self.engine.stop();
        self.loaded = None;
        self.state.set_playing(false);
        self.state.set_current_time(Duration::ZERO);
        self.position.stop();
        self.commit(Push::NowPlaying);
        self.release_settled();
    }

    /// Switch to `index` from the beginning and play it. The current index only
    /// moves once the engine has the new media.
    fn start_track(&mut self, index: usize) {
        if self.pending.is_none() && self.loaded == Some(index) {
            // Same media (single-track playlist, or re-selecting): restart it.
            self.engine_seek(Duration::ZERO);
            self.state.set_current_time(Duration::ZERO);
            self.start_playing(index);
        } else {
            self.begin_load(index);
        }
    }

    fn start_playing(&mut self, index: usize) {
        self.engine.play_current();
        self.state.set_playing(true);
        self.position.start();
        info!("playback: playing #{index}");
        self.commit(Push::NowPlaying);
    }

    /// Hand `index` to the engine. The answer re-enters as `Envelope::Loaded`;
    /// a newer load supersedes this one.
    fn begin_load(&mut self, index: usize) {
        let playlist = self.state.playlist().clone();
        let Some(track) = playlist.get(index) else {
            return self.report(PlaybackError::InvalidIndex {
                index,
                len: playlist.len(),
            });
        };
        self.load_generation += 1;
        let generation = self.load_generation;
        self.pending = Some(PendingLoad {
            index,
            generation,
            play: true,
        });
        // Until the answer arrives the engine's media is in flux.
        self.loaded = None;
        self.position.stop();
        debug!("playback: loading #{index} (load {generation})");

        let queue = self.queue.clone();
        self.engine.load(
            track,
            Completion::new(move |result| {
                let _ = queue.send(Envelope::Loaded {
                    index,
                    generation,
                    result,
                });
            }),
        );
    }

    /// Engine answer for the load started as `generation`.
    pub(crate) fn load_finished(
        &mut self,
        index: usize,
        generation: u64,
        result: Result<Option<Duration>, PlaybackError>,
    ) {
        let Some(pending) = self.pending.filter(|p| p.generation == generation) else {
            debug!("playback: stale load {generation} of #{index} ignored");
            return;
        };
        self.pending = None;
        match result {
            Ok(duration) => {
                self.commit_load(index, generation, duration);
                if pending.play {
                    self.start_playing(index);
                } else {
                    self.state.set_playing(false);
                    self.commit(Push::NowPlaying);
                }
            }
            Err(e) => self.fail(e),
        }
        self.release_settled();
    }

    fn commit_load(&mut self, index: usize, generation: u64, duration: Option<Duration>) {
        if let Err(e) = self.state.select(index) {
            // `begin_load` already checked the index.
            return self.report(e);
        }
        self.loaded = Some(index);
        self.media_generation = generation;
        self.state.set_duration(duration);
        self.state.set_current_time(Duration::ZERO);
    }

    fn set_volume(&mut self, volume: f32) {
        if volume.is_nan() {
            warn!("playback: ignoring NaN volume");
            return;
        }
        let stored = self.state.set_volume(volume);
        self.engine.set_volume(stored);
        self.commit(Push::ObserversOnly);
        self.now_playing.publish_volume(stored);
    }

    fn seek(&mut self, to: Duration) {
        let seekable = self.pending.is_none()
            && self.loaded.is_some()
            && self.loaded == self.state.current_index();
        if !seekable {
            debug!("playback: seek ignored, nothing loaded");
            return;
        }
        let stored = self.state.set_current_time(to);
        self.engine_seek(stored);
        self.publish_elapsed(stored, ElapsedKind::Seek);
    }

    /// Seeks are applied optimistically; only a failure comes back.
    fn engine_seek(&mut self, to: Duration) {
        let queue = self.queue.clone();
        let generation = self.media_generation;
        self.engine.seek(
            to,
            Completion::new(move |result| {
                if let Err(error) = result {
                    let _ = queue.send(Envelope::SeekFailed { generation, error });
                }
            }),
        );
    }

    /// Engine answer for a seek on the media from load `generation`.
    pub(crate) fn seek_failed(&mut self, generation: u64, error: PlaybackError) {
        if self.loaded.is_none() || generation != self.media_generation {
            debug!("playback: stale seek failure ignored: {error}");
            return;
        }
        self.fail(error);
    }

    /// Reply to a `sync` caller once no load is in flight.
    pub(crate) fn when_settled(&mut self, done: Sender<()>) {
        if self.pending.is_none() {
            let _ = done.send(());
        } else {
            self.settled.push(done);
        }
    }

    fn release_settled(&mut self) {
        for done in self.settled.drain(..) {
            let _ = done.send(());
        }
    }

    /// Position poll from the `PositionSync` task.
    pub(crate) fn sync_position(&mut self, generation: u64) {
        if !self.position.is_current(generation) || !self.state.is_playing() {
            debug!("playback: stale position tick {generation} ignored");
            return;
        }
        if self.engine.is_finished() {
            return self.track_finished();
        }
        let stored = self.state.set_current_time(self.engine.elapsed());
        self.publish_elapsed(stored, ElapsedKind::Poll);
    }

    fn track_finished(&mut self) {
        info!("playback: track finished");
        match self.state.next_index() {
            Some(next) if self.auto_advance => self.start_track(next),
            _ => self.stop(),
        }
    }

    /// Engine failure: back to a stopped state on the current index.
    fn fail(&mut self, error: PlaybackError) {
        self.engine.stop();
        self.loaded = None;
        self.state.set_playing(false);
        self.state.set_duration(None);
        self.state.set_current_time(Duration::ZERO);
        self.position.stop();
        self.report(error);
        self.commit(Push::NowPlaying);
    }

    fn report(&mut self, error: PlaybackError) {
        warn!("playback: {error}");
        self.observers.publish(PlaybackEvent::Failed(error));
    }

    fn commit(&mut self, push: Push) {
        let snapshot = self.state.snapshot();
        if let Ok(mut h) = self.handle.lock() {
            *h = snapshot.clone();
        }
        self.observers.publish(PlaybackEvent::Changed(snapshot));
        if push == Push::NowPlaying {
            self.now_playing.publish(&self.now_playing_info());
        }
    }

    fn publish_elapsed(&mut self, elapsed: Duration, kind: ElapsedKind) {
        if let Ok(mut h) = self.handle.lock() {
            h.elapsed = elapsed;
        }
        self.observers.publish(PlaybackEvent::Elapsed(elapsed));
        self.now_playing.publish_elapsed(elapsed, kind);
    }

    pub(crate) fn now_playing_info(&self) -> NowPlayingInfo {
        let status = if self.state.is_playing() {
            TransportStatus::Playing
        } else if self.loaded.is_some() {
            TransportStatus::Paused
        } else {
            TransportStatus::Stopped
        };
        let track = self.state.current_track();
        NowPlayingInfo {
            track_id: track.map(|t| t.id),
            title: track.map(|t| t.title.clone()),
            artist: track.and_then(|t| t.artist.clone()),
            album: track.and_then(|t| t.album.clone()),
            artwork: track.and_then(|t| t.artwork.clone()),
            media: track.map(|t| t.path.clone()),
            elapsed: self.state.current_time(),
            duration: self.state.duration(),
            rate: if self.state.is_playing() { 1.0 } else { 0.0 },
            status,
        }
    }

    /// Stop polling and release the engine.
    pub(crate) fn shutdown(&mut self, fade_out: Duration) {
        self.pending = None;
        self.position.stop();
        self.engine.shutdown(fade_out);
        self.loaded = None;
        self.state.set_playing(false);
        self.commit(Push::NowPlaying);
        self.release_settled();
    }

    #[cfg(test)]
    pub(crate) fn poll_generation(&self) -> u64 {
        self.position.generation()
    }
}
