//! Single-consumer command queue in front of `PlayerCore`.
//!
//! Producers (gestures, MPRIS, keyboard, the position poll) hold a cheap
//! `CommandSink`; the worker thread owns the core and applies envelopes one at
//! a time in arrival order.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};

use crate::audio::AudioEngine;
use crate::config::PlaybackSettings;
use crate::library::Track;
use crate::now_playing::NowPlaying;

use super::action::Action;
use super::error::{PlaybackError, Rejected};
use super::events::{Observers, PlaybackEvent, PlaybackHandle};
use super::player::PlayerCore;

pub(crate) enum Envelope {
    Apply(Action),
    /// Position poll carrying the generation of the task that sent it.
    Tick(u64),
    /// The engine finished loading `index`, started as load `generation`.
    Loaded {
        index: usize,
        generation: u64,
        result: Result<Option<Duration>, PlaybackError>,
    },
    /// A seek on the media from load `generation` failed.
    SeekFailed {
        generation: u64,
        error: PlaybackError,
    },
    /// Replies once everything queued before it has been applied and no load
    /// is in flight.
    Sync(Sender<()>),
    Shutdown { fade_out: Duration },
}

/// Anything that can take playback actions from a producer.
pub trait ActionSink: Send + Sync {
    /// Queue `action`. `Ok` means it will be applied exactly once.
    fn accepts(&self, action: Action) -> Result<(), Rejected>;
}

#[derive(Clone)]
pub struct CommandSink {
    tx: Sender<Envelope>,
}

impl CommandSink {
    /// Block until every action this sink submitted so far has been applied
    /// and the engine has answered any load it started.
    pub fn sync(&self) -> Result<(), Rejected> {
        let (done, wait) = mpsc::channel();
        self.tx
            .send(Envelope::Sync(done))
            .map_err(|_| Rejected::Closed)?;
        wait.recv().map_err(|_| Rejected::Closed)
    }
}

impl ActionSink for CommandSink {
    fn accepts(&self, action: Action) -> Result<(), Rejected> {
        action.validate()?;
        self.tx
            .send(Envelope::Apply(action))
            .map_err(|_| Rejected::Closed)
    }
}

pub struct Dispatcher {
    sink: CommandSink,
    handle: PlaybackHandle,
    observers: Observers,
    worker: Mutex<Option<JoinHandle<PlayerCore>>>,
}

impl Dispatcher {
    /// Build the core and start the worker thread.
    pub fn spawn(
        playlist: Arc<[Track]>,
        engine: Box<dyn AudioEngine>,
        now_playing: Box<dyn NowPlaying>,
        settings: &PlaybackSettings,
    ) -> Self {
        let (tx, rx) = mpsc::channel::<Envelope>();
        let core = PlayerCore::new(playlist, engine, now_playing, settings, tx.clone());
        let handle = core.handle();
        let observers = core.observers();
        info!(
            "playback: dispatcher started with {} tracks",
            core.state().playlist().len()
        );
        let worker = thread::spawn(move || run(core, rx));
        Self {
            sink: CommandSink { tx },
            handle,
            observers,
            worker: Mutex::new(Some(worker)),
        }
    }

    pub fn sink(&self) -> CommandSink {
        self.sink.clone()
    }

    pub fn submit(&self, action: Action) -> Result<(), Rejected> {
        self.sink.accepts(action)
    }

    pub fn sync(&self) -> Result<(), Rejected> {
        self.sink.sync()
    }

    pub fn handle(&self) -> PlaybackHandle {
        self.handle.clone()
    }

    pub fn subscribe(&self) -> Receiver<PlaybackEvent> {
        self.observers.subscribe()
    }

    /// Drain what is already queued, release the engine and stop the worker.
    /// Later submissions are rejected with `Rejected::Closed`. Returns the core
    /// on the first call.
    pub fn shutdown(&self, fade_out: Duration) -> Option<PlayerCore> {
        let worker = self.worker.lock().ok()?.take()?;
        if self.sink.tx.send(Envelope::Shutdown { fade_out }).is_err() {
            warn!("playback: worker already gone");
        }
        match worker.join() {
            Ok(core) => Some(core),
            Err(_) => {
                warn!("playback: worker panicked");
                None
            }
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        let _ = self.shutdown(Duration::ZERO);
    }
}

fn run(mut core: PlayerCore, rx: Receiver<Envelope>) -> PlayerCore {
    while let Ok(envelope) = rx.recv() {
        match envelope {
            Envelope::Apply(action) => core.apply(action),
            Envelope::Tick(generation) => core.sync_position(generation),
            Envelope::Loaded {
                index,
                generation,
                result,
            } => core.load_finished(index, generation, result),
            Envelope::SeekFailed { generation, error } => core.seek_failed(generation, error),
            Envelope::Sync(done) => core.when_settled(done),
            Envelope::Shutdown { fade_out } => {
                debug!("playback: shutting down");
                core.shutdown(fade_out);
                break;
            }
        }
    }
    core
}
