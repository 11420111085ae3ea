//! Observer fan-out for playback changes.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::error::PlaybackError;
use super::state::PlaybackSnapshot;

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// Full state after a committed mutation.
    Changed(PlaybackSnapshot),
    /// Elapsed time only, after a seek or a position poll.
    Elapsed(Duration),
    /// An engine failure; the state stayed at its last good value.
    Failed(PlaybackError),
}

/// Latest snapshot, for readers that poll instead of subscribing.
pub type PlaybackHandle = Arc<Mutex<PlaybackSnapshot>>;

/// Subscriber registry. Cloning shares the same list.
#[derive(Clone, Default)]
pub struct Observers {
    subscribers: Arc<Mutex<Vec<Sender<PlaybackEvent>>>>,
}

impl Observers {
    pub fn subscribe(&self) -> Receiver<PlaybackEvent> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }
        rx
    }

    /// Deliver `event` to every subscriber, dropping the ones that hung up.
    pub(crate) fn publish(&self, event: PlaybackEvent) {
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }
}
