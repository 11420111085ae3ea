//! Application model: the catalog, the list cursor and the latest playback
//! snapshot received from the dispatcher.

use std::sync::Arc;

use crate::gesture::{GestureHandle, GestureStatus};
use crate::library::Track;
use crate::playback::{PlaybackEvent, PlaybackSnapshot};

/// The main application model.
pub struct App {
    pub tracks: Arc<[Track]>,
    pub selected: usize,
    /// Last state the playback core published.
    pub playback: PlaybackSnapshot,

    pub follow_playback: bool,
    pub pending_follow_index: Option<usize>,

    pub gesture: Option<GestureHandle>,
    pub last_failure: Option<String>,
    pub current_dir: Option<String>,
}

impl App {
    /// Create a new `App` over `tracks`.
    pub fn new(tracks: Arc<[Track]>) -> Self {
        let playback = PlaybackSnapshot {
            index: if tracks.is_empty() { None } else { Some(0) },
            playlist_len: tracks.len(),
            volume: 1.0,
            ..PlaybackSnapshot::default()
        };
        Self {
            tracks,
            selected: 0,
            playback,
            follow_playback: true,
            pending_follow_index: None,
            gesture: None,
            last_failure: None,
            current_dir: None,
        }
    }

    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    pub fn set_current_dir(&mut self, dir: String) {
        self.current_dir = Some(dir);
    }

    pub fn set_gesture_handle(&mut self, h: GestureHandle) {
        self.gesture = Some(h);
    }

    pub fn gesture_status(&self) -> Option<GestureStatus> {
        self.gesture
            .as_ref()
            .and_then(|h| h.lock().ok().map(|s| s.clone()))
    }

    /// Enable following playback (cursor follows the current track).
    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    /// Disable follow-playback and clear any pending follow index.
    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
        self.pending_follow_index = None;
    }

    /// Follow `idx` once the core reports it as current.
    pub fn set_pending_follow_index(&mut self, idx: usize) {
        self.pending_follow_index = Some(idx);
    }

    pub fn set_selected(&mut self, idx: usize) {
        if idx < self.tracks.len() {
            self.selected = idx;
        }
    }

    /// Move the cursor down, wrapping to the top.
    pub fn next(&mut self) {
        if self.has_tracks() {
            self.selected = (self.selected + 1) % self.tracks.len();
        }
    }

    /// Move the cursor up, wrapping to the bottom.
    pub fn prev(&mut self) {
        let n = self.tracks.len();
        if n > 0 {
            self.selected = (self.selected + n - 1) % n;
        }
    }

    /// Fold one observer event into the model.
    pub fn on_event(&mut self, event: PlaybackEvent) {
        match event {
            PlaybackEvent::Changed(snapshot) => {
                self.playback = snapshot;
                self.follow_current();
            }
            PlaybackEvent::Elapsed(t) => self.playback.elapsed = t,
            PlaybackEvent::Failed(e) => self.last_failure = Some(e.to_string()),
        }
    }

    fn follow_current(&mut self) {
        let Some(idx) = self.playback.index else {
            return;
        };
        if self.playback.is_playing {
            self.last_failure = None;
        }
        if !self.follow_playback {
            return;
        }
        match self.pending_follow_index {
            Some(pending) if pending == idx => {
                self.pending_follow_index = None;
                self.set_selected(idx);
            }
            Some(_) => {}
            None => self.set_selected(idx),
        }
    }
}
