//! The authoritative playback state and the snapshot published to observers.
//!
//! Every write goes through the setters below, which keep the invariants:
//! `current_index` is `None` only for an empty playlist and otherwise in range,
//! `volume` stays within `0.0..=1.0`, and `current_time` never exceeds a known
//! `duration`.

use std::sync::Arc;
use std::time::Duration;

use crate::library::Track;

use super::error::PlaybackError;

#[derive(Debug, Clone)]
pub struct PlaybackState {
    playlist: Arc<[Track]>,
    current_index: Option<usize>,
    is_playing: bool,
    volume: f32,
    current_time: Duration,
    duration: Option<Duration>,
}

impl PlaybackState {
    pub fn new(playlist: Arc<[Track]>, volume: f32) -> Self {
        let current_index = if playlist.is_empty() { None } else { Some(0) };
        Self {
            playlist,
            current_index,
            is_playing: false,
            volume: clamp_volume(volume).unwrap_or(1.0),
            current_time: Duration::ZERO,
            duration: None,
        }
    }

    pub fn playlist(&self) -> &Arc<[Track]> {
        &self.playlist
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_index.and_then(|i| self.playlist.get(i))
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn current_time(&self) -> Duration {
        self.current_time
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Index after the current one, wrapping around. `None` on an empty playlist.
    pub fn next_index(&self) -> Option<usize> {
        self.current_index.map(|i| self.after(i))
    }

    /// Index before the current one, wrapping around. `None` on an empty playlist.
    pub fn previous_index(&self) -> Option<usize> {
        self.current_index.map(|i| self.before(i))
    }

    /// `i + 1` wrapped to the playlist. Only meaningful for a non-empty playlist.
    pub(super) fn after(&self, i: usize) -> usize {
        (i + 1) % self.playlist.len()
    }

    pub(super) fn before(&self, i: usize) -> usize {
        let n = self.playlist.len();
        (i + n - 1) % n
    }

    pub(super) fn select(&mut self, index: usize) -> Result<(), PlaybackError> {
        if index >= self.playlist.len() {
            return Err(PlaybackError::InvalidIndex {
                index,
                len: self.playlist.len(),
            });
        }
        self.current_index = Some(index);
        Ok(())
    }

    pub(super) fn set_playing(&mut self, playing: bool) {
        self.is_playing = playing;
    }

    /// Store `volume` clamped to `0.0..=1.0` and return the stored value.
    /// NaN leaves the volume untouched.
    pub(super) fn set_volume(&mut self, volume: f32) -> f32 {
        if let Some(v) = clamp_volume(volume) {
            self.volume = v;
        }
        self.volume
    }

    /// Store `t`, clamped to the known duration, and return the stored value.
    pub(super) fn set_current_time(&mut self, t: Duration) -> Duration {
        self.current_time = match self.duration {
            Some(d) => t.min(d),
            None => t,
        };
        self.current_time
    }

    pub(super) fn set_duration(&mut self, duration: Option<Duration>) {
        self.duration = duration;
        if let Some(d) = duration {
            self.current_time = self.current_time.min(d);
        }
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            index: self.current_index,
            track: self.current_track().cloned(),
            is_playing: self.is_playing,
            volume: self.volume,
            elapsed: self.current_time,
            duration: self.duration,
            playlist_len: self.playlist.len(),
        }
    }
}

fn clamp_volume(v: f32) -> Option<f32> {
    (!v.is_nan()).then(|| v.clamp(0.0, 1.0))
}

/// Copy of the state handed to observers after each committed mutation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackSnapshot {
    pub index: Option<usize>,
    pub track: Option<Track>,
    pub is_playing: bool,
    pub volume: f32,
    pub elapsed: Duration,
    pub duration: Option<Duration>,
    pub playlist_len: usize,
}
