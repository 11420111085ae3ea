use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/maestro/config.toml` or `~/.config/maestro/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `MAESTRO__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub gestures: GestureSettings,
    pub playback: PlaybackSettings,
    pub audio: AudioSettings,
    pub controls: ControlsSettings,
    pub remote: RemoteSettings,
    pub ui: UiSettings,
    pub library: LibrarySettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GestureSettings {
    /// File or FIFO delivering classified observations as JSON lines.
    /// Gesture control is off when unset.
    pub source: Option<PathBuf>,
    /// Frames below this confidence count as "Unknown".
    pub confidence_threshold: f32,
    /// How long a gesture must be held before it fires (milliseconds).
    pub confirmation_ms: u64,
    /// Volume change applied by the volume up/down gestures.
    pub volume_step: f32,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            source: None,
            confidence_threshold: 0.9,
            confirmation_ms: 2000,
            volume_step: 0.1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Volume at startup, 0.0 to 1.0.
    pub initial_volume: f32,
    /// How often elapsed time is read back from the audio engine (milliseconds).
    pub poll_interval_ms: u64,
    /// Start playing the first track right away.
    pub autoplay: bool,
    /// Move on to the next track when the current one ends.
    pub auto_advance: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            initial_volume: 1.0,
            poll_interval_ms: 500,
            autoplay: false,
            auto_advance: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            quit_fade_out_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
    /// Volume change for `+` / `-`.
    pub volume_step: f32,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            scrub_seconds: 5,
            volume_step: 0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// Expose the player on the session bus (MPRIS) for media keys and desktop widgets.
    pub mpris: bool,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self { mpris: true }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Keep the cursor on the playing track.
    pub follow_playback: bool,
    /// Banner under the window title.
    pub title: String,
    /// Track fields on the "Song:" line, e.g. `["artist", "title", "album"]`.
    pub status_fields: Vec<TrackDisplayField>,
    pub status_separator: String,
    /// Time fields after the progress bar, e.g. `["elapsed", "remaining"]`.
    pub time_fields: Vec<TimeField>,
    pub time_separator: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            follow_playback: true,
            title: " ~ conduct your music ~ ".to_string(),
            status_fields: vec![TrackDisplayField::Display],
            status_separator: " - ".to_string(),
            time_fields: vec![TimeField::Elapsed, TimeField::Total, TimeField::Remaining],
            time_separator: " / ".to_string(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeField {
    Elapsed,
    Total,
    Remaining,
}

/// A piece of track metadata that can be shown in a label.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackDisplayField {
    /// The label built at scan time.
    Display,
    Title,
    Artist,
    Album,
    Filename,
    Path,
}

/// Which files end up in the playlist and how each one is labelled.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Audio extensions, matched without the dot and ignoring case.
    pub extensions: Vec<String>,
    pub follow_links: bool,
    /// Dotfiles and dot-directories.
    pub include_hidden: bool,
    pub recursive: bool,
    /// Only applies when `recursive` is set.
    pub max_depth: Option<usize>,
    /// Fields joined into `Track.display`; the title is used when none has a value.
    pub label_fields: Vec<TrackDisplayField>,
    pub label_separator: String,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: ["mp3", "flac", "wav", "ogg"].map(String::from).to_vec(),
            follow_links: true,
            include_hidden: true,
            recursive: true,
            max_depth: None,
            label_fields: vec![TrackDisplayField::Artist, TrackDisplayField::Title],
            label_separator: " - ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `env_logger` filter string, e.g. `info` or `maestro::gesture=debug`.
    /// `RUST_LOG` is applied on top of it.
    pub level: String,
    /// Log file. Defaults to `$XDG_STATE_HOME/maestro/maestro.log`.
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
