use std::time::Duration;

use crate::playback::Action;

/// Label used for frames below the confidence threshold.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// One classified camera frame.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureObservation {
    pub label: String,
    pub confidence: f32,
    /// Monotonic time of the frame, relative to an arbitrary origin.
    pub timestamp: Duration,
}

impl GestureObservation {
    pub fn new(label: impl Into<String>, confidence: f32, timestamp: Duration) -> Self {
        Self {
            label: label.into(),
            confidence,
            timestamp,
        }
    }
}

/// Gestures that map to a playback action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    PlayPause,
    Next,
    Previous,
    VolumeUp,
    VolumeDown,
}

impl GestureKind {
    /// Case-insensitive, whitespace-trimmed. `None` for anything unrecognized.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        let is = |name: &str| label.eq_ignore_ascii_case(name);
        if is("Play") || is("Pause") {
            Some(Self::PlayPause)
        } else if is("Next") {
            Some(Self::Next)
        } else if is("Previous") {
            Some(Self::Previous)
        } else if is("Volume Up") {
            Some(Self::VolumeUp)
        } else if is("Volume Down") {
            Some(Self::VolumeDown)
        } else {
            None
        }
    }

    pub fn action(self, volume_step: f32) -> Action {
        match self {
            Self::PlayPause => Action::Toggle,
            Self::Next => Action::Next,
            Self::Previous => Action::Previous,
            Self::VolumeUp => Action::StepVolume(volume_step),
            Self::VolumeDown => Action::StepVolume(-volume_step),
        }
    }
}
