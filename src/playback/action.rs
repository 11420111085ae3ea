use std::time::Duration;

use super::error::Rejected;

/// A playback command. Produced by the gesture stabilizer, the remote-control
/// surface or the UI, and applied exactly once by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Play,
    Pause,
    /// Pause when playing, play otherwise. Evaluated when applied, not when submitted.
    Toggle,
    Stop,
    Next,
    Previous,
    /// Absolute volume, clamped to `0.0..=1.0`.
    SetVolume(f32),
    /// Relative volume change, resolved against the volume at the time it is applied.
    StepVolume(f32),
    /// Absolute position in the current track, clamped to its duration.
    Seek(Duration),
    /// Relative seeks, resolved against the position at the time they are
    /// applied so repeated presses add up. Backward stops at zero.
    SeekForward(Duration),
    SeekBackward(Duration),
    /// Select the track at this playlist index and play it.
    PlayIndex(usize),
}

impl Action {
    /// Argument checks done at submission time, so a producer learns synchronously
    /// whether its command was accepted.
    pub fn validate(&self) -> Result<(), Rejected> {
        match *self {
            Action::SetVolume(v) | Action::StepVolume(v) if !v.is_finite() => {
                Err(Rejected::InvalidArgument("volume must be a finite number"))
            }
            _ => Ok(()),
        }
    }
}
