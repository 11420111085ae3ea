//! Playback state machine and the dispatcher that serializes every command
//! coming from gestures, the remote surface and the keyboard.

mod action;
mod dispatcher;
mod error;
mod events;
mod player;
mod position;
mod state;

pub use action::Action;
pub use dispatcher::{ActionSink, CommandSink, Dispatcher};
pub use error::{PlaybackError, Rejected};
pub use events::{Observers, PlaybackEvent, PlaybackHandle};
pub use player::PlayerCore;
pub use state::{PlaybackSnapshot, PlaybackState};

#[cfg(test)]
pub(crate) mod fakes;
