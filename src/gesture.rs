//! Gesture control: turns a noisy stream of classified poses into discrete
//! playback actions.

mod feed;
mod stabilizer;
mod types;

pub use feed::{GestureHandle, GestureStatus, parse_line, run_feed, spawn_feed};
pub use stabilizer::{ConfirmationCandidate, Gate, Stabilizer, StabilizerConfig, gate};
pub use types::{GestureKind, GestureObservation, UNKNOWN_LABEL};

#[cfg(test)]
mod tests;
