//! Audio output: the engine contract the playback core drives, and its
//! `rodio` implementation running on a dedicated thread.

mod engine;
mod sink;
mod thread;
mod types;

pub use engine::{AudioEngine, Completion, RodioEngine, SilentEngine};
