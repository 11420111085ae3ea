use std::path::PathBuf;

use thiserror::Error;

/// Failures the playback core reports to observers. None of them reach the
/// producers that submitted the action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("media not found: {}", .0.display())]
    MediaNotFound(PathBuf),
    #[error("could not load {}: {reason}", .path.display())]
    EngineLoadFailure { path: PathBuf, reason: String },
    #[error("no track at index {index} (playlist has {len})")]
    InvalidIndex { index: usize, len: usize },
    #[error("audio output unavailable: {0}")]
    EngineUnavailable(String),
}

/// Why a producer's action was not accepted by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejected {
    #[error("playback dispatcher is not running")]
    Closed,
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}
