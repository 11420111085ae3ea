//! Utilities for creating `rodio` sinks from `Track` values.
//!
//! Opening and decoding are split out so load failures can be classified
//! without an output device.

use std::fs::File;
use std::io::{self, BufReader};
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use crate::library::Track;
use crate::playback::PlaybackError;

pub(super) type TrackDecoder = Decoder<BufReader<File>>;

/// Open and probe the media behind `track`.
pub(super) fn open_decoder(track: &Track) -> Result<TrackDecoder, PlaybackError> {
    let file = File::open(&track.path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => PlaybackError::MediaNotFound(track.path.clone()),
        _ => PlaybackError::EngineLoadFailure {
            path: track.path.clone(),
            reason: e.to_string(),
        },
    })?;

    Decoder::new(BufReader::new(file)).map_err(|e| PlaybackError::EngineLoadFailure {
        path: track.path.clone(),
        reason: e.to_string(),
    })
}

/// Create a paused `Sink` for `track` that starts playback at `start_at`.
/// Also returns the decoder's idea of the total length.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    track: &Track,
    start_at: Duration,
) -> Result<(Sink, Option<Duration>), PlaybackError> {
    let decoder = open_decoder(track)?;
    let total = decoder.total_duration();

    let sink = Sink::connect_new(stream.mixer());
    sink.pause();
    // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
    sink.append(decoder.skip_duration(start_at));
    Ok((sink, total))
}
