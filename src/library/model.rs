use std::path::PathBuf;
use std::time::Duration;

/// One entry of the catalog. Never mutated after the scan.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Unique within a catalog; assigned in catalog order.
    pub id: u64,
    /// Media handle resolved by the audio engine.
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Cover image found next to the media file.
    pub artwork: Option<PathBuf>,
    /// Length read from tags; the engine's own figure wins once a track is loaded.
    pub duration: Option<Duration>,
    pub display: String,
}
