use std::borrow::Cow;
use std::path::Path;
use std::time::Duration;

use lofty::prelude::*;
use walkdir::{DirEntry, WalkDir};

use crate::config::LibrarySettings;

use super::artwork::ArtworkCache;
use super::display::{DisplaySource, display_from_fields};
use super::model::Track;

/// Decides which walked entries become tracks.
struct AudioFilter {
    extensions: Vec<String>,
    include_hidden: bool,
}

impl AudioFilter {
    fn new(settings: &LibrarySettings) -> Self {
        let extensions = settings
            .extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self {
            extensions,
            include_hidden: settings.include_hidden,
        }
    }

    /// Whether the walk should descend into (or yield) `entry`. The root is always kept.
    fn visits(&self, entry: &DirEntry) -> bool {
        self.include_hidden || entry.depth() == 0 || !is_hidden(entry.path())
    }

    fn is_audio(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            return false;
        };
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

fn walker(dir: &Path, settings: &LibrarySettings) -> WalkDir {
    let walker = WalkDir::new(dir).follow_links(settings.follow_links);
    match (settings.recursive, settings.max_depth) {
        (false, _) => walker.max_depth(1),
        (true, Some(depth)) => walker.max_depth(depth),
        (true, None) => walker,
    }
}

fn non_blank(value: Option<Cow<'_, str>>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Tag fields read from a media file. Unreadable files keep the defaults.
#[derive(Default)]
struct Tags {
    title: Option<String>,
    artist: Option<String>,
    album: Option<String>,
    duration: Option<Duration>,
}

fn read_tags(path: &Path) -> Tags {
    let Ok(tagged) = lofty::read_from_path(path) else {
        log::debug!("library: no readable tags in {}", path.display());
        return Tags::default();
    };

    let duration = Some(tagged.properties().duration()).filter(|d| !d.is_zero());
    match tagged.primary_tag().or_else(|| tagged.first_tag()) {
        Some(tag) => Tags {
            title: non_blank(tag.title()),
            artist: non_blank(tag.artist()),
            album: non_blank(tag.album()),
            duration,
        },
        None => Tags {
            duration,
            ..Tags::default()
        },
    }
}

fn track_from(path: &Path, settings: &LibrarySettings, artwork: &mut ArtworkCache) -> Track {
    let tags = read_tags(path);
    let title = tags.title.unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "UNKNOWN".to_string())
    });

    let display = display_from_fields(
        &DisplaySource {
            path,
            title: &title,
            artist: tags.artist.as_deref(),
            album: tags.album.as_deref(),
        },
        &settings.label_fields,
        &settings.label_separator,
    );

    Track {
        id: 0,
        path: path.to_path_buf(),
        title,
        artist: tags.artist,
        album: tags.album,
        artwork: artwork.lookup(path),
        duration: tags.duration,
        display,
    }
}

/// Walk `dir` and build the catalog, sorted by display string and numbered
/// in that order.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let filter = AudioFilter::new(settings);
    let mut artwork = ArtworkCache::default();

    let mut tracks: Vec<Track> = walker(dir, settings)
        .into_iter()
        .filter_entry(|e| filter.visits(e))
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file() && filter.is_audio(e.path()))
        .map(|e| track_from(e.path(), settings, &mut artwork))
        .collect();

    tracks.sort_by_cached_key(|t| t.display.to_lowercase());
    for (id, track) in tracks.iter_mut().enumerate() {
        track.id = id as u64;
    }
    log::info!("library: {} tracks found under {}", tracks.len(), dir.display());
    tracks
}
