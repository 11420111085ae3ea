use std::path::Path;

use crate::config::TrackDisplayField;

use super::model::Track;

/// Metadata a display string can be composed from.
pub(crate) struct DisplaySource<'a> {
    pub path: &'a Path,
    pub title: &'a str,
    pub artist: Option<&'a str>,
    pub album: Option<&'a str>,
}

impl DisplaySource<'_> {
    /// The trimmed, non-empty value of one field.
    fn field(&self, field: TrackDisplayField) -> Option<String> {
        let non_empty = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        match field {
            TrackDisplayField::Display => {
                // "display" as a building block means "artist - title".
                let parts: Vec<String> = [self.artist, Some(self.title)]
                    .into_iter()
                    .flatten()
                    .filter_map(non_empty)
                    .collect();
                (!parts.is_empty()).then(|| parts.join(" - "))
            }
            TrackDisplayField::Title => non_empty(self.title),
            TrackDisplayField::Artist => self.artist.and_then(non_empty),
            TrackDisplayField::Album => self.album.and_then(non_empty),
            TrackDisplayField::Filename => self
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(non_empty),
            TrackDisplayField::Path => Some(self.path.display().to_string()),
        }
    }
}

/// Build a display string from `fields` joined by `sep`, falling back to the
/// title when none of the fields has a value.
pub(crate) fn display_from_fields(
    source: &DisplaySource<'_>,
    fields: &[TrackDisplayField],
    sep: &str,
) -> String {
    let parts: Vec<String> = fields.iter().filter_map(|f| source.field(*f)).collect();

    if parts.is_empty() {
        source.title.to_string()
    } else {
        parts.join(sep)
    }
}

/// Like `display_from_fields`, but `Display` means the string the scanner
/// already built for `track`.
pub(crate) fn track_text(track: &Track, fields: &[TrackDisplayField], sep: &str) -> String {
    let source = DisplaySource {
        path: &track.path,
        title: &track.title,
        artist: track.artist.as_deref(),
        album: track.album.as_deref(),
    };
    let parts: Vec<String> = fields
        .iter()
        .filter_map(|f| match f {
            TrackDisplayField::Display => {
                (!track.display.trim().is_empty()).then(|| track.display.clone())
            }
            other => source.field(*other),
        })
        .collect();

    if parts.is_empty() {
        track.display.clone()
    } else {
        parts.join(sep)
    }
}
