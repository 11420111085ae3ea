//! Cover art lookup: a well-known image file sitting next to the media.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const STEMS: [&str; 4] = ["cover", "folder", "front", "album"];
const EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

fn is_cover_name(path: &Path) -> bool {
    let stem = path.file_stem().and_then(|s| s.to_str());
    let ext = path.extension().and_then(|s| s.to_str());
    match (stem, ext) {
        (Some(stem), Some(ext)) => {
            STEMS.iter().any(|s| stem.eq_ignore_ascii_case(s))
                && EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e))
        }
        _ => false,
    }
}

/// Find the cover image in `dir`, preferring the order of `STEMS`.
pub(crate) fn find_artwork(dir: &Path) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_cover_name(p))
        .collect();

    candidates.sort_by_key(|p| {
        let stem = p
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        STEMS.iter().position(|s| *s == stem).unwrap_or(usize::MAX)
    });
    candidates.into_iter().next()
}

/// Per-directory memo so a scan reads each directory listing once.
#[derive(Default)]
pub(crate) struct ArtworkCache {
    by_dir: HashMap<PathBuf, Option<PathBuf>>,
}

impl ArtworkCache {
    pub fn lookup(&mut self, media: &Path) -> Option<PathBuf> {
        let dir = media.parent()?;
        self.by_dir
            .entry(dir.to_path_buf())
            .or_insert_with(|| find_artwork(dir))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn cover_names_are_case_insensitive() {
        assert!(is_cover_name(Path::new("/m/Cover.JPG")));
        assert!(is_cover_name(Path::new("/m/folder.png")));
        assert!(!is_cover_name(Path::new("/m/cover.txt")));
        assert!(!is_cover_name(Path::new("/m/booklet.jpg")));
    }

    #[test]
    fn find_artwork_prefers_cover_over_folder() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("folder.jpg"), b"img").unwrap();
        fs::write(dir.path().join("cover.png"), b"img").unwrap();
        fs::write(dir.path().join("song.mp3"), b"not real").unwrap();

        assert_eq!(find_artwork(dir.path()), Some(dir.path().join("cover.png")));
    }

    #[test]
    fn cache_returns_none_without_images() {
        let dir = tempdir().unwrap();
        let song = dir.path().join("song.mp3");
        fs::write(&song, b"not real").unwrap();

        let mut cache = ArtworkCache::default();
        assert_eq!(cache.lookup(&song), None);
        assert_eq!(cache.by_dir.len(), 1);
    }
}
