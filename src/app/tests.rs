use super::*;
use crate::gesture::GestureStatus;
use crate::library::Track;
use crate::playback::{Action, PlaybackError, PlaybackEvent, PlaybackSnapshot};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn t(id: u64, title: &str) -> Track {
    Track {
        id,
        path: std::path::PathBuf::new(),
        title: title.into(),
        artist: None,
        album: None,
        artwork: None,
        duration: None,
        display: title.into(),
    }
}

fn app() -> App {
    App::new(vec![t(0, "Alpha"), t(1, "Beta"), t(2, "Gamma")].into())
}

fn changed(index: usize, playing: bool) -> PlaybackEvent {
    PlaybackEvent::Changed(PlaybackSnapshot {
        index: Some(index),
        is_playing: playing,
        playlist_len: 3,
        volume: 1.0,
        ..PlaybackSnapshot::default()
    })
}

#[test]
fn cursor_wraps_both_ways() {
    let mut app = app();
    app.prev();
    assert_eq!(app.selected, 2);
    app.next();
    assert_eq!(app.selected, 0);
}

#[test]
fn cursor_on_empty_catalog_stays_put() {
    let mut app = App::new(Vec::<Track>::new().into());
    app.next();
    app.prev();
    assert_eq!(app.selected, 0);
    assert_eq!(app.playback.index, None);
}

#[test]
fn following_cursor_tracks_current_index() {
    let mut app = app();
    app.on_event(changed(2, true));
    assert_eq!(app.selected, 2);
    assert!(app.playback.is_playing);

    app.follow_playback_off();
    app.on_event(changed(1, true));
    assert_eq!(app.selected, 2);
}

#[test]
fn pending_follow_waits_for_the_requested_track() {
    let mut app = app();
    app.set_pending_follow_index(2);
    app.on_event(changed(1, true));
    assert_eq!(app.selected, 0);
    app.on_event(changed(2, true));
    assert_eq!(app.selected, 2);
    assert_eq!(app.pending_follow_index, None);
}

#[test]
fn failures_are_kept_until_playback_resumes() {
    let mut app = app();
    app.on_event(PlaybackEvent::Failed(PlaybackError::MediaNotFound(
        "/music/missing.mp3".into(),
    )));
    assert!(app.last_failure.as_deref().unwrap().contains("missing.mp3"));

    app.on_event(changed(0, false));
    assert!(app.last_failure.is_some());
    app.on_event(changed(0, true));
    assert!(app.last_failure.is_none());
}

#[test]
fn elapsed_events_only_touch_the_clock() {
    let mut app = app();
    app.on_event(changed(1, true));
    app.on_event(PlaybackEvent::Elapsed(Duration::from_secs(9)));
    assert_eq!(app.playback.elapsed, Duration::from_secs(9));
    assert_eq!(app.playback.index, Some(1));
}

#[test]
fn gesture_status_is_read_from_the_handle() {
    let mut app = app();
    assert!(app.gesture_status().is_none());
    let handle = Arc::new(Mutex::new(GestureStatus {
        running: true,
        label: Some("Next".into()),
        progress: 0.5,
        last_fired: Some(Action::Next),
    }));
    app.set_gesture_handle(handle);
    let status = app.gesture_status().unwrap();
    assert_eq!(status.label.as_deref(), Some("Next"));
    assert_eq!(status.progress, 0.5);
}
