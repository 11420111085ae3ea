use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::*;
use crate::playback::{Action, ActionSink, Rejected};

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn obs(label: &str, confidence: f32, at_ms: u64) -> GestureObservation {
    GestureObservation::new(label, confidence, ms(at_ms))
}

/// Feed `label` every `step` ms over `[from, to]` and collect what fired.
fn hold(s: &mut Stabilizer, label: &str, from: u64, to: u64, step: u64) -> Vec<Action> {
    (from..=to)
        .step_by(step as usize)
        .filter_map(|t| s.observe(&obs(label, 0.95, t)))
        .collect()
}

#[test]
fn fires_once_after_confirmation_window() {
    let mut s = Stabilizer::default();
    assert_eq!(s.observe(&obs("Next", 0.95, 0)), None);
    assert_eq!(s.observe(&obs("Next", 0.95, 1000)), None);
    assert_eq!(s.observe(&obs("Next", 0.95, 2100)), Some(Action::Next));
}

#[test]
fn boundary_is_inclusive() {
    let mut s = Stabilizer::default();
    s.observe(&obs("Previous", 0.95, 500));
    assert_eq!(s.observe(&obs("Previous", 0.95, 2499)), None);
    assert_eq!(s.observe(&obs("Previous", 0.95, 2500)), Some(Action::Previous));
}

#[test]
fn sustained_gesture_does_not_refire() {
    let mut s = Stabilizer::default();
    // 10 s at roughly 30 frames per second.
    let fired = hold(&mut s, "Next", 0, 10_000, 33);
    assert_eq!(fired, [Action::Next]);
}

#[test]
fn different_label_rearms_the_latch() {
    let mut s = Stabilizer::default();
    assert_eq!(hold(&mut s, "Next", 0, 2000, 100), [Action::Next]);
    assert_eq!(s.observe(&obs("Unknown", 0.99, 2100)), None);
    assert_eq!(hold(&mut s, "Next", 2200, 4200, 100), [Action::Next]);
}

#[test]
fn single_interrupting_frame_resets_progress() {
    let mut s = Stabilizer::default();
    assert!(hold(&mut s, "Play", 0, 1900, 100).is_empty());
    assert_eq!(s.observe(&obs("Next", 0.95, 1950)), None);
    // Play restarts at 2000 and needs a full window from there.
    assert!(hold(&mut s, "Play", 2000, 3900, 100).is_empty());
    assert_eq!(s.observe(&obs("Play", 0.95, 4000)), Some(Action::Toggle));
}

#[test]
fn low_confidence_frame_counts_as_unknown() {
    let mut s = Stabilizer::default();
    assert!(hold(&mut s, "Next", 0, 1500, 100).is_empty());
    assert_eq!(s.observe(&obs("Next", 0.5, 1600)), None);
    assert_eq!(s.candidate().unwrap().label, UNKNOWN_LABEL);
    assert_eq!(s.observe(&obs("Next", 0.95, 2100)), None);
    assert_eq!(s.candidate().unwrap().first_observed_at, ms(2100));
}

#[test]
fn nan_confidence_is_rejected_by_the_gate() {
    let o = obs("Next", f32::NAN, 0);
    assert_eq!(gate(&o, 0.9), (UNKNOWN_LABEL, Gate::LowConfidence));
    let o = obs(" Next ", 0.9, 0);
    assert_eq!(gate(&o, 0.9), ("Next", Gate::Accepted));
}

#[test]
fn low_confidence_stream_never_fires() {
    let mut s = Stabilizer::default();
    let fired: Vec<_> = (0..=5000)
        .step_by(50)
        .filter_map(|t| s.observe(&obs("Next", 0.89, t)))
        .collect();
    assert!(fired.is_empty());
}

#[test]
fn unrecognized_label_is_tracked_but_silent() {
    let mut s = Stabilizer::default();
    assert!(hold(&mut s, "Thumbs Sideways", 0, 5000, 100).is_empty());
    assert_eq!(s.progress(), 0.0);
    assert_eq!(s.candidate().unwrap().first_observed_at, ms(0));

    // Switching to a known gesture starts its window at the switch.
    assert!(hold(&mut s, "Next", 5100, 7000, 100).is_empty());
    assert_eq!(s.observe(&obs("Next", 0.95, 7100)), Some(Action::Next));
}

#[test]
fn labels_match_case_insensitively() {
    let mut s = Stabilizer::default();
    s.observe(&obs("volume up", 0.95, 0));
    assert_eq!(
        s.observe(&obs("Volume Up", 0.95, 2000)),
        Some(Action::StepVolume(0.1))
    );
}

#[test]
fn gesture_kinds_map_to_actions() {
    assert_eq!(GestureKind::from_label("pause"), Some(GestureKind::PlayPause));
    assert_eq!(GestureKind::from_label("  NEXT"), Some(GestureKind::Next));
    assert_eq!(GestureKind::from_label("Unknown"), None);
    assert_eq!(GestureKind::PlayPause.action(0.2), Action::Toggle);
    assert_eq!(GestureKind::VolumeDown.action(0.2), Action::StepVolume(-0.2));
}

#[test]
fn progress_tracks_the_window() {
    let mut s = Stabilizer::default();
    assert_eq!(s.progress(), 0.0);
    s.observe(&obs("Next", 0.95, 0));
    s.observe(&obs("Next", 0.95, 1000));
    assert!((s.progress() - 0.5).abs() < 1e-6);
    s.observe(&obs("Next", 0.95, 2000));
    assert_eq!(s.progress(), 1.0);
}

#[test]
fn config_comes_from_settings() {
    let settings = crate::config::GestureSettings {
        confidence_threshold: 0.5,
        confirmation_ms: 300,
        volume_step: 0.25,
        ..Default::default()
    };
    let mut s = Stabilizer::new(StabilizerConfig::from(&settings));
    s.observe(&obs("Volume Down", 0.6, 0));
    assert_eq!(
        s.observe(&obs("Volume Down", 0.6, 300)),
        Some(Action::StepVolume(-0.25))
    );
}

#[test]
fn parse_line_reads_json_observations() {
    let o = parse_line(r#"{"label": "Next", "confidence": 0.97, "timestamp": 12.5}"#, ms(1)).unwrap();
    assert_eq!(o, GestureObservation::new("Next", 0.97, ms(12_500)));

    let o = parse_line(r#"{"label": "Play", "confidence": 1.0}"#, ms(7)).unwrap();
    assert_eq!(o.timestamp, ms(7));

    let o = parse_line(r#"{"label": "Play", "confidence": 1.0, "timestamp": -3}"#, ms(7)).unwrap();
    assert_eq!(o.timestamp, ms(7));

    assert!(parse_line("", ms(0)).is_none());
    assert!(parse_line("not json", ms(0)).is_none());
    assert!(parse_line(r#"{"confidence": 0.9}"#, ms(0)).is_none());
}

#[derive(Default)]
struct RecordingSink {
    actions: Mutex<Vec<Action>>,
    closed: bool,
}

impl ActionSink for RecordingSink {
    fn accepts(&self, action: Action) -> Result<(), Rejected> {
        if self.closed {
            return Err(Rejected::Closed);
        }
        self.actions.lock().unwrap().push(action);
        Ok(())
    }
}

fn feed_text() -> String {
    let mut lines = Vec::new();
    for i in 0..=25 {
        lines.push(format!(
            r#"{{"label": "Next", "confidence": 0.95, "timestamp": {}}}"#,
            i as f64 * 0.1
        ));
    }
    lines.push("garbage".to_string());
    for i in 26..=50 {
        lines.push(format!(
            r#"{{"label": "Volume Up", "confidence": 0.95, "timestamp": {}}}"#,
            i as f64 * 0.1
        ));
    }
    lines.join("\n")
}

#[test]
fn run_feed_submits_confirmed_actions() {
    let sink = RecordingSink::default();
    let status: GestureHandle = Arc::new(Mutex::new(GestureStatus::default()));
    let mut s = Stabilizer::default();

    let accepted = run_feed(Cursor::new(feed_text()), &mut s, &sink, &status).unwrap();

    assert_eq!(accepted, 2);
    assert_eq!(
        *sink.actions.lock().unwrap(),
        [Action::Next, Action::StepVolume(0.1)]
    );
    let status = status.lock().unwrap();
    assert_eq!(status.label.as_deref(), Some("Volume Up"));
    assert_eq!(status.last_fired, Some(Action::StepVolume(0.1)));
    assert_eq!(status.progress, 1.0);
}

#[test]
fn run_feed_survives_rejections() {
    let sink = RecordingSink {
        closed: true,
        ..Default::default()
    };
    let status: GestureHandle = Arc::new(Mutex::new(GestureStatus::default()));
    let mut s = Stabilizer::default();

    let accepted = run_feed(Cursor::new(feed_text()), &mut s, &sink, &status).unwrap();
    assert_eq!(accepted, 0);
    assert!(sink.actions.lock().unwrap().is_empty());
}

#[test]
fn invalid_utf8_line_is_skipped_and_the_feed_keeps_going() {
    let mut bytes = Vec::new();
    for i in 0..=25 {
        if i == 10 {
            bytes.extend_from_slice(b"\xff\xfe{\"label\": \"Next\"}\n");
        }
        bytes.extend_from_slice(
            format!(r#"{{"label": "Next", "confidence": 0.95, "timestamp": {}}}"#, i as f64 * 0.1)
                .as_bytes(),
        );
        bytes.push(b'\n');
    }
    let sink = RecordingSink::default();
    let status: GestureHandle = Arc::new(Mutex::new(GestureStatus::default()));
    let mut s = Stabilizer::default();

    let accepted = run_feed(Cursor::new(bytes), &mut s, &sink, &status).unwrap();

    assert_eq!(accepted, 1);
    assert_eq!(*sink.actions.lock().unwrap(), [Action::Next]);
}

#[test]
fn spawn_feed_reads_a_file_and_marks_itself_done() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frames.jsonl");
    std::fs::write(&path, feed_text()).unwrap();
    let sink = Arc::new(RecordingSink::default());

    let handle = spawn_feed(path, StabilizerConfig::default(), sink.clone());
    for _ in 0..200 {
        if !handle.lock().unwrap().running {
            break;
        }
        std::thread::sleep(ms(10));
    }

    assert!(!handle.lock().unwrap().running);
    assert_eq!(sink.actions.lock().unwrap().len(), 2);
}

#[test]
fn unknown_frame_restarts_the_window_at_the_next_sighting() {
    let mut s = Stabilizer::default();
    let frames = [
        obs("Next", 0.95, 0),
        obs("Unknown", 0.3, 1000),
        obs("Next", 0.95, 1100),
        obs("Next", 0.95, 3000),
        obs("Next", 0.95, 3100),
    ];
    let fired: Vec<_> = frames.iter().map(|o| s.observe(o)).collect();
    assert_eq!(fired, [None, None, None, None, Some(Action::Next)]);
}
