//! Frame-processing context: reads classified observations, runs them through
//! the stabilizer and submits confirmed actions.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use serde::Deserialize;

use crate::playback::{Action, ActionSink};

use super::stabilizer::{Stabilizer, StabilizerConfig};
use super::types::GestureObservation;

/// What the UI shows about gesture detection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GestureStatus {
    pub running: bool,
    pub label: Option<String>,
    pub progress: f32,
    pub last_fired: Option<Action>,
}

pub type GestureHandle = Arc<Mutex<GestureStatus>>;

#[derive(Deserialize)]
struct WireObservation {
    label: String,
    confidence: f32,
    /// Seconds.
    #[serde(default)]
    timestamp: Option<f64>,
}

/// Parse one JSON line. Frames without a usable timestamp get `fallback`.
pub fn parse_line(line: &str, fallback: Duration) -> Option<GestureObservation> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let wire: WireObservation = match serde_json::from_str(line) {
        Ok(w) => w,
        Err(e) => {
            debug!("gesture: skipping malformed line: {e}");
            return None;
        }
    };
    let timestamp = wire
        .timestamp
        .and_then(|t| Duration::try_from_secs_f64(t).ok())
        .unwrap_or(fallback);
    Some(GestureObservation::new(wire.label, wire.confidence, timestamp))
}

/// Run the feed until end of input. Returns the number of accepted actions.
/// Lines that are not valid UTF-8 are decoded lossily and skipped like any
/// other malformed frame; only read errors end the feed.
pub fn run_feed<R: BufRead>(
    mut reader: R,
    stabilizer: &mut Stabilizer,
    sink: &dyn ActionSink,
    status: &GestureHandle,
) -> io::Result<usize> {
    let started = Instant::now();
    let mut accepted = 0;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let Some(observation) = parse_line(&line, started.elapsed()) else {
            continue;
        };
        let fired = stabilizer.observe(&observation);
        if let Some(action) = fired {
            match sink.accepts(action) {
                Ok(()) => accepted += 1,
                Err(e) => warn!("gesture: {action:?} rejected: {e}"),
            }
        }
        if let Ok(mut s) = status.lock() {
            s.label = stabilizer.candidate().map(|c| c.label.clone());
            s.progress = stabilizer.progress();
            if fired.is_some() {
                s.last_fired = fired;
            }
        }
    }
    Ok(accepted)
}

/// Read observations from `source` (a file or FIFO) on a background thread.
pub fn spawn_feed(
    source: PathBuf,
    config: StabilizerConfig,
    sink: Arc<dyn ActionSink>,
) -> GestureHandle {
    let status: GestureHandle = Arc::new(Mutex::new(GestureStatus {
        running: true,
        ..GestureStatus::default()
    }));
    let handle = status.clone();
    thread::spawn(move || {
        info!("gesture: reading observations from {}", source.display());
        let result = File::open(&source).and_then(|f| {
            let mut stabilizer = Stabilizer::new(config);
            run_feed(BufReader::new(f), &mut stabilizer, sink.as_ref(), &status)
        });
        match result {
            Ok(n) => info!("gesture: feed ended after {n} actions"),
            Err(e) => error!("gesture: feed {} failed: {e}", source.display()),
        }
        if let Ok(mut s) = status.lock() {
            s.running = false;
            s.progress = 0.0;
        }
    });
    handle
}
