//! Terminal rendering with `ratatui`: a title bar, the status box, the track
//! list and a key legend.

use std::ops::Range;
use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize},
    widgets::{Block, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::config::{ControlsSettings, TimeField, UiSettings};
use crate::gesture::GestureStatus;
use crate::library::track_text;

/// Key legend entries that do not depend on configuration.
const FIXED_KEYS: [(&str, &str); 5] = [
    ("j/k", "up/down"),
    ("h/l", "prev/next song"),
    ("enter", "play selected song"),
    ("space/p", "play/pause"),
    ("q", "quit"),
];

fn controls_text(controls: &ControlsSettings) -> String {
    let scrub = format!("[H/L] scrub -/+{}s", controls.scrub_seconds);
    let volume = format!("[+/-] volume {}%", (controls.volume_step * 100.0).round());
    let mut entries: Vec<String> = FIXED_KEYS
        .iter()
        .map(|(key, what)| format!("[{key}] {what}"))
        .collect();
    entries.insert(2, scrub);
    entries.insert(3, volume);
    entries.join(" | ")
}

fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Elapsed/total/remaining in the configured order. Fields that need an
/// unknown duration are left out.
fn time_text(elapsed: Duration, total: Option<Duration>, ui: &UiSettings) -> Option<String> {
    let parts: Vec<String> = ui
        .time_fields
        .iter()
        .filter_map(|field| match field {
            TimeField::Elapsed => Some(format_mmss(elapsed)),
            TimeField::Total => total.map(format_mmss),
            TimeField::Remaining => total.map(|t| format!("-{}", format_mmss(t.saturating_sub(elapsed)))),
        })
        .collect();
    (!parts.is_empty()).then(|| parts.join(&ui.time_separator))
}

/// `[#####.....]` style bar for confirmation progress.
fn progress_bar(progress: f32, width: usize) -> String {
    let filled = ((progress.clamp(0.0, 1.0) * width as f32).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

fn gesture_text(status: &GestureStatus) -> String {
    if !status.running {
        return "GESTURE: off".to_string();
    }
    match status.label.as_deref() {
        Some(label) => format!("GESTURE: {} {}", label, progress_bar(status.progress, 10)),
        None => "GESTURE: waiting".to_string(),
    }
}

/// Everything shown in the status box, in display order.
fn status_parts(app: &App, ui: &UiSettings) -> Vec<String> {
    let cursor = if app.follow_playback { "Follow" } else { "Free-roam" };
    let mut parts = vec![format!(" CURSOR: {cursor}")];

    let info = &app.playback;
    match info.index.and_then(|i| app.tracks.get(i)) {
        Some(track) => {
            let song = track_text(track, &ui.status_fields, &ui.status_separator);
            let total = info.duration.or(track.duration);
            parts.push(match time_text(info.elapsed, total, ui) {
                Some(time) => format!("Song: {song} [{time}]"),
                None => format!("Song: {song}"),
            });
            parts.push(if info.is_playing { "Playing" } else { "Paused" }.to_string());
        }
        None => parts.push("Stopped".to_string()),
    }

    parts.push(format!("Volume: {}%", (info.volume * 100.0).round()));
    parts.extend(app.gesture_status().map(|s| gesture_text(&s)));
    parts.extend(app.last_failure.as_ref().map(|e| format!("Error: {e}")));
    parts.extend(app.current_dir.as_ref().map(|d| format!("Dir: {d}")));
    parts
}

/// Rows of a `len`-long list that fit in `height`, keeping `selected` centred
/// where possible.
fn visible_window(len: usize, selected: usize, height: usize) -> Range<usize> {
    if height == 0 || len <= height {
        return 0..len;
    }
    let start = selected.saturating_sub(height / 2).min(len - height);
    start..start + height
}

fn left_padded(title: &str) -> Block<'_> {
    Block::bordered()
        .title(title)
        .padding(Padding::left(1))
}

fn render_tracks(frame: &mut Frame, area: Rect, app: &App) {
    let len = app.tracks.len();
    let selected = app.selected.min(len.saturating_sub(1));
    let window = visible_window(len, selected, area.height as usize);

    let playing = app.playback.index;
    let items: Vec<ListItem> = app.tracks[window.clone()]
        .iter()
        .zip(window.clone())
        .map(|(track, i)| {
            let item = ListItem::new(track.display.as_str());
            if playing == Some(i) {
                item.style(Style::default().add_modifier(Modifier::BOLD))
            } else {
                item
            }
        })
        .collect();

    let list = List::new(items)
        .block(Block::bordered().title(" tracks "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if len > 0 {
        state.select(Some(selected - window.start));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

/// Draw one frame.
pub fn draw(frame: &mut Frame, app: &App, ui_settings: &UiSettings, controls_settings: &ControlsSettings) {
    let [header, status, tracks, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(5),
        Constraint::Min(1),
        Constraint::Length(4),
    ])
    .areas(frame.area());

    frame.render_widget(
        Paragraph::new(ui_settings.title.as_str())
            .alignment(Alignment::Center)
            .block(Block::bordered().title(" maestro ").title_alignment(Alignment::Center)),
        header,
    );
    frame.render_widget(
        Paragraph::new(status_parts(app, ui_settings).join(" • "))
            .slow_blink()
            .block(left_padded(" status "))
            .wrap(Wrap { trim: true }),
        status,
    );
    render_tracks(frame, tracks, app);
    frame.render_widget(
        Paragraph::new(controls_text(controls_settings))
            .block(left_padded(" controls "))
            .wrap(Wrap { trim: true }),
        footer,
    );
}
