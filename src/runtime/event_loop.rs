use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::config;
use crate::playback::{Action, ActionSink, CommandSink, PlaybackEvent};
use crate::ui;

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyCommand {
    Quit,
    Submit(Action),
    /// Handled inside the app model.
    Handled,
    Ignored,
}

/// Main terminal event loop: drains playback events, draws, and turns keys
/// into actions. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    sink: &CommandSink,
    events: &Receiver<PlaybackEvent>,
    quit: &Receiver<()>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        for ev in events.try_iter() {
            app.on_event(ev);
        }

        terminal.draw(|f| ui::draw(f, app, &settings.ui, &settings.controls))?;

        match quit.try_recv() {
            Ok(()) => {
                log::info!("runtime: quit requested over mpris");
                return Ok(());
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => {}
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match handle_key_event(key, settings, app) {
                    KeyCommand::Quit => return Ok(()),
                    KeyCommand::Submit(action) => {
                        if let Err(e) = sink.accepts(action) {
                            log::warn!("runtime: {action:?} rejected: {e}");
                            app.last_failure = Some(e.to_string());
                        }
                    }
                    KeyCommand::Handled | KeyCommand::Ignored => {}
                }
            }
        }
    }
}

pub fn handle_key_event(key: KeyEvent, settings: &config::Settings, app: &mut App) -> KeyCommand {
    let scrub = Duration::from_secs(settings.controls.scrub_seconds);
    let step = settings.controls.volume_step;

    match key.code {
        KeyCode::Char('q') => KeyCommand::Quit,
        KeyCode::Char('j') => {
            app.follow_playback_off();
            app.next();
            KeyCommand::Handled
        }
        KeyCode::Char('k') => {
            app.follow_playback_off();
            app.prev();
            KeyCommand::Handled
        }
        KeyCode::Enter => {
            if !app.has_tracks() {
                return KeyCommand::Ignored;
            }
            let is_playing_selected =
                app.playback.is_playing && app.playback.index == Some(app.selected);
            if is_playing_selected {
                return KeyCommand::Ignored;
            }
            app.follow_playback_on();
            app.set_pending_follow_index(app.selected);
            KeyCommand::Submit(Action::PlayIndex(app.selected))
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            app.follow_playback_on();
            KeyCommand::Submit(Action::Toggle)
        }
        KeyCode::Char('l') => {
            app.follow_playback_on();
            KeyCommand::Submit(Action::Next)
        }
        KeyCode::Char('h') => {
            app.follow_playback_on();
            KeyCommand::Submit(Action::Previous)
        }
        KeyCode::Char('L') => KeyCommand::Submit(Action::SeekForward(scrub)),
        KeyCode::Char('H') => KeyCommand::Submit(Action::SeekBackward(scrub)),
        KeyCode::Char('+') | KeyCode::Char('=') => KeyCommand::Submit(Action::StepVolume(step)),
        KeyCode::Char('-') => KeyCommand::Submit(Action::StepVolume(-step)),
        _ => KeyCommand::Ignored,
    }
}
