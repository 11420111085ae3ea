use std::env;
use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::library::{Track, scan};
use crate::logging;
use crate::playback::Dispatcher;

mod event_loop;
mod settings;
mod startup;

/// Usage: `maestro [MUSIC_DIR] [GESTURE_SOURCE]`.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, problem) = settings::load_settings();

    match logging::init(&settings.log) {
        Ok(Some(path)) => log::info!("maestro starting, logging to {}", path.display()),
        Ok(None) => {}
        Err(e) => eprintln!("maestro: could not open log file: {e}"),
    }
    if let Some(problem) = problem {
        log::warn!("config: {problem}");
        eprintln!("maestro: {problem}");
    }

    let mut args = env::args().skip(1);
    let dir = args.next().unwrap_or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|p| p.to_str().map(|s| s.to_string()))
            .unwrap_or_else(|| "Music".to_string())
    });
    let gesture_source = args
        .next()
        .map(PathBuf::from)
        .or_else(|| settings.gestures.source.clone());

    let tracks: Arc<[Track]> = scan(Path::new(&dir), &settings.library).into();

    let engine = startup::open_engine(&settings.playback);
    let (now_playing, mpris) = startup::now_playing(&settings.remote);
    let dispatcher = Dispatcher::spawn(tracks.clone(), engine, now_playing, &settings.playback);
    let events = dispatcher.subscribe();

    let (quit_tx, quit_rx) = mpsc::channel::<()>();
    if let Some(service) = mpris {
        service.spawn(Arc::new(dispatcher.sink()), dispatcher.handle(), quit_tx);
    }

    let mut app = App::new(tracks);
    app.follow_playback = settings.ui.follow_playback;
    app.set_current_dir(dir.clone());

    startup::start_gestures(gesture_source, &settings.gestures, &mut app, &dispatcher);
    startup::apply_playback_defaults(&dispatcher, &settings);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let sink = dispatcher.sink();
    let run_result = event_loop::run(&mut terminal, &settings, &mut app, &sink, &events, &quit_rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Let anything the user queued right before quitting land first.
    if let Err(e) = sink.sync() {
        log::warn!("runtime: {e}");
    }
    dispatcher.shutdown(Duration::from_millis(settings.audio.quit_fade_out_ms));
    log::info!("maestro stopped");

    run_result
}
