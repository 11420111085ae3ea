use std::path::PathBuf;
use std::sync::Arc;

use crate::app::App;
use crate::audio::{AudioEngine, RodioEngine, SilentEngine};
use crate::config;
use crate::gesture::{self, StabilizerConfig};
use crate::now_playing::mpris::{self, MprisService};
use crate::now_playing::{Detached, NowPlaying};
use crate::playback::{Action, Dispatcher};

/// Open the default output device. Without one, playback runs against a
/// silent engine whose loads fail, and the problem is logged once.
pub fn open_engine(settings: &config::PlaybackSettings) -> Box<dyn AudioEngine> {
    match RodioEngine::open(settings.initial_volume) {
        Ok(engine) => Box::new(engine),
        Err(e) => {
            log::error!("audio: {e}");
            Box::new(SilentEngine::new(e.to_string()))
        }
    }
}

/// The now-playing surface handed to the core, plus the MPRIS service to start
/// once the dispatcher exists.
pub fn now_playing(settings: &config::RemoteSettings) -> (Box<dyn NowPlaying>, Option<MprisService>) {
    if settings.mpris {
        let (handle, service) = mpris::channel();
        (Box::new(handle), Some(service))
    } else {
        (Box::new(Detached), None)
    }
}

/// Start the gesture feed when a source is configured.
pub fn start_gestures(
    source: Option<PathBuf>,
    settings: &config::GestureSettings,
    app: &mut App,
    dispatcher: &Dispatcher,
) {
    let Some(source) = source else {
        log::info!("gesture: no observation source configured");
        return;
    };
    let handle = gesture::spawn_feed(
        source,
        StabilizerConfig::from(settings),
        Arc::new(dispatcher.sink()),
    );
    app.set_gesture_handle(handle);
}

pub fn apply_playback_defaults(dispatcher: &Dispatcher, settings: &config::Settings) {
    if settings.playback.autoplay {
        if let Err(e) = dispatcher.submit(Action::Play) {
            log::warn!("runtime: autoplay rejected: {e}");
        }
    }
}
