//! MPRIS (D-Bus) bridge.
//!
//! Mirrors pushed snapshots into `org.mpris.MediaPlayer2.Player` properties and
//! turns incoming method calls into `Action`s for the dispatcher. A call returns
//! a D-Bus error when the dispatcher does not accept the action.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_io::{Timer, block_on};
use zbus::object_server::SignalEmitter;
use zbus::{Connection, fdo, interface};
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};

use crate::playback::{Action, ActionSink, PlaybackHandle};

use super::{ElapsedKind, NowPlaying, NowPlayingInfo, TransportStatus};

const MPRIS_PATH: &str = "/org/mpris/MediaPlayer2";
const BUS_NAME: &str = "org.mpris.MediaPlayer2.maestro";

#[derive(Debug, Default)]
struct SharedState {
    playback: TransportStatus,
    title: Option<String>,
    artist: Vec<String>,
    album: Option<String>,
    url: Option<String>,
    art_url: Option<String>,
    length_micros: Option<i64>,
    track_id: Option<OwnedObjectPath>,
}

/// What the service loop should tell D-Bus clients about.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Notice {
    Properties,
    Volume,
    Seeked(i64),
}

/// Notices collapsed between two emission rounds.
#[derive(Debug, Default, PartialEq)]
struct Pending {
    properties: bool,
    volume: bool,
    seeked: Option<i64>,
}

impl Pending {
    /// Take everything queued so far. `None` once the core side is gone.
    fn drain(notices: &Receiver<Notice>) -> Option<Self> {
        let mut pending = Self::default();
        loop {
            match notices.try_recv() {
                Ok(Notice::Properties) => pending.properties = true,
                Ok(Notice::Volume) => pending.volume = true,
                Ok(Notice::Seeked(pos)) => pending.seeked = Some(pos),
                Err(TryRecvError::Empty) => return Some(pending),
                Err(TryRecvError::Disconnected) => return None,
            }
        }
    }

    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn micros(d: Duration) -> i64 {
    d.as_micros().min(i64::MAX as u128) as i64
}

fn file_url(path: &std::path::Path) -> String {
    format!("file://{}", path.display())
}

/// Core-side half: implements `NowPlaying` by updating the shared state.
pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
    notify: Sender<Notice>,
}

impl NowPlaying for MprisHandle {
    fn publish(&self, info: &NowPlayingInfo) {
        if let Ok(mut s) = self.state.lock() {
            s.playback = info.status;
            s.title = info.title.clone();
            s.artist = info.artist.iter().cloned().collect();
            s.album = info.album.clone();
            s.url = info.media.as_deref().map(file_url);
            s.art_url = info.artwork.as_deref().map(file_url);
            s.length_micros = info.duration.map(micros);
            s.track_id = info.track_id.and_then(|id| {
                ObjectPath::try_from(format!("{MPRIS_PATH}/track/{id}"))
                    .ok()
                    .map(OwnedObjectPath::from)
            });
        }
        let _ = self.notify.send(Notice::Properties);
    }

    fn publish_elapsed(&self, elapsed: Duration, kind: ElapsedKind) {
        // Position is read from the playback handle on demand; only seeks are signalled.
        if kind == ElapsedKind::Seek {
            let _ = self.notify.send(Notice::Seeked(micros(elapsed)));
        }
    }

    fn publish_volume(&self, _volume: f32) {
        // The property reads the playback handle; only the change is signalled.
        let _ = self.notify.send(Notice::Volume);
    }
}

/// Service-side half, started once the dispatcher exists.
pub struct MprisService {
    state: Arc<Mutex<SharedState>>,
    notices: Receiver<Notice>,
}

/// Create the two halves of the bridge.
pub fn channel() -> (MprisHandle, MprisService) {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify, notices) = mpsc::channel();
    (
        MprisHandle {
            state: state.clone(),
            notify,
        },
        MprisService { state, notices },
    )
}

struct RootIface {
    quit: Sender<()>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No-op for TUI.
    }

    fn quit(&self) {
        let _ = self.quit.send(());
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "maestro"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    sink: Arc<dyn ActionSink>,
    state: Arc<Mutex<SharedState>>,
    playback: PlaybackHandle,
}

impl PlayerIface {
    fn submit(&self, action: Action) -> fdo::Result<()> {
        self.sink.accepts(action).map_err(|e| {
            log::warn!("mpris: {action:?} rejected: {e}");
            fdo::Error::Failed(e.to_string())
        })
    }

    fn elapsed(&self) -> Duration {
        self.playback
            .lock()
            .map(|s| s.elapsed)
            .unwrap_or(Duration::ZERO)
    }
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) -> fdo::Result<()> {
        self.submit(Action::Next)
    }

    fn previous(&self) -> fdo::Result<()> {
        self.submit(Action::Previous)
    }

    fn play(&self) -> fdo::Result<()> {
        self.submit(Action::Play)
    }

    fn pause(&self) -> fdo::Result<()> {
        self.submit(Action::Pause)
    }

    fn play_pause(&self) -> fdo::Result<()> {
        self.submit(Action::Toggle)
    }

    fn stop(&self) -> fdo::Result<()> {
        self.submit(Action::Stop)
    }

    /// Relative seek in microseconds, measured when the core applies it.
    fn seek(&self, offset: i64) -> fdo::Result<()> {
        let by = Duration::from_micros(offset.unsigned_abs());
        self.submit(if offset < 0 {
            Action::SeekBackward(by)
        } else {
            Action::SeekForward(by)
        })
    }

    fn set_position(&self, track_id: ObjectPath<'_>, position: i64) -> fdo::Result<()> {
        let current = self.state.lock().ok().and_then(|s| s.track_id.clone());
        // Per MPRIS, stale track ids and negative positions are ignored.
        if current.as_ref().map(|p| p.as_str()) != Some(track_id.as_str()) || position < 0 {
            return Ok(());
        }
        self.submit(Action::Seek(Duration::from_micros(position as u64)))
    }

    #[zbus(signal)]
    async fn seeked(emitter: &SignalEmitter<'_>, position: i64) -> zbus::Result<()>;

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.playback {
            TransportStatus::Stopped => "Stopped",
            TransportStatus::Playing => "Playing",
            TransportStatus::Paused => "Paused",
        }
    }

    #[zbus(property)]
    fn rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn position(&self) -> i64 {
        micros(self.elapsed())
    }

    #[zbus(property)]
    fn volume(&self) -> f64 {
        self.playback.lock().map(|s| s.volume as f64).unwrap_or(1.0)
    }

    #[zbus(property)]
    fn set_volume(&mut self, value: f64) -> fdo::Result<()> {
        self.submit(Action::SetVolume(value as f32))
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        let mut put = |key: &str, value: Value<'_>| {
            if let Ok(v) = OwnedValue::try_from(value) {
                map.insert(key.to_string(), v);
            }
        };

        if let Some(id) = &s.track_id {
            put("mpris:trackid", Value::from(id.clone().into_inner()));
        }
        put("xesam:title", Value::from(s.title.clone().unwrap_or_default()));
        if !s.artist.is_empty() {
            put("xesam:artist", Value::from(s.artist.clone()));
        }
        if let Some(album) = &s.album {
            put("xesam:album", Value::from(album.clone()));
        }
        if let Some(url) = &s.url {
            put("xesam:url", Value::from(url.clone()));
        }
        if let Some(art) = &s.art_url {
            put("mpris:artUrl", Value::from(art.clone()));
        }
        if let Some(len) = s.length_micros {
            put("mpris:length", Value::from(len));
        }
        map
    }
}

impl MprisService {
    /// Register on the session bus from a background thread. Failures are logged
    /// and leave the rest of the app running without a remote surface.
    pub fn spawn(self, sink: Arc<dyn ActionSink>, playback: PlaybackHandle, quit: Sender<()>) {
        let MprisService { state, notices } = self;
        std::thread::spawn(move || {
            block_on(async move {
                let connection = match Connection::session().await {
                    Ok(c) => c,
                    Err(e) => {
                        log::warn!("mpris: failed to connect to session bus: {e}");
                        return;
                    }
                };

                if let Err(e) = connection.request_name(BUS_NAME).await {
                    log::warn!("mpris: failed to acquire name: {e}");
                    return;
                }

                let object_server = connection.object_server();

                if let Err(e) = object_server.at(MPRIS_PATH, RootIface { quit }).await {
                    log::warn!("mpris: failed to register root iface: {e}");
                    return;
                }

                let player = PlayerIface {
                    sink,
                    state,
                    playback,
                };
                if let Err(e) = object_server.at(MPRIS_PATH, player).await {
                    log::warn!("mpris: failed to register player iface: {e}");
                    return;
                }
                log::info!("mpris: registered as {BUS_NAME}");

                loop {
                    Timer::after(Duration::from_millis(100)).await;

                    let Some(pending) = Pending::drain(&notices) else {
                        return;
                    };
                    if pending.is_empty() {
                        continue;
                    }

                    let iface = match object_server
                        .interface::<_, PlayerIface>(MPRIS_PATH)
                        .await
                    {
                        Ok(iface) => iface,
                        Err(e) => {
                            log::warn!("mpris: player iface lookup failed: {e}");
                            continue;
                        }
                    };
                    let emitter = iface.signal_emitter();
                    if pending.properties || pending.volume {
                        let player = iface.get().await;
                        if pending.properties {
                            let _ = player.playback_status_changed(emitter).await;
                            let _ = player.metadata_changed(emitter).await;
                        }
                        if pending.volume {
                            let _ = player.volume_changed(emitter).await;
                        }
                    }
                    if let Some(pos) = pending.seeked {
                        let _ = PlayerIface::seeked(emitter, pos).await;
                    }
                }
            });
        });
    }
}
