//! MPRIS transport controls.
//!
//! Media keys and desktop widgets reach the player over the session bus as
//! `ControlCmd`s on the runtime's control channel. The runtime publishes a
//! "now playing" projection back through `TransportHandle`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_io::{Timer, block_on};
use tracing::{debug, info, warn};
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedValue, Value};

use crate::config::TransportSettings;
use crate::store::PlaylistState;
use crate::sync::{PlaybackView, SampleView};

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Next,
    Prev,
}

/// What the desktop sees of the current track.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NowPlaying {
    pub index: usize,
    pub title: String,
    pub artwork_uri: Option<String>,
}

impl NowPlaying {
    /// Project the current track, or `None` while the playlist is empty.
    pub fn compose(
        state: &PlaylistState,
        view: &PlaybackView,
        settings: &TransportSettings,
    ) -> Option<Self> {
        let track = state.current_track()?;

        let artwork_uri = if settings.artwork_uri.is_empty() {
            match &view.sample {
                SampleView::Resolved(meta) => meta.album_art_uri.clone(),
                _ => None,
            }
        } else {
            Some(settings.artwork_uri.clone())
        };

        Some(Self {
            index: state.current_index(),
            title: format!("{}{}", track.title, settings.now_playing_suffix),
            artwork_uri,
        })
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl PlaybackStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "Stopped",
            Self::Playing => "Playing",
            Self::Paused => "Paused",
        }
    }
}

#[derive(Debug, Default)]
struct SharedState {
    status: PlaybackStatus,
    now: Option<NowPlaying>,
    /// Set by `publish`, cleared once the change has been signalled.
    dirty: bool,
}

/// Registration of the MPRIS service. Dropping it takes the player off the
/// bus.
pub struct TransportHandle {
    state: Arc<Mutex<SharedState>>,
    shutdown: Arc<AtomicBool>,
}

impl TransportHandle {
    fn detached() -> Self {
        Self {
            state: Arc::new(Mutex::new(SharedState::default())),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn publish(&self, now: Option<&NowPlaying>, is_playing: bool) {
        let status = match (now, is_playing) {
            (None, _) => PlaybackStatus::Stopped,
            (Some(_), true) => PlaybackStatus::Playing,
            (Some(_), false) => PlaybackStatus::Paused,
        };
        if let Ok(mut s) = self.state.lock() {
            s.status = status;
            s.now = now.cloned();
            s.dirty = true;
        }
    }
}

impl Drop for TransportHandle {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {}

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
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
        "beatcard"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec![]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Prev);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    // The showcase has no stopped state to go to.
    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        self.state
            .lock()
            .map_or(PlaybackStatus::Stopped, |s| s.status)
            .as_str()
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
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let now = self.state.lock().ok().and_then(|s| s.now.clone());
        metadata_map(now.as_ref())
    }
}

fn owned(value: Value<'_>) -> Option<OwnedValue> {
    OwnedValue::try_from(value).ok()
}

/// MPRIS metadata for `now`. Empty while nothing is loaded.
fn metadata_map(now: Option<&NowPlaying>) -> HashMap<String, OwnedValue> {
    let mut map = HashMap::new();
    let Some(now) = now else {
        return map;
    };

    let track_path = format!("{OBJECT_PATH}/track/{}", now.index);
    if let Some(v) = ObjectPath::try_from(track_path)
        .ok()
        .and_then(|p| owned(Value::from(p)))
    {
        map.insert("mpris:trackid".to_string(), v);
    }
    if let Some(v) = owned(Value::from(now.title.clone())) {
        map.insert("xesam:title".to_string(), v);
    }
    if let Some(v) = now.artwork_uri.clone().and_then(|uri| owned(Value::from(uri))) {
        map.insert("mpris:artUrl".to_string(), v);
    }
    map
}

/// Register the MPRIS interfaces on the session bus. Failure to reach the
/// bus is logged and leaves the player without desktop controls.
pub fn spawn_transport(tx: Sender<ControlCmd>, settings: &TransportSettings) -> TransportHandle {
    if !settings.enabled {
        info!("transport controls disabled");
        return TransportHandle::detached();
    }

    let handle = TransportHandle {
        state: Arc::new(Mutex::new(SharedState::default())),
        shutdown: Arc::new(AtomicBool::new(false)),
    };

    let state = handle.state.clone();
    let shutdown = handle.shutdown.clone();
    let bus_name = settings.bus_name.clone();
    std::thread::spawn(move || {
        block_on(async move {
            if let Err(e) = serve(tx, state, shutdown, &bus_name).await {
                warn!(error = %e, %bus_name, "MPRIS service unavailable");
            }
        });
    });

    handle
}

async fn serve(
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
    shutdown: Arc<AtomicBool>,
    bus_name: &str,
) -> zbus::Result<()> {
    let connection = Connection::session().await?;
    connection.request_name(bus_name).await?;

    let object_server = connection.object_server();
    object_server
        .at(OBJECT_PATH, RootIface { tx: tx.clone() })
        .await?;
    object_server
        .at(OBJECT_PATH, PlayerIface { tx, state: state.clone() })
        .await?;
    let player = object_server
        .interface::<_, PlayerIface>(OBJECT_PATH)
        .await?;
    info!(bus_name, "MPRIS service registered");

    while !shutdown.load(Ordering::SeqCst) {
        Timer::after(POLL_INTERVAL).await;

        let changed = state
            .lock()
            .map(|mut s| std::mem::take(&mut s.dirty))
            .unwrap_or(false);
        if changed {
            let iface = player.get().await;
            let emitter = player.signal_emitter();
            iface.playback_status_changed(emitter).await?;
            iface.metadata_changed(emitter).await?;
        }
    }

    debug!("MPRIS service shutting down");
    connection.release_name(bus_name).await?;
    Ok(())
}
