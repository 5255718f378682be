//! Background video resource.
//!
//! A terminal cannot show the showcase videos, so the backdrop stands in for
//! the video element: it buffers a source (a readiness check on a worker
//! thread), starts itself once it can play through, and exposes a frame
//! clock the UI animates while it plays.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::catalog::media_path;
use crate::error::{Medium, PlayerError};
use crate::sync::{MediaEvent, VideoElement};

/// Backdrop state shared with the UI.
#[derive(Debug, Clone, Default)]
pub struct BackdropInfo {
    pub source: Option<String>,
    pub ready: bool,
    pub playing: bool,
    pub frame: u64,
    /// The load the buffered source belongs to.
    generation: u64,
}

impl BackdropInfo {
    /// Advance the frame clock by one tick while playing.
    pub fn advance(&mut self) {
        if self.playing {
            self.frame = self.frame.wrapping_add(1);
        }
    }
}

pub type BackdropHandle = Arc<Mutex<BackdropInfo>>;

pub struct Backdrop {
    info: BackdropHandle,
    events: Sender<MediaEvent>,
    ready_delay: Duration,
}

impl Backdrop {
    pub fn new(events: Sender<MediaEvent>, ready_delay: Duration) -> Self {
        Self {
            info: Arc::new(Mutex::new(BackdropInfo::default())),
            events,
            ready_delay,
        }
    }

    pub fn handle(&self) -> BackdropHandle {
        self.info.clone()
    }
}

/// Local sources must exist; remote ones are taken on trust.
fn source_available(source: &str) -> bool {
    match media_path(source) {
        Some(path) => path.is_file(),
        None => true,
    }
}

impl VideoElement for Backdrop {
    fn load(&mut self, source: &str, generation: u64) {
        match self.info.lock() {
            Ok(mut info) => {
                info.generation = generation;
                info.source = Some(source.to_string());
                info.ready = false;
                info.playing = false;
                info.frame = 0;
            }
            Err(_) => return,
        }

        let info = self.info.clone();
        let events = self.events.clone();
        let delay = self.ready_delay;
        let source = source.to_string();
        thread::spawn(move || {
            thread::sleep(delay);
            let available = source_available(&source);

            let Ok(mut guard) = info.lock() else {
                return;
            };
            if guard.generation != generation {
                debug!(%source, generation, "backdrop load superseded");
                return;
            }
            if !available {
                drop(guard);
                let _ = events.send(MediaEvent::VideoRejected {
                    generation,
                    error: PlayerError::rejected(Medium::Video, format!("{source} is not reachable")),
                });
                return;
            }
            // Sources start on their own once buffered.
            guard.ready = true;
            guard.playing = true;
            drop(guard);
            let _ = events.send(MediaEvent::VideoReady { generation });
        });
    }

    fn play(&mut self) {
        let (started, generation) = match self.info.lock() {
            Ok(mut info) if info.ready => {
                info.playing = true;
                (true, info.generation)
            }
            Ok(info) => (false, info.generation),
            Err(_) => (false, 0),
        };

        let event = if started {
            MediaEvent::VideoStarted { generation }
        } else {
            MediaEvent::VideoRejected {
                generation,
                error: PlayerError::rejected(Medium::Video, "no source buffered"),
            }
        };
        let _ = self.events.send(event);
    }

    fn pause(&mut self) {
        if let Ok(mut info) = self.info.lock() {
            info.playing = false;
        }
    }
}
