use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, info, warn};

use crate::catalog::media_path;
use crate::error::{Medium, PlayerError};
use crate::sync::MediaEvent;

use super::sink::create_sink_at;
use super::types::{AudioCmd, PlayClock};

pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    events: Sender<MediaEvent>,
    progress_interval: Duration,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "no audio output device; audio disabled");
                run_without_output(rx, events, e.to_string());
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped, which would
        // scribble over the TUI.
        stream.log_on_drop(false);

        let mut deck = Deck {
            stream,
            events,
            generation: 0,
            path: None,
            sink: None,
            duration: None,
            clock: PlayClock::default(),
            playing: false,
            ended: false,
        };

        loop {
            match rx.recv_timeout(progress_interval) {
                Ok(AudioCmd::Quit) => {
                    deck.stop();
                    break;
                }
                Ok(cmd) => deck.apply(cmd),
                Err(RecvTimeoutError::Timeout) => deck.tick(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}

/// Keep the command channel serviced so every load is answered.
fn run_without_output(rx: Receiver<AudioCmd>, events: Sender<MediaEvent>, reason: String) {
    while let Ok(cmd) = rx.recv() {
        match cmd {
            AudioCmd::Quit => break,
            AudioCmd::Load { .. } | AudioCmd::Play => {
                let err = PlayerError::rejected(Medium::Audio, format!("no output device: {reason}"));
                let _ = events.send(MediaEvent::AudioRejected(err));
            }
            AudioCmd::Pause | AudioCmd::Seek(_) => {}
        }
    }
}

struct Deck {
    stream: OutputStream,
    events: Sender<MediaEvent>,
    /// Load the current source came from.
    generation: u64,
    path: Option<PathBuf>,
    sink: Option<Sink>,
    duration: Option<Duration>,
    clock: PlayClock,
    /// Whether the element is meant to be playing.
    playing: bool,
    /// The current sink drained and `AudioEnded` went out.
    ended: bool,
}

impl Deck {
    fn apply(&mut self, cmd: AudioCmd) {
        match cmd {
            AudioCmd::Load { source, generation } => self.load(&source, generation),
            AudioCmd::Play => self.play(),
            AudioCmd::Pause => self.pause(),
            AudioCmd::Seek(position) => self.seek(position),
            AudioCmd::Quit => self.stop(),
        }
    }

    fn load(&mut self, source: &str, generation: u64) {
        self.stop();
        self.playing = false;
        self.generation = generation;

        let Some(path) = media_path(source) else {
            self.reject(format!("{source}: only local files can be played"));
            return;
        };

        match create_sink_at(&self.stream, &path, Duration::ZERO) {
            Ok(opened) => {
                info!(path = %path.display(), duration = ?opened.duration, generation, "audio loaded");
                self.sink = Some(opened.sink);
                self.duration = opened.duration;
                self.path = Some(path);
                self.clock = PlayClock::at(Duration::ZERO);
                self.ended = false;
                self.report_progress();
            }
            Err(err) => self.send(MediaEvent::AudioRejected(err)),
        }
    }

    fn play(&mut self) {
        let Some(sink) = self.sink.as_ref() else {
            self.reject("no source loaded".to_string());
            return;
        };
        sink.play();
        self.playing = true;
        self.clock.resume(Instant::now());
    }

    fn pause(&mut self) {
        if let Some(sink) = self.sink.as_ref() {
            sink.pause();
        }
        self.playing = false;
        self.clock.pause(Instant::now());
    }

    /// Rebuild the sink and skip into the file.
    fn seek(&mut self, position: Duration) {
        let Some(path) = self.path.clone() else {
            debug!("seek without a source ignored");
            return;
        };
        let position = match self.duration {
            Some(total) => position.min(total),
            None => position,
        };

        if let Some(old) = self.sink.take() {
            old.stop();
        }
        match create_sink_at(&self.stream, &path, position) {
            Ok(opened) => {
                self.clock = PlayClock::at(position);
                self.ended = false;
                if self.playing {
                    opened.sink.play();
                    self.clock.resume(Instant::now());
                }
                self.sink = Some(opened.sink);
                self.report_progress();
            }
            Err(err) => {
                self.playing = false;
                self.send(MediaEvent::AudioRejected(err));
            }
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.path = None;
        self.duration = None;
        self.clock = PlayClock::default();
    }

    fn tick(&mut self) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        if !self.playing || self.ended {
            return;
        }
        if sink.empty() {
            self.ended = true;
            self.clock.pause(Instant::now());
            debug!("audio source drained");
            self.send(MediaEvent::AudioEnded {
                generation: self.generation,
            });
            return;
        }
        self.report_progress();
    }

    fn report_progress(&self) {
        let mut position = self.clock.position(Instant::now());
        if let Some(total) = self.duration {
            position = position.min(total);
        }
        self.send(MediaEvent::AudioProgress {
            generation: self.generation,
            position,
            duration: self.duration,
        });
    }

    fn reject(&self, reason: String) {
        self.send(MediaEvent::AudioRejected(PlayerError::rejected(
            Medium::Audio,
            reason,
        )));
    }

    fn send(&self, event: MediaEvent) {
        let _ = self.events.send(event);
    }
}
