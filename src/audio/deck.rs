use std::sync::Mutex;
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::AudioSettings;
use crate::sync::{AudioElement, MediaEvent};

use super::thread::spawn_audio_thread;
use super::types::AudioCmd;

/// Owner of the audio thread.
pub struct AudioDeck {
    tx: Sender<AudioCmd>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioDeck {
    pub fn new(events: Sender<MediaEvent>, settings: &AudioSettings) -> Self {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let handle = spawn_audio_thread(rx, events, settings.progress_interval());

        Self {
            tx,
            join: Mutex::new(Some(handle)),
        }
    }

    /// A handle the synchronizer can drive.
    pub fn remote(&self) -> AudioRemote {
        AudioRemote::new(self.tx.clone())
    }

    /// Stop playback and wait for the thread to exit.
    pub fn shutdown(&self) {
        let _ = self.tx.send(AudioCmd::Quit);

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

/// `AudioElement` that forwards every call to the audio thread.
#[derive(Debug, Clone)]
pub struct AudioRemote {
    tx: Sender<AudioCmd>,
}

impl AudioRemote {
    pub fn new(tx: Sender<AudioCmd>) -> Self {
        Self { tx }
    }

    fn send(&self, cmd: AudioCmd) {
        // The thread is gone only after shutdown; nothing is left to drive.
        let _ = self.tx.send(cmd);
    }
}

impl AudioElement for AudioRemote {
    fn load(&mut self, source: &str, generation: u64) {
        self.send(AudioCmd::Load {
            source: source.to_string(),
            generation,
        });
    }

    fn play(&mut self) {
        self.send(AudioCmd::Play);
    }

    fn pause(&mut self) {
        self.send(AudioCmd::Pause);
    }

    fn seek(&mut self, position: Duration) {
        self.send(AudioCmd::Seek(position));
    }
}
