use std::time::Duration;

use tracing::debug;

use crate::config::TransportSettings;
use crate::store::{Action, PlaylistState};
use crate::transport::NowPlaying;

use super::resources::MediaEvent;
use super::synchronizer::{PlaybackView, Synchronizer};

/// Owns the playlist store and its synchronizer.
///
/// Each batch of actions is reduced as a unit and then observed once, so a
/// `Seeked` + `NextTrack` pair reaches the synchronizer as a single change.
/// Actions the synchronizer hands back are dispatched the same way until
/// nothing is left.
pub struct Player {
    state: PlaylistState,
    sync: Synchronizer,
}

impl Player {
    pub fn new(sync: Synchronizer) -> Self {
        Self {
            state: PlaylistState::new(),
            sync,
        }
    }

    pub fn state(&self) -> &PlaylistState {
        &self.state
    }

    pub fn view(&self) -> &PlaybackView {
        self.sync.view()
    }

    /// The projection published to the transport controls.
    pub fn now_playing(&self, settings: &TransportSettings) -> Option<NowPlaying> {
        NowPlaying::compose(&self.state, self.sync.view(), settings)
    }

    pub fn dispatch(&mut self, action: Action) {
        self.run(vec![action]);
    }

    /// Feed a resource event to the synchronizer.
    pub fn handle(&mut self, event: MediaEvent) {
        let actions = self.sync.handle(event, &self.state);
        self.run(actions);
    }

    pub fn play(&mut self) {
        self.dispatch(Action::Play);
    }

    pub fn pause(&mut self) {
        self.dispatch(Action::Pause);
    }

    pub fn toggle(&mut self) {
        if self.state.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn next(&mut self) {
        if !self.state.is_empty() {
            self.run(vec![Action::Seeked, Action::NextTrack]);
        }
    }

    pub fn previous(&mut self) {
        if !self.state.is_empty() {
            self.run(vec![Action::Seeked, Action::PrevTrack]);
        }
    }

    /// Select `index` and play it. Selecting the current track only
    /// resumes playback.
    pub fn select(&mut self, index: usize) {
        if index >= self.state.len() {
            debug!(index, len = self.state.len(), "ignoring out-of-range selection");
            return;
        }
        if index == self.state.current_index() {
            self.play();
            return;
        }
        self.run(vec![Action::Seeked, Action::SelectTrack(index), Action::Play]);
    }

    /// Scrub the current track to `position`.
    pub fn seek_to(&mut self, position: Duration) {
        if self.state.current_track().is_some() {
            self.sync.seek_audio(position);
        }
    }

    fn run(&mut self, mut batch: Vec<Action>) {
        while !batch.is_empty() {
            for action in batch.drain(..) {
                let label = action.label();
                if self.state.reduce(action) {
                    debug!(
                        action = label,
                        index = self.state.current_index(),
                        playing = self.state.is_playing(),
                        seeked = self.state.seeked(),
                        "playlist state changed"
                    );
                }
            }
            batch = self.sync.observe(&self.state);
        }
    }
}
