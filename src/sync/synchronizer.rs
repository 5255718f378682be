use std::time::Duration;

use tracing::{debug, warn};

use crate::catalog::{SampleMetadata, Track, TrackId};
use crate::error::PlayerError;
use crate::store::{Action, PlaylistState};

use super::resources::{
    AudioElement, Direction, MediaEvent, SampleLookup, SampleRequest, Timeline, VideoElement,
};

/// Sample metadata as presented for the current track.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SampleView {
    /// The track has no sample reference, or the lookup failed.
    #[default]
    NoSample,
    Pending,
    Resolved(SampleMetadata),
}

/// Presentation-only state owned by the synchronizer. Never fed back into
/// the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackView {
    pub elapsed: Duration,
    pub duration: Option<Duration>,
    pub sample: SampleView,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum PendingStep {
    /// `video.play()` issued; start the transition once it has started.
    AwaitVideoStart,
    /// `timeline.reverse()` issued; pause the video once it has finished.
    AwaitReverse,
}

/// What the last reaction saw of the store.
#[derive(Debug, Default)]
struct Observed {
    track: Option<TrackId>,
    is_playing: bool,
}

/// Coordinates audio, video and the transition timeline.
///
/// The synchronizer never mutates `PlaylistState`; it reports outcomes as
/// actions for the caller to dispatch.
pub struct Synchronizer {
    audio: Box<dyn AudioElement>,
    video: Box<dyn VideoElement>,
    timeline: Box<dyn Timeline>,
    samples: Box<dyn SampleLookup>,

    observed: Observed,
    video_ready: bool,
    seek_latched: bool,
    pending: Option<PendingStep>,
    sample_request: Option<SampleRequest>,
    generation: u64,
    view: PlaybackView,
}

impl Synchronizer {
    pub fn new(
        audio: Box<dyn AudioElement>,
        video: Box<dyn VideoElement>,
        timeline: Box<dyn Timeline>,
        samples: Box<dyn SampleLookup>,
    ) -> Self {
        Self {
            audio,
            video,
            timeline,
            samples,
            observed: Observed::default(),
            video_ready: false,
            seek_latched: false,
            pending: None,
            sample_request: None,
            generation: 0,
            view: PlaybackView::default(),
        }
    }

    pub fn view(&self) -> &PlaybackView {
        &self.view
    }

    /// React to the store after one or more actions were reduced.
    ///
    /// A `seeked` mark is always consumed here: the returned actions contain
    /// `Reset` and the seek is remembered until the video is ready to act on
    /// it.
    pub fn observe(&mut self, state: &PlaylistState) -> Vec<Action> {
        let mut actions = Vec::new();

        let track = state.current_track();
        let track_id = track.map(|t| t.id.clone());
        let track_changed = track_id != self.observed.track;
        let playing_changed = state.is_playing() != self.observed.is_playing;
        self.observed.track = track_id;
        self.observed.is_playing = state.is_playing();

        let Some(track) = track else {
            if state.seeked() {
                actions.push(Action::Reset);
            }
            return actions;
        };

        if track_changed {
            self.load_track(track);
        }
        if track_changed || playing_changed {
            self.drive_audio(state.is_playing());
        }

        let mut evaluate = playing_changed;
        if state.seeked() {
            actions.push(Action::Reset);
            self.seek_latched = true;
            evaluate = true;
        }
        if evaluate {
            self.evaluate_visuals(state.is_playing());
        }

        actions
    }

    /// React to a resource event. Audio and video events from a load other
    /// than the latest one are dropped.
    pub fn handle(&mut self, event: MediaEvent, state: &PlaylistState) -> Vec<Action> {
        if let Some(generation) = event.load_generation() {
            if generation != self.generation {
                debug!(
                    generation,
                    current = self.generation,
                    ?event,
                    "dropping event from a replaced source"
                );
                return Vec::new();
            }
        }

        match event {
            MediaEvent::VideoReady { .. } => {
                if !self.video_ready {
                    self.video_ready = true;
                    if state.current_track().is_some() {
                        self.evaluate_visuals(state.is_playing());
                    }
                }
            }
            MediaEvent::VideoStarted { .. } => {
                if self.pending == Some(PendingStep::AwaitVideoStart) {
                    self.pending = None;
                    self.timeline.play_forward();
                } else {
                    debug!("video start superseded; transition left alone");
                }
            }
            MediaEvent::VideoRejected { error, .. } => {
                warn!(%error, "background video did not start");
                if self.pending == Some(PendingStep::AwaitVideoStart) {
                    self.pending = None;
                }
            }
            MediaEvent::TransitionFinished(Direction::Reverse) => {
                if self.pending == Some(PendingStep::AwaitReverse) {
                    self.pending = None;
                    self.video.pause();
                }
            }
            MediaEvent::TransitionFinished(Direction::Forward) => {}
            MediaEvent::AudioEnded { .. } => {
                if state.is_empty() {
                    return Vec::new();
                }
                // A one-track playlist wraps onto itself; the store sees no
                // change, so the element is rewound here.
                if state.len() == 1 && state.is_playing() {
                    self.audio.seek(Duration::ZERO);
                    self.audio.play();
                }
                return vec![Action::NextTrack];
            }
            MediaEvent::AudioProgress { position, duration, .. } => {
                self.view.elapsed = position;
                self.view.duration = duration;
            }
            MediaEvent::AudioRejected(err) => {
                warn!(%err, "audio did not start");
            }
            MediaEvent::SampleResolved { request, result } => {
                self.apply_sample(request, result);
            }
        }
        Vec::new()
    }

    /// Move the audio element to `position` and mirror it into the view.
    pub fn seek_audio(&mut self, position: Duration) {
        let position = match self.view.duration {
            Some(total) => position.min(total),
            None => position,
        };
        self.audio.seek(position);
        self.view.elapsed = position;
    }

    fn load_track(&mut self, track: &Track) {
        debug!(track = %track.id, generation = self.generation + 1, "loading track resources");

        self.generation += 1;
        self.video_ready = false;
        self.pending = None;
        self.audio.load(&track.audio, self.generation);
        self.video.load(&track.video, self.generation);

        self.view = PlaybackView::default();
        self.sample_request = None;
        if let Some(reference) = track.sample.id() {
            let request = SampleRequest {
                track_id: track.id.clone(),
                generation: self.generation,
            };
            self.view.sample = SampleView::Pending;
            self.sample_request = Some(request.clone());
            self.samples.request(request, reference);
        }
    }

    fn drive_audio(&mut self, playing: bool) {
        if playing {
            self.audio.play();
        } else {
            self.audio.pause();
        }
    }

    /// Priority protocol for the video and the transition.
    fn evaluate_visuals(&mut self, playing: bool) {
        if !self.video_ready {
            debug!("video not ready; deferring visuals");
            return;
        }

        let seek = std::mem::take(&mut self.seek_latched);
        if seek && playing {
            self.pending = None;
            self.timeline.restart();
        } else if playing {
            self.pending = Some(PendingStep::AwaitVideoStart);
            self.video.play();
        } else {
            self.pending = Some(PendingStep::AwaitReverse);
            self.timeline.reverse();
        }
    }

    fn apply_sample(&mut self, request: SampleRequest, result: Result<SampleMetadata, PlayerError>) {
        let current = self.sample_request.as_ref() == Some(&request)
            && self.observed.track.as_ref() == Some(&request.track_id);
        if !current {
            debug!(track = %request.track_id, generation = request.generation, "discarding stale sample lookup");
            return;
        }

        self.sample_request = None;
        self.view.sample = match result {
            Ok(meta) => SampleView::Resolved(meta),
            Err(err) => {
                warn!(%err, track = %request.track_id, "sample lookup failed");
                SampleView::NoSample
            }
        };
    }
}
