//! Resource seams driven by the synchronizer and the events they report.

use std::time::Duration;

use crate::catalog::{SampleMetadata, TrackId};
use crate::error::PlayerError;

/// The primary timed medium.
pub trait AudioElement {
    /// Replace the source. The element is left paused at the start, and
    /// every event it reports from now on carries `generation`.
    fn load(&mut self, source: &str, generation: u64);
    fn play(&mut self);
    fn pause(&mut self);
    /// Set the current time.
    fn seek(&mut self, position: Duration);
}

/// The background video. Loading a source starts it automatically once it
/// can play through; readiness is reported as `MediaEvent::VideoReady`
/// tagged with the `generation` it was loaded under.
pub trait VideoElement {
    fn load(&mut self, source: &str, generation: u64);
    /// Completes with `VideoStarted` or `VideoRejected`.
    fn play(&mut self);
    fn pause(&mut self);
}

/// The reveal transition over the backdrop.
pub trait Timeline {
    fn play_forward(&mut self);
    /// Completes with `TransitionFinished(Direction::Reverse)`.
    fn reverse(&mut self);
    /// Jump back to the initial state (including the start delay) and play.
    fn restart(&mut self);
}

/// Fire-and-forget sample metadata lookup; completes with `SampleResolved`.
pub trait SampleLookup {
    fn request(&mut self, request: SampleRequest, reference_id: &str);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// Key for one sample lookup. A resolution is only applied when its key
/// matches the latest request issued for the current track.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SampleRequest {
    pub track_id: TrackId,
    pub generation: u64,
}

/// Completion and readiness signals from the media resources.
///
/// Audio and video events carry the generation of the load they belong to,
/// so a report from a source that has since been replaced can be told apart
/// from one about the current track.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// The video can play through without further buffering.
    VideoReady { generation: u64 },
    /// A `VideoElement::play` call has started playback.
    VideoStarted { generation: u64 },
    VideoRejected { generation: u64, error: PlayerError },
    TransitionFinished(Direction),
    AudioEnded { generation: u64 },
    AudioProgress {
        generation: u64,
        position: Duration,
        duration: Option<Duration>,
    },
    AudioRejected(PlayerError),
    SampleResolved {
        request: SampleRequest,
        result: Result<SampleMetadata, PlayerError>,
    },
}

impl MediaEvent {
    /// The load an audio or video event was reported under. `None` for
    /// events that are not tied to a loaded source.
    pub fn load_generation(&self) -> Option<u64> {
        match self {
            Self::VideoReady { generation }
            | Self::VideoStarted { generation }
            | Self::VideoRejected { generation, .. }
            | Self::AudioEnded { generation }
            | Self::AudioProgress { generation, .. } => Some(*generation),
            Self::TransitionFinished(_) | Self::AudioRejected(_) | Self::SampleResolved { .. } => None,
        }
    }
}
