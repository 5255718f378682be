//! Playback synchronizer.
//!
//! Keeps the audio element, the background video and the visual transition
//! in a consistent order across store changes and resource events. All
//! resource calls start work whose completion comes back later as a
//! `MediaEvent`; continuations are gated on those events, never on delays.

mod player;
mod resources;
mod synchronizer;

pub use player::Player;
pub use resources::*;
pub use synchronizer::{PlaybackView, SampleView, Synchronizer};

#[cfg(test)]
mod tests;
