//! Audio playback on a dedicated `rodio` thread.
//!
//! The runtime talks to the thread through `AudioRemote` (the synchronizer's
//! audio element); the thread answers with `MediaEvent`s on the shared event
//! channel.

mod deck;
mod sink;
mod thread;
mod types;

pub use deck::{AudioDeck, AudioRemote};
pub use types::AudioCmd;
