//! Error taxonomy shared by the catalog, the media resources and the
//! synchronizer.
//!
//! None of these errors terminate the coordinator: they are caught where the
//! asynchronous call completes and turned into a log line or a presentation
//! fallback.

use std::fmt;

use thiserror::Error;

/// Which media resource refused to play.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Medium {
    Audio,
    Video,
}

impl fmt::Display for Medium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Medium::Audio => f.write_str("audio"),
            Medium::Video => f.write_str("video"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerError {
    /// The track list could not be fetched or parsed.
    #[error("track catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// Sample metadata for one track could not be resolved.
    #[error("sample lookup for {reference} failed: {reason}")]
    SampleLookupFailed { reference: String, reason: String },

    /// The host refused (or could not start) audio or video playback.
    #[error("{medium} playback rejected: {reason}")]
    MediaPlaybackRejected { medium: Medium, reason: String },
}

impl PlayerError {
    pub fn rejected(medium: Medium, reason: impl Into<String>) -> Self {
        Self::MediaPlaybackRejected {
            medium,
            reason: reason.into(),
        }
    }
}
