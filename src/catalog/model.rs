use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer};

use crate::error::PlayerError;

/// Stable identifier of a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to the sampled source of a track.
///
/// Catalog documents written for the web showcase use the literal string
/// `"undefined"` for "no sample"; that and the empty string decode to
/// `NoSample`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SampleRef {
    #[default]
    NoSample,
    Id(String),
}

impl SampleRef {
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") | Some("undefined") => SampleRef::NoSample,
            Some(id) => SampleRef::Id(id.to_string()),
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            SampleRef::NoSample => None,
            SampleRef::Id(id) => Some(id),
        }
    }
}

impl<'de> Deserialize<'de> for SampleRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(Self::from_raw(raw.as_deref()))
    }
}

/// An immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    #[serde(alias = "src")]
    pub audio: String,
    pub video: String,
    #[serde(default, alias = "sampleSpotifyId", alias = "sample_id")]
    pub sample: SampleRef,
}

/// Metadata about the source a track samples. Every field may be missing in
/// the catalog document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SampleMetadata {
    pub name: String,
    pub artist: String,
    pub album_art_uri: Option<String>,
    pub external_uri: Option<String>,
}

impl SampleMetadata {
    /// `'name' by artist`, or `None` when the name is unknown.
    pub fn credit(&self) -> Option<String> {
        let name = self.name.trim();
        if name.is_empty() {
            return None;
        }
        let artist = self.artist.trim();
        if artist.is_empty() {
            Some(format!("'{name}'"))
        } else {
            Some(format!("'{name}' by {artist}"))
        }
    }
}

/// Access to the remote (or on-disk) track catalog.
///
/// Calls block; callers that must not block run them on a worker.
pub trait CatalogGateway: Send + Sync {
    fn fetch_all_tracks(&self) -> Result<Vec<Track>, PlayerError>;

    fn fetch_sample_metadata(&self, reference_id: &str) -> Result<SampleMetadata, PlayerError>;
}

/// Map a media source to a local path.
///
/// Plain paths and `file://` URIs are local; any other scheme is remote and
/// yields `None`.
pub fn media_path(source: &str) -> Option<PathBuf> {
    if let Some(rest) = source.strip_prefix("file://") {
        return Some(PathBuf::from(rest));
    }
    if source.contains("://") {
        return None;
    }
    Some(PathBuf::from(source))
}
