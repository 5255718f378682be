use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;

use crate::error::PlayerError;

use super::model::{CatalogGateway, SampleMetadata, Track, media_path};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CatalogDocument {
    tracks: Vec<Track>,
    samples: HashMap<String, SampleMetadata>,
}

/// Catalog backed by a TOML file.
///
/// Relative media paths are resolved against the directory holding the
/// catalog file.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_document(&self) -> Result<CatalogDocument, String> {
        let text = fs::read_to_string(&self.path)
            .map_err(|e| format!("{}: {e}", self.path.display()))?;
        toml::from_str(&text).map_err(|e| format!("{}: {e}", self.path.display()))
    }

    fn resolve_media(&self, source: &str) -> String {
        let Some(local) = media_path(source) else {
            return source.to_string();
        };
        if local.is_absolute() {
            return local.display().to_string();
        }
        match self.path.parent() {
            Some(dir) => dir.join(local).display().to_string(),
            None => local.display().to_string(),
        }
    }
}

impl CatalogGateway for FileCatalog {
    fn fetch_all_tracks(&self) -> Result<Vec<Track>, PlayerError> {
        let doc = self.read_document().map_err(PlayerError::CatalogUnavailable)?;

        let mut seen = HashSet::new();
        let mut tracks = Vec::with_capacity(doc.tracks.len());
        for mut track in doc.tracks {
            if !seen.insert(track.id.clone()) {
                return Err(PlayerError::CatalogUnavailable(format!(
                    "{}: duplicate track id {}",
                    self.path.display(),
                    track.id
                )));
            }
            track.audio = self.resolve_media(&track.audio);
            track.video = self.resolve_media(&track.video);
            tracks.push(track);
        }

        debug!(count = tracks.len(), path = %self.path.display(), "catalog read");
        Ok(tracks)
    }

    fn fetch_sample_metadata(&self, reference_id: &str) -> Result<SampleMetadata, PlayerError> {
        let failed = |reason: String| PlayerError::SampleLookupFailed {
            reference: reference_id.to_string(),
            reason,
        };

        let mut doc = self.read_document().map_err(failed)?;
        doc.samples
            .remove(reference_id)
            .ok_or_else(|| failed("no entry in catalog".to_string()))
    }
}
