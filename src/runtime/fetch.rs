use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use tracing::{debug, info};

use crate::catalog::{CatalogGateway, Track};
use crate::error::PlayerError;
use crate::sync::{MediaEvent, SampleLookup, SampleRequest};

pub type CatalogResult = Result<Vec<Track>, PlayerError>;

/// Runs gateway calls off the runtime thread and posts their results.
pub struct Fetcher {
    gateway: Arc<dyn CatalogGateway>,
    events: Sender<MediaEvent>,
}

impl Fetcher {
    pub fn new(gateway: Arc<dyn CatalogGateway>, events: Sender<MediaEvent>) -> Self {
        Self { gateway, events }
    }
}

impl SampleLookup for Fetcher {
    fn request(&mut self, request: SampleRequest, reference: &str) {
        let gateway = self.gateway.clone();
        let events = self.events.clone();
        let reference = reference.to_string();
        thread::spawn(move || {
            debug!(%reference, track = %request.track_id, "looking up sample");
            let result = gateway.fetch_sample_metadata(&reference);
            // The runtime may already be gone; nothing is waiting then.
            let _ = events.send(MediaEvent::SampleResolved { request, result });
        });
    }
}

/// Load the playlist once, in the background.
pub fn spawn_track_load(gateway: Arc<dyn CatalogGateway>, tx: Sender<CatalogResult>) {
    thread::spawn(move || {
        let result = gateway.fetch_all_tracks();
        if let Ok(tracks) = &result {
            info!(count = tracks.len(), "catalog loaded");
        }
        let _ = tx.send(result);
    });
}
