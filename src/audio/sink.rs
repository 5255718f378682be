//! Opening and decoding a local file into a paused `rodio` sink.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use lofty::prelude::AudioFile;
use rodio::{Decoder, OutputStream, Sink, Source};

use crate::error::{Medium, PlayerError};

pub(super) struct OpenedSink {
    pub sink: Sink,
    pub duration: Option<Duration>,
}

/// Create a paused `Sink` for `path` that starts playback at `start_at`.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    path: &Path,
    start_at: Duration,
) -> Result<OpenedSink, PlayerError> {
    let file = File::open(path).map_err(|e| {
        PlayerError::rejected(Medium::Audio, format!("cannot open {}: {e}", path.display()))
    })?;

    let decoder = Decoder::new(BufReader::new(file)).map_err(|e| {
        PlayerError::rejected(Medium::Audio, format!("cannot decode {}: {e}", path.display()))
    })?;

    let duration = decoder.total_duration().or_else(|| tagged_duration(path));
    // `skip_duration` is the seeking primitive; Duration::ZERO is a no-op.
    let source = decoder.skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok(OpenedSink { sink, duration })
}

/// Read the duration from the file's tags when the decoder cannot tell.
pub(super) fn tagged_duration(path: &Path) -> Option<Duration> {
    let tagged = lofty::read_from_path(path).ok()?;
    let duration = tagged.properties().duration();
    (!duration.is_zero()).then_some(duration)
}
