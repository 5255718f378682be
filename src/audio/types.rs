use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioCmd {
    /// Replace the current source. The new source starts paused and its
    /// events are tagged with `generation`.
    Load { source: String, generation: u64 },
    Play,
    Pause,
    /// Move to an absolute position in the current source.
    Seek(Duration),
    /// Stop playback and end the audio thread.
    Quit,
}

/// Playback position of the current sink: an offset (where the sink was
/// opened) plus wall time spent playing since.
#[derive(Debug, Default, Clone, Copy)]
pub(super) struct PlayClock {
    offset: Duration,
    accumulated: Duration,
    started_at: Option<Instant>,
}

impl PlayClock {
    pub(super) fn at(offset: Duration) -> Self {
        Self {
            offset,
            ..Self::default()
        }
    }

    pub(super) fn resume(&mut self, now: Instant) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    pub(super) fn pause(&mut self, now: Instant) {
        if let Some(st) = self.started_at.take() {
            self.accumulated += now.saturating_duration_since(st);
        }
    }

    pub(super) fn position(&self, now: Instant) -> Duration {
        let running = self
            .started_at
            .map_or(Duration::ZERO, |st| now.saturating_duration_since(st));
        self.offset + self.accumulated + running
    }
}
