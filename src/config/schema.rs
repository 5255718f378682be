use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/beatcard/config.toml` or `~/.config/beatcard/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `BEATCARD__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub catalog: CatalogSettings,
    pub transition: TransitionSettings,
    pub audio: AudioSettings,
    pub video: VideoSettings,
    pub ui: UiSettings,
    pub transport: TransportSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Catalog TOML file. A positional CLI argument overrides it.
    pub path: PathBuf,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("catalog.toml"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransitionSettings {
    /// Length of the backdrop fade (milliseconds).
    pub duration_ms: u64,
    /// Wait before the first fade-in, and before every restart (milliseconds).
    pub delay_ms: u64,
}

impl TransitionSettings {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            duration_ms: 1200,
            delay_ms: 700,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// How often the audio thread reports its position (milliseconds).
    pub progress_interval_ms: u64,
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub seek_step_seconds: u64,
}

impl AudioSettings {
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    pub fn seek_step(&self) -> Duration {
        Duration::from_secs(self.seek_step_seconds)
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            progress_interval_ms: 250,
            seek_step_seconds: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VideoSettings {
    /// Simulated buffering time before a backdrop source reports ready.
    pub ready_delay_ms: u64,
}

impl VideoSettings {
    pub fn ready_delay(&self) -> Duration {
        Duration::from_millis(self.ready_delay_ms)
    }
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self { ready_delay_ms: 300 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered in the header box above the card.
    pub header_text: String,
    /// Redraw and input polling interval (milliseconds).
    pub tick_ms: u64,
}

impl UiSettings {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ beatcard ~ ".to_string(),
            tick_ms: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    /// Register with the session bus as an MPRIS player.
    pub enabled: bool,
    /// Well-known bus name to request.
    pub bus_name: String,
    /// Appended to the track title in the published metadata.
    pub now_playing_suffix: String,
    /// Fixed artwork URI. When empty, the sample's album art is used.
    pub artwork_uri: String,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            bus_name: "org.mpris.MediaPlayer2.beatcard".to_string(),
            now_playing_suffix: " (beatcard)".to_string(),
            artwork_uri: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `BEATCARD_LOG` is unset.
    pub level: String,
    /// Log file. Defaults to `$XDG_STATE_HOME/beatcard/beatcard.log`.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
