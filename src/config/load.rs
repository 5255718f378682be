use std::{env, path::PathBuf};

use ::config::{Config, ConfigError, Environment, File};

use super::schema::Settings;

/// Prefix for per-key overrides, e.g. `BEATCARD__UI__TICK_MS=50`.
const ENV_PREFIX: &str = "BEATCARD";
/// Points at a config file outside the XDG location.
const PATH_VAR: &str = "BEATCARD_CONFIG_PATH";

impl Settings {
    /// Build settings from the struct defaults, then the config file (if any),
    /// then `BEATCARD__*` variables. Later layers win.
    pub fn load() -> Result<Self, ConfigError> {
        let file = config_file_path().map(|path| File::from(path).required(false));

        Config::builder()
            .add_source(file.into_iter().collect::<Vec<_>>())
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// First setting the runtime cannot run with, as `section.key` plus the
    /// bound it breaks.
    pub fn validate(&self) -> Result<(), String> {
        let zero_checks = [
            ("transition.duration_ms", self.transition.duration_ms),
            ("ui.tick_ms", self.ui.tick_ms),
            ("audio.progress_interval_ms", self.audio.progress_interval_ms),
        ];
        if let Some((key, _)) = zero_checks.iter().find(|(_, value)| *value == 0) {
            return Err(format!("{key} must be >= 1"));
        }
        if self.transport.bus_name.trim().is_empty() {
            return Err("transport.bus_name must not be empty".to_string());
        }
        Ok(())
    }
}

/// `BEATCARD_CONFIG_PATH` when set, else the XDG location.
pub fn config_file_path() -> Option<PathBuf> {
    env::var_os(PATH_VAR)
        .map(PathBuf::from)
        .or_else(xdg_config_file)
}

/// `beatcard/config.toml` under `$XDG_CONFIG_HOME`, falling back to
/// `$HOME/.config`.
pub fn xdg_config_file() -> Option<PathBuf> {
    env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .map(|dir| dir.join("beatcard").join("config.toml"))
}
