use std::env;
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Install the file logger. The terminal belongs to the UI, so nothing is
/// logged when the file cannot be opened. Returns the log path in use.
pub fn init(settings: &LoggingSettings) -> Option<PathBuf> {
    let path = settings.file.clone().or_else(default_log_path)?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).ok()?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path).ok()?;

    let filter = EnvFilter::try_from_env("BEATCARD_LOG")
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .ok()?;

    Some(path)
}

fn default_log_path() -> Option<PathBuf> {
    log_path_from(env::var_os("XDG_STATE_HOME"), env::var_os("HOME"))
}

/// `$XDG_STATE_HOME/beatcard/beatcard.log`, else under `~/.local/state`.
pub(super) fn log_path_from(state_home: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    let state_home = match state_home.filter(|s| !s.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from(home?).join(".local").join("state"),
    };
    Some(state_home.join("beatcard").join("beatcard.log"))
}
