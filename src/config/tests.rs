use super::load::{config_file_path, xdg_config_file};
use super::schema::*;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap()
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn explicit_config_path_wins_over_xdg() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("BEATCARD_CONFIG_PATH", "/tmp/beatcard-test-config.toml");
    let _g2 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-should-not-win");
    assert_eq!(
        config_file_path(),
        Some(PathBuf::from("/tmp/beatcard-test-config.toml"))
    );
}

#[test]
fn xdg_config_home_wins_over_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    assert_eq!(
        xdg_config_file().unwrap(),
        PathBuf::from("/tmp/xdg-config-home")
            .join("beatcard")
            .join("config.toml")
    );
}

#[test]
fn home_dot_config_is_the_last_resort() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    assert_eq!(
        xdg_config_file().unwrap(),
        PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("beatcard")
            .join("config.toml")
    );
}

#[test]
fn no_config_file_without_any_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("BEATCARD_CONFIG_PATH");
    let _g2 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g3 = EnvGuard::remove("HOME");

    assert_eq!(config_file_path(), None);
}

#[test]
fn defaults_match_the_showcase_timings() {
    let s = Settings::default();
    assert_eq!(s.transition.duration(), Duration::from_millis(1200));
    assert_eq!(s.transition.delay(), Duration::from_millis(700));
    assert_eq!(s.audio.seek_step(), Duration::from_secs(5));
    assert!(s.transport.enabled);
    assert!(s.transport.artwork_uri.is_empty());
    assert!(s.logging.file.is_none());
    assert!(s.validate().is_ok());
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[catalog]
path = "/srv/beats/catalog.toml"

[transition]
duration_ms = 900
delay_ms = 0

[audio]
progress_interval_ms = 100
seek_step_seconds = 10

[video]
ready_delay_ms = 20

[ui]
header_text = "hello"
tick_ms = 16

[transport]
enabled = false
bus_name = "org.mpris.MediaPlayer2.test"
now_playing_suffix = " - demo"
artwork_uri = "https://example.com/cover.png"

[logging]
level = "beatcard=debug"
file = "/tmp/beatcard.log"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("BEATCARD_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("BEATCARD__AUDIO__SEEK_STEP_SECONDS");

    let s = Settings::load().unwrap();
    assert_eq!(s.catalog.path, PathBuf::from("/srv/beats/catalog.toml"));
    assert_eq!(s.transition.duration_ms, 900);
    assert_eq!(s.transition.delay(), Duration::ZERO);
    assert_eq!(s.audio.progress_interval(), Duration::from_millis(100));
    assert_eq!(s.audio.seek_step_seconds, 10);
    assert_eq!(s.video.ready_delay(), Duration::from_millis(20));
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.ui.tick(), Duration::from_millis(16));
    assert!(!s.transport.enabled);
    assert_eq!(s.transport.bus_name, "org.mpris.MediaPlayer2.test");
    assert_eq!(s.transport.now_playing_suffix, " - demo");
    assert_eq!(s.transport.artwork_uri, "https://example.com/cover.png");
    assert_eq!(s.logging.level, "beatcard=debug");
    assert_eq!(s.logging.file, Some(PathBuf::from("/tmp/beatcard.log")));
}

#[test]
fn partial_file_keeps_defaults_for_missing_keys() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(&cfg_path, "[transition]\ndelay_ms = 50\n").unwrap();

    let _g1 = EnvGuard::set("BEATCARD_CONFIG_PATH", cfg_path.to_str().unwrap());

    let s = Settings::load().unwrap();
    assert_eq!(s.transition.delay_ms, 50);
    assert_eq!(s.transition.duration_ms, 1200);
    assert_eq!(s.ui.tick_ms, 50);
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(&cfg_path, "[audio]\nseek_step_seconds = 5\n").unwrap();

    let _g1 = EnvGuard::set("BEATCARD_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("BEATCARD__AUDIO__SEEK_STEP_SECONDS", "15");

    let s = Settings::load().unwrap();
    assert_eq!(s.audio.seek_step_seconds, 15);
}

#[test]
fn validate_rejects_unusable_values() {
    let mut s = Settings::default();
    s.transition.duration_ms = 0;
    assert!(s.validate().unwrap_err().contains("transition.duration_ms"));

    let mut s = Settings::default();
    s.ui.tick_ms = 0;
    assert!(s.validate().unwrap_err().contains("ui.tick_ms"));

    let mut s = Settings::default();
    s.audio.progress_interval_ms = 0;
    assert!(s.validate().unwrap_err().contains("audio.progress_interval_ms"));

    let mut s = Settings::default();
    s.transport.bus_name = "  ".to_string();
    assert!(s.validate().unwrap_err().contains("transport.bus_name"));
}
