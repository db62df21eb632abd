use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

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
fn resolve_config_path_prefers_coda_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("CODA_CONFIG_PATH", "/tmp/coda-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/coda-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("coda")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("coda")
            .join("config.toml")
    );
}

#[test]
fn settings_load_from_config_file_and_parse_repeat_aliases() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[playback]
shuffle = true
repeat = "repeat-one"
volume = 0.5

[engine]
tick_ms = 50
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("CODA_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("CODA__ENGINE__TICK_MS");

    let s = Settings::load().unwrap();
    assert!(s.playback.shuffle);
    assert!(matches!(s.playback.repeat, RepeatSetting::One));
    assert_eq!(s.playback.volume, 0.5);
    assert_eq!(s.engine.tick_ms, 50);
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[engine]
tick_ms = 200
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("CODA_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("CODA__ENGINE__TICK_MS", "25");

    let s = Settings::load().unwrap();
    assert_eq!(s.engine.tick_ms, 25);
}

#[test]
fn defaults_are_sane_and_validate() {
    let s = Settings::default();
    assert!(!s.playback.shuffle);
    assert!(matches!(s.playback.repeat, RepeatSetting::Off));
    assert_eq!(s.playback.volume, 1.0);
    assert_eq!(s.engine.tick_ms, 200);
    assert!(s.validate().is_ok());
}

#[test]
fn load_or_default_falls_back_on_broken_or_invalid_config() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");

    // Wrong shape (playback must be a table): defaults.
    std::fs::write(&cfg_path, "playback = 'nope'").unwrap();
    let _g1 = EnvGuard::set("CODA_CONFIG_PATH", cfg_path.to_str().unwrap());
    let s = Settings::load_or_default();
    assert_eq!(s.engine.tick_ms, 200);

    // Parseable but failing validation: defaults too.
    std::fs::write(
        &cfg_path,
        r#"
[playback]
volume = 2.5
"#,
    )
    .unwrap();
    let s = Settings::load_or_default();
    assert_eq!(s.playback.volume, 1.0);
}

#[test]
fn validate_rejects_out_of_range_volume_and_zero_tick() {
    let mut s = Settings::default();
    s.playback.volume = 1.5;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.engine.tick_ms = 0;
    assert!(s.validate().is_err());
}
