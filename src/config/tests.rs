use super::load::{default_config_path, default_state_dir, resolve_config_path};
use super::schema::*;
use crate::test_env::{EnvGuard, env_lock};

#[test]
fn resolve_config_path_prefers_maestro_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("MAESTRO_CONFIG_PATH", "/tmp/maestro-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/maestro-test-config.toml")
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
            .join("maestro")
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
            .join("maestro")
            .join("config.toml")
    );
}

#[test]
fn default_state_dir_falls_back_to_home_local_state() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_STATE_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    assert_eq!(
        default_state_dir().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir/.local/state/maestro")
    );
}

#[test]
fn defaults_match_documented_gesture_timing() {
    let s = Settings::default();
    assert_eq!(s.gestures.confidence_threshold, 0.9);
    assert_eq!(s.gestures.confirmation_ms, 2000);
    assert_eq!(s.gestures.volume_step, 0.1);
    assert_eq!(s.playback.poll_interval_ms, 500);
    assert!(s.gestures.source.is_none());
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
[gestures]
source = "/run/user/1000/hand-poses"
confidence_threshold = 0.75
confirmation_ms = 1500
volume_step = 0.2

[playback]
initial_volume = 0.5
poll_interval_ms = 250
autoplay = true
auto_advance = false

[audio]
quit_fade_out_ms = 123

[controls]
scrub_seconds = 9

[remote]
mpris = false

[ui]
follow_playback = false
title = "hello"
status_fields = ["artist", "title"]
time_fields = ["elapsed", "remaining"]

[library]
extensions = ["mp3"]
recursive = false
label_fields = ["filename"]

[log]
level = "debug"
file = "/tmp/maestro.log"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("MAESTRO_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("MAESTRO__PLAYBACK__POLL_INTERVAL_MS");

    let s = Settings::load().unwrap();
    assert_eq!(
        s.gestures.source.as_deref(),
        Some(std::path::Path::new("/run/user/1000/hand-poses"))
    );
    assert_eq!(s.gestures.confidence_threshold, 0.75);
    assert_eq!(s.gestures.confirmation_ms, 1500);
    assert_eq!(s.gestures.volume_step, 0.2);
    assert_eq!(s.playback.initial_volume, 0.5);
    assert_eq!(s.playback.poll_interval_ms, 250);
    assert!(s.playback.autoplay);
    assert!(!s.playback.auto_advance);
    assert_eq!(s.audio.quit_fade_out_ms, 123);
    assert_eq!(s.controls.scrub_seconds, 9);
    assert!(!s.remote.mpris);
    assert!(!s.ui.follow_playback);
    assert_eq!(s.ui.title, "hello");
    assert_eq!(
        s.ui.status_fields,
        vec![TrackDisplayField::Artist, TrackDisplayField::Title]
    );
    assert_eq!(
        s.ui.time_fields,
        vec![TimeField::Elapsed, TimeField::Remaining]
    );
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert!(!s.library.recursive);
    assert_eq!(s.library.label_fields, vec![TrackDisplayField::Filename]);
    assert_eq!(s.log.level, "debug");
    assert_eq!(s.log.file.as_deref(), Some(std::path::Path::new("/tmp/maestro.log")));
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[playback]
poll_interval_ms = 250
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("MAESTRO_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("MAESTRO__PLAYBACK__POLL_INTERVAL_MS", "100");

    let s = Settings::load().unwrap();
    assert_eq!(s.playback.poll_interval_ms, 100);
}

#[test]
fn validate_rejects_out_of_range_values() {
    let mut s = Settings::default();
    s.gestures.confidence_threshold = 1.5;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.gestures.confirmation_ms = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.gestures.volume_step = 0.0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.controls.volume_step = f32::NAN;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.playback.poll_interval_ms = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.playback.initial_volume = -0.1;
    assert!(s.validate().is_err());
}
