use std::{env, path::PathBuf};

use super::schema::Settings;

impl Settings {
    /// Defaults, overlaid by the config file when one exists, overlaid by
    /// `MAESTRO__SECTION__KEY` environment variables.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = resolve_config_path() {
            builder = builder.add_source(::config::File::from(path).required(false));
        }
        builder
            .add_source(
                ::config::Environment::with_prefix("MAESTRO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Range checks the type system cannot express.
    pub fn validate(&self) -> Result<(), String> {
        let threshold = self.gestures.confidence_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(format!(
                "gestures.confidence_threshold must be within 0.0..=1.0 (got {threshold})"
            ));
        }
        if self.gestures.confirmation_ms == 0 {
            return Err("gestures.confirmation_ms must be >= 1".to_string());
        }
        for (key, step) in [
            ("gestures.volume_step", self.gestures.volume_step),
            ("controls.volume_step", self.controls.volume_step),
        ] {
            if !(step > 0.0 && step <= 1.0) {
                return Err(format!("{key} must be within (0.0, 1.0] (got {step})"));
            }
        }
        if !(0.0..=1.0).contains(&self.playback.initial_volume) {
            return Err("playback.initial_volume must be within 0.0..=1.0".to_string());
        }
        if self.playback.poll_interval_ms == 0 {
            return Err("playback.poll_interval_ms must be >= 1".to_string());
        }
        Ok(())
    }
}

/// `MAESTRO_CONFIG_PATH` if set, else the XDG default.
pub fn resolve_config_path() -> Option<PathBuf> {
    env::var_os("MAESTRO_CONFIG_PATH")
        .map(PathBuf::from)
        .or_else(default_config_path)
}

/// `$var/maestro`, or `~/<home_fallback>/maestro` when `var` is unset.
fn xdg_app_dir(var: &str, home_fallback: &[&str]) -> Option<PathBuf> {
    let base = env::var_os(var).map(PathBuf::from).or_else(|| {
        env::var_os("HOME").map(|home| home_fallback.iter().fold(PathBuf::from(home), |p, c| p.join(c)))
    })?;
    Some(base.join("maestro"))
}

pub fn default_config_path() -> Option<PathBuf> {
    xdg_app_dir("XDG_CONFIG_HOME", &[".config"]).map(|d| d.join("config.toml"))
}

/// Where the log file lives: `$XDG_STATE_HOME/maestro` or `~/.local/state/maestro`.
pub fn default_state_dir() -> Option<PathBuf> {
    xdg_app_dir("XDG_STATE_HOME", &[".local", "state"])
}
