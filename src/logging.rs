//! Log setup. The terminal belongs to the TUI, so records go to a file.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;

use env_logger::{Builder, Env, Target};

use crate::config::{LogSettings, default_state_dir};

/// Where records end up: `log.file`, or `maestro.log` under the state directory.
pub fn log_path(settings: &LogSettings) -> Option<PathBuf> {
    settings
        .file
        .clone()
        .or_else(|| default_state_dir().map(|d| d.join("maestro.log")))
}

/// Install the global logger. `RUST_LOG` overrides `log.level`. Without a
/// usable log file, logging is switched off.
pub fn init(settings: &LogSettings) -> io::Result<Option<PathBuf>> {
    let mut builder = Builder::new();
    builder.parse_filters(&settings.level);
    builder.parse_env(Env::default());

    let path = log_path(settings);
    match &path {
        Some(path) => {
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.target(Target::Pipe(Box::new(file)));
        }
        None => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }

    // A second init (tests) keeps the first logger.
    let _ = builder.try_init();
    Ok(path)
}
