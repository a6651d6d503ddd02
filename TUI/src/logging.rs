// Logging goes to a file: stdout and stderr belong to the terminal UI.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use env_logger::{Builder, Env, Target};

pub const LOG_ENV: &str = "BCITE_LOG";
const LOG_FILE: &str = "bcite.log";

/// `$BCITE_LOG`, else `bcite.log` in the data directory.
pub fn log_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(LOG_ENV) {
        return Some(PathBuf::from(path));
    }
    crate::config::data_dir().map(|dir| dir.join(LOG_FILE))
}

/// Install the global logger. Returns the log file path, or `None` when
/// logging is disabled because the file could not be opened.
pub fn init() -> Option<PathBuf> {
    let path = log_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok();
    }
    let file = OpenOptions::new().create(true).append(true).open(&path).ok()?;

    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .ok()?;

    Some(path)
}
