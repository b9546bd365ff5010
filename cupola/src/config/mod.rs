//! Persistent configuration.
//!
//! Settings live in an INI file at `<config dir>/cupola/config.ini`:
//!
//! ```ini
//! [acquisition]
//! max_attempts = 3
//! retry_delay_ms = 1000
//! timeout_secs = 30
//! user_agent = Mozilla/5.0
//!
//! [viewer]
//! viewport_margin = 100
//! slideshow_interval_ms = 3000
//! save_directory = /home/user/Pictures
//!
//! [logging]
//! level = info
//! directory = /home/user/.cache/cupola/logs
//!
//! [catalog]
//! path = /home/user/cupola.json
//! ```
//!
//! Missing files and missing keys fall back to defaults.

mod file;
mod keys;

pub use file::{
    AcquisitionConfig, CatalogConfig, ConfigFile, LoggingConfig, ViewerConfig, DEFAULT_LOG_LEVEL,
};
pub use keys::ConfigKey;

use std::path::PathBuf;

use thiserror::Error;

/// Errors from reading, writing or editing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(String),

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Directory holding Cupola's configuration.
pub fn config_directory() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cupola")
}

/// Full path of the configuration file.
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
