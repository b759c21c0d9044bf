//! Configuration file support.
//!
//! Settings live in an INI file at `~/.config/quakemap/config.ini` (the
//! platform config directory on other systems). A missing file, section or
//! key falls back to the built-in default.
//!
//! ```ini
//! [feed]
//! endpoint = https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_{window}.quakeml
//! timeout_secs = 30
//! default_window = day
//!
//! [parser]
//! convert_depth_to_km = true
//! radius_formula = linear
//! strict_magnitude = true
//! namespace = http://quakeml.org/xmlns/bed/1.2
//!
//! [filter]
//! min_magnitude =
//! max_magnitude =
//! region = All
//!
//! [logging]
//! level = warn
//! directory =
//! ```

mod file;

pub use file::{ConfigFile, FeedSettings, FilterSettings};

use std::path::PathBuf;

use thiserror::Error;

/// Name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Directory name used under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "quakemap";

/// Errors from loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or parse the config file.
    #[error("failed to read {}: {reason}", path.display())]
    Read { path: PathBuf, reason: String },

    /// Failed to write the config file.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The text is not valid INI.
    #[error("invalid configuration syntax: {0}")]
    Parse(String),

    /// A key holds a value of the wrong shape.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Directory holding the configuration file.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Full path of the configuration file.
pub fn config_file_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}
