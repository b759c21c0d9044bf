//! Shared command setup: configuration and logging.

use std::path::Path;

use quakemap::config::ConfigFile;
use quakemap::logging::{init_logging, level_for_verbosity, LoggingGuard};
use tracing::info;

use crate::error::CliError;

/// Holds what every networked or parsing command needs.
pub struct CliRunner {
    config: ConfigFile,
    _logging: LoggingGuard,
}

impl CliRunner {
    /// Loads configuration and installs logging.
    ///
    /// `verbose > 0` overrides the configured log level.
    pub fn new(config_path: Option<&Path>, verbose: u8) -> Result<Self, CliError> {
        let config = load_config(config_path)?;

        let mut logging = config.logging.clone();
        if verbose > 0 {
            logging = logging.with_level(level_for_verbosity(verbose));
        }
        let guard = init_logging(&logging)?;

        Ok(Self {
            config,
            _logging: guard,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn log_startup(&self, command: &str) {
        info!(
            version = quakemap::VERSION,
            command,
            endpoint = %self.config.feed.endpoint,
            "QuakeMap starting"
        );
    }
}

/// Loads the file at `config_path`, or the default location.
///
/// A file that does not exist yields the defaults in both cases.
pub fn load_config(config_path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let config = match config_path {
        Some(path) if path.exists() => ConfigFile::load_from(path)?,
        Some(_) => ConfigFile::default(),
        None => ConfigFile::load()?,
    };
    Ok(config)
}
