//! CLI error type.

use std::fmt;
use std::path::PathBuf;

use quakemap::config::ConfigError;
use quakemap::logging::LoggingError;
use quakemap::PipelineError;

/// Errors surfaced to the user by the CLI.
#[derive(Debug)]
pub enum CliError {
    /// Invalid command-line or configuration input.
    Config(String),
    /// Configuration file could not be loaded or saved.
    ConfigFile(ConfigError),
    /// Logging could not be initialized.
    Logging(LoggingError),
    /// Pipeline failure not yet shown to the user.
    Pipeline(PipelineError),
    /// Reading an input file failed.
    Io { path: PathBuf, source: std::io::Error },
    /// JSON output could not be produced.
    Json(serde_json::Error),
    /// The failure was already shown by the view; exit without a message.
    Reported,
}

impl CliError {
    /// Prints the error and exits with status 1.
    pub fn exit(&self) -> ! {
        if !matches!(self, CliError::Reported) {
            eprintln!("Error: {}", self);
        }
        std::process::exit(1);
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "{}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Logging(e) => write!(f, "{}", e),
            CliError::Pipeline(e) => write!(f, "{}", e.user_message()),
            CliError::Io { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
            CliError::Json(e) => write!(f, "Failed to encode JSON: {}", e),
            CliError::Reported => write!(f, "failed"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::Pipeline(e) => Some(e),
            CliError::Io { source, .. } => Some(source),
            CliError::Json(e) => Some(e),
            CliError::Config(_) | CliError::Reported => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<PipelineError> for CliError {
    fn from(e: PipelineError) -> Self {
        CliError::Pipeline(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}
