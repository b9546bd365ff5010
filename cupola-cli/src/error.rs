//! CLI error type.

use std::fmt;

use cupola::app::AppError;
use cupola::config::ConfigError;

/// Errors that end a CLI command.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be read, validated or written.
    Config(String),

    /// The viewer context reported an error.
    App(AppError),

    /// A command-line argument was rejected.
    InvalidArgument(String),

    /// A worker thread panicked.
    WorkerPanicked(&'static str),

    /// Terminal or filesystem I/O failed.
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::App(e) => write!(f, "{}", e),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::WorkerPanicked(name) => write!(f, "The {} worker stopped unexpectedly", name),
            CliError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::App(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        CliError::App(e)
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
