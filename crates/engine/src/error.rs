//! Error types for the engine crate

use relay_core::{RecordError, RequestName};
use relay_ports::VenueError;
use thiserror::Error;

/// Errors surfaced to callers and completion handlers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Venue error: {0}")]
    Venue(#[from] VenueError),

    #[error("Request {name} gave up after {attempts} attempts")]
    RetriesExhausted { name: RequestName, attempts: u32 },

    #[error("No completion handler registered for {0}")]
    NoHandler(RequestName),

    #[error("Fetch {name} was superseded by a newer fetch")]
    Superseded { name: RequestName },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Broker is already running")]
    AlreadyRunning,

    #[error("Broker is shut down")]
    ShutDown,
}

impl From<RecordError> for EngineError {
    fn from(err: RecordError) -> Self {
        EngineError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Configuration loading errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
