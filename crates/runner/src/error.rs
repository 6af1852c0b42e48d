use relay_engine::{ConfigError, EngineError};
use relay_ports::VenueError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Venue(#[from] VenueError),

    #[error("Startup timed out with {0} request(s) outstanding")]
    StartupTimeout(usize),
}

pub type Result<T> = std::result::Result<T, RunnerError>;
