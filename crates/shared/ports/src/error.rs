use thiserror::Error;

/// Failures reported synchronously by a venue call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VenueError {
    /// The venue cannot be reached at all
    #[error("Venue unreachable: {0}")]
    Disconnected(String),

    /// The venue refused this particular call
    #[error("Call rejected: {0}")]
    Rejected(String),

    #[error("Invalid call: {0}")]
    InvalidCall(String),
}

impl VenueError {
    /// Connectivity faults are worth retrying; rejections are not
    pub fn is_connectivity(&self) -> bool {
        matches!(self, VenueError::Disconnected(_))
    }
}

pub type VenueResult<T> = std::result::Result<T, VenueError>;
