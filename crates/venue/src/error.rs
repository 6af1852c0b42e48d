//! Error types for the venue crate

use relay_core::RecordError;
use relay_engine::EngineError;
use thiserror::Error;

/// Reply content that could not be turned into an outcome
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    #[error("Login failed ({code}): {reason}")]
    LoginFailed { code: i64, reason: &'static str },

    #[error("Empty reply for {0}")]
    EmptyReply(String),
}

impl From<DecodeError> for EngineError {
    fn from(err: DecodeError) -> Self {
        EngineError::Decode(err.to_string())
    }
}
