use thiserror::Error;

/// Errors turning raw venue records into typed values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {value:?}")]
    InvalidField { field: String, value: String },
}

pub type RecordResult<T> = std::result::Result<T, RecordError>;
