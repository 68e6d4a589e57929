//! Codec error types

use thiserror::Error;

use crate::domain::DomainError;

/// Errors that can occur while encoding or decoding wire formats
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The response body is not a valid result envelope
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The envelope parsed but its content is inconsistent
    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Invalid timestamp: {0}")]
    Timestamp(String),

    #[error("Invalid header '{name}': {value}")]
    Header { name: &'static str, value: String },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Result type alias for codec operations
pub type CodecResult<T> = Result<T, CodecError>;
