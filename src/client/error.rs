//! Client error types

use thiserror::Error;

use crate::codec::CodecError;
use crate::domain::DomainError;
use crate::mapping::MappingError;

/// Errors that can occur while talking to the database
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("Database unavailable at {0}")]
    Unavailable(String),

    /// Non-success status, with the message from the error body
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A statement in an otherwise successful response was rejected
    #[error("Query rejected: {0}")]
    QueryRejected(String),

    /// The statement has a shape this call does not accept
    #[error("Illegal statement: {0}")]
    IllegalStatement(String),

    #[error("Unknown database '{0}'")]
    UnknownDatabase(String),

    #[error("Database '{0}' already exists")]
    DatabaseAlreadyExists(String),

    #[error("Unknown retention policy '{policy}' on database '{database}'")]
    UnknownRetentionPolicy { policy: String, database: String },

    #[error("Retention policy '{policy}' already exists on database '{database}'")]
    RetentionPolicyAlreadyExists { policy: String, database: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;
