//! Mapping error types
//!
//! Errors raised while converting between records and points.

use thiserror::Error;

use super::schema::Marker;

/// Errors that can occur in the record mapper
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// A required identifier was blank
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A point value could not be assigned to the member's declared type
    #[error("Member '{member}' cannot hold a {found} value, expected {expected}")]
    InvalidAnnotatedType {
        member: String,
        expected: String,
        found: String,
    },

    /// The record carries no usable member for a required marker
    #[error("No member of '{record}' marked as {marker} holds a value")]
    MissingAnnotatedMember { record: String, marker: Marker },

    /// More than one member carries a marker that must be unique
    #[error("More than one member of '{record}' is marked as {marker}")]
    DuplicateAnnotatedMembers { record: String, marker: Marker },

    /// The target record has no constructor registered
    #[error("Could not instantiate '{0}': no constructor registered")]
    Instantiation(String),
}

/// Result type alias for mapping operations
pub type MappingResult<T> = Result<T, MappingError>;
