//! Domain error types
//!
//! Errors raised while constructing the crate's value objects.

use thiserror::Error;

/// Errors that can occur when building domain values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A retention policy failed one of its construction invariants
    #[error("Invalid retention policy: {0}")]
    InvalidRetentionPolicy(String),

    /// A version string did not match `v?D.D.D`
    #[error("Invalid version format: {0}")]
    InvalidVersion(String),

    /// No build type exists for the given identifier
    #[error("Invalid build type identifier: {0}")]
    UnknownBuildType(String),
}

/// Result type alias for domain construction
pub type DomainResult<T> = Result<T, DomainError>;
