//! Domain types
//!
//! Immutable values exchanged between the codecs, the mapper and the client:
//!
//! - **point**: `Point` and its scalar `FieldValue`
//! - **series**: `Series` and per-statement `QueryResult`
//! - **retention**: validated `RetentionPolicy`
//! - **version**: server `Version`, `BuildType` and `ResponseMetadata`
//! - **error**: construction errors

pub mod error;
pub mod point;
pub mod retention;
pub mod series;
pub mod version;

pub use error::{DomainError, DomainResult};
pub use point::{FieldValue, Point, PointBuilder};
pub use retention::{RetentionPolicy, RetentionPolicyBuilder};
pub use series::{QueryResult, Series};
pub use version::{BuildType, ResponseMetadata, Version};
