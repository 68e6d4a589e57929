//! Record mapping
//!
//! Declarative schemas for user record types and the mapper that converts
//! them to and from points:
//!
//! - **schema**: `Record`, `Schema` and the member value traits
//! - **naming**: wire-name resolution
//! - **mapper**: record ↔ point conversion

pub mod error;
pub mod mapper;
pub mod naming;
pub mod schema;

pub use error::{MappingError, MappingResult};
pub use mapper::Mapper;
pub use naming::{to_snake_case, NamingStrategy};
pub use schema::{FieldType, Marker, Member, Record, Role, Schema, TagType, TimestampType};
