//! Database client
//!
//! Layers, from the wire up:
//!
//! - **transport**: the `Transport` trait and its `reqwest` implementation
//! - **api**: statement guards and response interpretation
//! - **database** / **retention**: management statements
//! - **facade**: `FluxClient` and the per-database `DatabaseHandle`

pub mod api;
pub mod database;
pub mod error;
pub mod facade;
pub mod retention;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiClient, ApiResponse};
pub use database::{DatabaseManager, INTERNAL_DATABASE};
pub use error::{ClientError, ClientResult};
pub use facade::{DatabaseHandle, FluxClient};
pub use retention::RetentionPolicyManager;
pub use transport::{HttpTransport, RawResponse, Transport};
