//! # fluxline
//!
//! Client for time-series databases that accept line protocol over HTTP and
//! answer queries with a JSON result envelope.
//!
//! ## Features
//!
//! - **Record mapping**: declarative schemas map your own types to points and back
//! - **Line protocol**: points grouped by tag set and encoded for batch writes
//! - **Response decoding**: typed results from the JSON envelope and response headers
//! - **Management**: databases and retention policies with existence checks
//!
//! ## Modules
//!
//! - [`domain`]: points, series, retention policies and server metadata
//! - [`mapping`]: record schemas, naming strategy and the record mapper
//! - [`codec`]: duration literals, line protocol and response decoding
//! - [`client`]: transport, statement API, managers and the client facade
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chrono::{DateTime, Utc};
//! use fluxline::mapping::{Record, Schema};
//! use fluxline::FluxClient;
//! use std::time::Duration;
//!
//! #[derive(Default)]
//! struct CpuLoad {
//!     time: Option<DateTime<Utc>>,
//!     host: String,
//!     load: f64,
//! }
//!
//! impl Record for CpuLoad {
//!     fn schema() -> Schema<Self> {
//!         Schema::<Self>::new("CpuLoad")
//!             .timestamp("time", |r| &r.time, |r| &mut r.time)
//!             .tag("host", |r| &r.host, |r| &mut r.host)
//!             .field("load", |r| &r.load, |r| &mut r.load)
//!             .default_constructor()
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FluxClient::connect("http://localhost:8086", Duration::from_secs(10)).await?;
//!
//!     if !client.database_exists("metrics").await? {
//!         client.create_database("metrics").await?;
//!     }
//!     let metrics = client.use_database("metrics").await?;
//!
//!     let reading = CpuLoad {
//!         time: Some(Utc::now()),
//!         host: "web-1".to_string(),
//!         load: 0.42,
//!     };
//!     metrics.write(&[reading], None).await?;
//!
//!     let readings: Vec<CpuLoad> = metrics.get_all().await?;
//!     println!("Found {} readings", readings.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod codec;
pub mod config;
pub mod domain;
pub mod mapping;

// Re-export top-level types for convenience
pub use client::{
    ApiClient, ApiResponse, ClientError, ClientResult, DatabaseHandle, FluxClient, HttpTransport,
    RawResponse, Transport,
};

pub use codec::{CodecError, CodecResult, LineProtocolEncoder, ResponseDecoder, RetentionPolicyDecoder};

pub use domain::{
    BuildType, DomainError, FieldValue, Point, PointBuilder, QueryResult, ResponseMetadata,
    RetentionPolicy, Series, Version,
};

pub use mapping::{Mapper, MappingError, NamingStrategy, Record, Schema};

pub use config::{ClientConfig, Config, ConfigError, LoggingConfig};
