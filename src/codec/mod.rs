//! Wire codecs
//!
//! Pure conversions between domain values and the database's formats:
//!
//! - **duration**: `1h2m3s` duration literals
//! - **line_protocol**: point → line protocol encoding
//! - **response**: JSON result envelopes, error bodies and response headers
//! - **retention**: `SHOW RETENTION POLICIES` rows → `RetentionPolicy`

pub mod duration;
pub mod error;
pub mod line_protocol;
pub mod response;
pub mod retention;

pub use error::{CodecError, CodecResult};
pub use line_protocol::LineProtocolEncoder;
pub use response::ResponseDecoder;
pub use retention::RetentionPolicyDecoder;
