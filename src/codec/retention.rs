//! Retention policy decoding
//!
//! Reads the rows returned by `SHOW RETENTION POLICIES`: tags `name`,
//! `duration` and `shardGroupDuration`, fields `replicaN` and `default`.

use super::duration;
use super::error::{CodecError, CodecResult};
use crate::domain::{Point, RetentionPolicy};

/// Builds retention policies from introspection points
#[derive(Debug, Clone, Copy, Default)]
pub struct RetentionPolicyDecoder;

impl RetentionPolicyDecoder {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, point: &Point) -> CodecResult<RetentionPolicy> {
        let name = required_tag(point, "name")?;
        let policy_duration = duration::parse(required_tag(point, "duration")?)?;
        let shard_duration = duration::parse(required_tag(point, "shardGroupDuration")?)?;

        let replication = point
            .field("replicaN")
            .and_then(|v| v.as_i64())
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| missing("replicaN"))?;
        let is_default = point
            .field("default")
            .and_then(|v| v.as_bool())
            .ok_or_else(|| missing("default"))?;

        Ok(RetentionPolicy::builder(name, policy_duration)
            .replication(replication)
            .shard_duration(shard_duration)
            .default(is_default)
            .build()?)
    }
}

fn required_tag<'a>(point: &'a Point, name: &str) -> CodecResult<&'a str> {
    point.tag(name).ok_or_else(|| missing(name))
}

fn missing(name: &str) -> CodecError {
    CodecError::InvalidArgument(format!("Retention policy point has no valid '{name}' value"))
}
