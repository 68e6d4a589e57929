//! Retention policy value type

use chrono::Duration;
use serde::Serialize;
use std::fmt;

use super::error::{DomainError, DomainResult};

/// A named data-retention and replication configuration of a database
///
/// Instances are only created through [`RetentionPolicyBuilder`], which
/// validates every invariant up front.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetentionPolicy {
    name: String,
    /// How long data is kept; zero means forever
    #[serde(serialize_with = "serialize_secs")]
    duration: Duration,
    /// Number of copies kept in a cluster, at least one
    replication: u32,
    /// Time span covered by each shard group; zero lets the database derive it
    #[serde(serialize_with = "serialize_secs")]
    shard_duration: Duration,
    is_default: bool,
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_i64(d.num_seconds())
}

impl RetentionPolicy {
    /// Start building a policy with the two mandatory values
    pub fn builder(name: impl Into<String>, duration: Duration) -> RetentionPolicyBuilder {
        RetentionPolicyBuilder::new(name, duration)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn replication(&self) -> u32 {
        self.replication
    }

    pub fn shard_duration(&self) -> Duration {
        self.shard_duration
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// Copy of this policy with a different duration
    pub fn with_duration(&self, duration: Duration) -> DomainResult<Self> {
        RetentionPolicyBuilder::from(self).duration(duration).build()
    }

    /// Copy of this policy with a different replication factor
    pub fn with_replication(&self, replication: u32) -> DomainResult<Self> {
        RetentionPolicyBuilder::from(self)
            .replication(replication)
            .build()
    }

    /// Copy of this policy with a different shard group duration
    pub fn with_shard_duration(&self, shard_duration: Duration) -> DomainResult<Self> {
        RetentionPolicyBuilder::from(self)
            .shard_duration(shard_duration)
            .build()
    }

    /// Copy of this policy with the default flag changed
    pub fn as_default(&self, is_default: bool) -> DomainResult<Self> {
        RetentionPolicyBuilder::from(self).default(is_default).build()
    }
}

impl fmt::Display for RetentionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RetentionPolicy {{ name: '{}', duration: {}s, replication: {}, shard_duration: {}s, default: {} }}",
            self.name,
            self.duration.num_seconds(),
            self.replication,
            self.shard_duration.num_seconds(),
            self.is_default
        )
    }
}

/// Builds [`RetentionPolicy`] values
#[derive(Debug, Clone)]
pub struct RetentionPolicyBuilder {
    name: String,
    duration: Duration,
    replication: u32,
    shard_duration: Duration,
    is_default: bool,
}

impl RetentionPolicyBuilder {
    /// Replication defaults to 1, shard duration to zero, default flag to false
    pub fn new(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            duration,
            replication: 1,
            shard_duration: Duration::zero(),
            is_default: false,
        }
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn replication(mut self, replication: u32) -> Self {
        self.replication = replication;
        self
    }

    pub fn shard_duration(mut self, shard_duration: Duration) -> Self {
        self.shard_duration = shard_duration;
        self
    }

    pub fn default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    /// Validate the collected values and build the policy
    pub fn build(self) -> DomainResult<RetentionPolicy> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidRetentionPolicy(
                "name cannot be blank".to_string(),
            ));
        }
        if self.duration < Duration::zero() {
            return Err(DomainError::InvalidRetentionPolicy(
                "duration cannot be negative".to_string(),
            ));
        }
        if self.replication < 1 {
            return Err(DomainError::InvalidRetentionPolicy(
                "replication must be at least 1".to_string(),
            ));
        }
        if self.shard_duration < Duration::zero() {
            return Err(DomainError::InvalidRetentionPolicy(
                "shard duration cannot be negative".to_string(),
            ));
        }

        Ok(RetentionPolicy {
            name: self.name,
            duration: self.duration,
            replication: self.replication,
            shard_duration: self.shard_duration,
            is_default: self.is_default,
        })
    }
}

impl From<&RetentionPolicy> for RetentionPolicyBuilder {
    fn from(policy: &RetentionPolicy) -> Self {
        Self {
            name: policy.name.clone(),
            duration: policy.duration,
            replication: policy.replication,
            shard_duration: policy.shard_duration,
            is_default: policy.is_default,
        }
    }
}
