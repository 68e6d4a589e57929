//! Server identification types
//!
//! Values describing the database instance a response came from, read from
//! the response headers of every call.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::error::{DomainError, DomainResult};

/// A `major.minor.patch` version triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Version {
    major: u32,
    minor: u32,
    patch: u32,
}

impl Version {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a version string such as `1.7.4` or `v1.7.4`
    pub fn parse(input: &str) -> DomainResult<Self> {
        let re = regex::Regex::new(r"^v?(\d+)\.(\d+)\.(\d+)$")
            .map_err(|e| DomainError::InvalidVersion(e.to_string()))?;

        let caps = re
            .captures(input)
            .ok_or_else(|| DomainError::InvalidVersion(input.to_string()))?;

        let component = |idx: usize| -> DomainResult<u32> {
            caps[idx]
                .parse()
                .map_err(|_| DomainError::InvalidVersion(input.to_string()))
        };

        Ok(Self::new(component(1)?, component(2)?, component(3)?))
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    pub fn patch(&self) -> u32 {
        self.patch
    }
}

impl FromStr for Version {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Edition of the database server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BuildType {
    /// Open source build, identified as `OSS`
    OpenSource,
    /// Enterprise build, identified as `ENT`
    Enterprise,
}

impl BuildType {
    /// Shorthand identifier sent in the `X-Influxdb-Build` header
    pub fn identifier(&self) -> &'static str {
        match self {
            BuildType::OpenSource => "OSS",
            BuildType::Enterprise => "ENT",
        }
    }

    /// Look up a build type by its shorthand identifier
    pub fn from_identifier(identifier: &str) -> DomainResult<Self> {
        match identifier {
            "OSS" => Ok(BuildType::OpenSource),
            "ENT" => Ok(BuildType::Enterprise),
            other => Err(DomainError::UnknownBuildType(other.to_string())),
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildType::OpenSource => write!(f, "OSS"),
            BuildType::Enterprise => write!(f, "Enterprise"),
        }
    }
}

/// Metadata carried by the headers of every response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseMetadata {
    /// Server time of the response, or local time when the header is missing
    pub timestamp: DateTime<Utc>,
    pub request_id: Option<String>,
    pub build_type: Option<BuildType>,
    pub version: Option<Version>,
}
