//! Query result containers
//!
//! - `Series`: a named group of points sharing one series key
//! - `QueryResult`: the series produced by one statement of a query

use serde::Serialize;
use std::collections::BTreeSet;

use super::point::Point;

/// A named collection of points returned for one series
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Series {
    name: String,
    /// Column names recognised as tags in this series
    tags: BTreeSet<String>,
    points: Vec<Point>,
}

impl Series {
    /// Create a series, collecting the tag names seen across its points
    pub fn new(name: impl Into<String>, points: Vec<Point>) -> Self {
        let tags = points
            .iter()
            .flat_map(|p| p.tags().keys().cloned())
            .collect();
        Self {
            name: name.into(),
            tags,
            points,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// The outcome of one statement within a query
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct QueryResult {
    /// Zero-based index of the statement this result belongs to
    statement_id: u32,
    /// Error reported by the database for this statement
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    series: Vec<Series>,
}

impl QueryResult {
    pub fn new(statement_id: u32, error: Option<String>, series: Vec<Series>) -> Self {
        Self {
            statement_id,
            error,
            series,
        }
    }

    pub fn statement_id(&self) -> u32 {
        self.statement_id
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn into_series(self) -> Vec<Series> {
        self.series
    }
}
