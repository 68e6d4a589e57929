//! Line protocol encoding
//!
//! Points are grouped by their rendered tag set. Each group becomes one
//! entry: the `measurement[,tags]` prefix followed by the field set (and
//! optional millisecond timestamp) of every point in the group, joined by
//! newlines.

use std::collections::BTreeMap;

use tracing::debug;

use super::error::{CodecError, CodecResult};
use crate::domain::Point;

/// Encodes points into line protocol for writing
#[derive(Debug, Clone, Copy, Default)]
pub struct LineProtocolEncoder;

impl LineProtocolEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encode points destined for `measurement`, one entry per distinct tag set
    pub fn encode(&self, measurement: &str, points: &[Point]) -> CodecResult<Vec<String>> {
        if measurement.trim().is_empty() {
            return Err(CodecError::InvalidArgument(
                "Measurement name cannot be blank".to_string(),
            ));
        }

        let mut groups: BTreeMap<String, Vec<&Point>> = BTreeMap::new();
        for point in points {
            groups.entry(tag_set(point)).or_default().push(point);
        }

        debug!(
            measurement = measurement,
            tag_sets = groups.len(),
            "Grouped {} points by tag set",
            points.len()
        );

        Ok(groups
            .into_iter()
            .map(|(tags, group)| render_group(measurement, &tags, &group))
            .collect())
    }
}

fn tag_set(point: &Point) -> String {
    point
        .tags()
        .iter()
        .map(|(name, value)| format!("{}={}", name, escape_whitespace(value)))
        .collect::<Vec<_>>()
        .join(",")
}

fn escape_whitespace(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r') {
            escaped.push_str("\\ ");
        } else {
            escaped.push(c);
        }
    }
    escaped
}

fn render_group(measurement: &str, tags: &str, points: &[&Point]) -> String {
    let mut line = String::from(measurement);
    if !tags.is_empty() {
        line.push(',');
        line.push_str(tags);
    }

    let field_sets: Vec<String> = points
        .iter()
        .map(|point| {
            let mut fields = point
                .fields()
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join(",");
            if let Some(ts) = point.timestamp() {
                fields.push(' ');
                fields.push_str(&ts.timestamp_millis().to_string());
            }
            fields
        })
        .collect();

    line.push(' ');
    line.push_str(&field_sets.join("\n"));
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn point(tag: &str) -> Point {
        Point::builder()
            .tag("some_tag", tag)
            .field("some_field", 1i64)
            .build()
    }

    #[test]
    fn test_distinct_tag_sets() {
        let encoder = LineProtocolEncoder::new();
        let lines = encoder
            .encode("some_measurement", &[point("1"), point("2")])
            .unwrap();
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_shared_tag_set() {
        let encoder = LineProtocolEncoder::new();
        let lines = encoder
            .encode("some_measurement", &[point("1"), point("1")])
            .unwrap();
        assert_eq!(
            lines,
            vec!["some_measurement,some_tag=1 some_field=1\nsome_field=1".to_string()]
        );
    }

    #[test]
    fn test_timestamp_and_escaping() {
        let encoder = LineProtocolEncoder::new();
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let point = Point::builder()
            .timestamp(at)
            .tag("host", "web 1")
            .field("load", 0.5)
            .field("up", true)
            .build();

        let lines = encoder.encode("cpu", &[point]).unwrap();
        assert_eq!(
            lines,
            vec![format!(
                "cpu,host=web\\ 1 load=0.5,up=true {}",
                at.timestamp_millis()
            )]
        );
    }

    #[test]
    fn test_only_ascii_whitespace_escaped() {
        let encoder = LineProtocolEncoder::new();
        let lines = encoder
            .encode("m", &[point("a\tb\nc"), point("a\u{00A0}b")])
            .unwrap();
        assert!(lines.contains(&"m,some_tag=a\\ b\\ c some_field=1".to_string()));
        assert!(lines.contains(&"m,some_tag=a\u{00A0}b some_field=1".to_string()));
    }

    #[test]
    fn test_untagged_points() {
        let encoder = LineProtocolEncoder::new();
        let point = Point::builder().field("value", 3i64).build();
        assert_eq!(encoder.encode("m", &[point]).unwrap(), vec!["m value=3"]);
    }

    #[test]
    fn test_empty_and_blank() {
        let encoder = LineProtocolEncoder::new();
        assert!(encoder.encode("m", &[]).unwrap().is_empty());
        assert!(matches!(
            encoder.encode(" ", &[point("1")]),
            Err(CodecError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_grouping_is_stable() {
        let encoder = LineProtocolEncoder::new();
        let points = vec![point("a"), point("b"), point("a")];
        let first = encoder.encode("m", &points).unwrap();
        let second = encoder.encode("m", &points).unwrap();
        assert_eq!(first.len(), second.len());
        assert_eq!(first, second);
    }
}
