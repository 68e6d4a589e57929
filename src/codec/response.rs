//! Response decoding
//!
//! Turns the JSON result envelope returned by `/query` into typed
//! [`QueryResult`]s, reads error bodies, and extracts [`ResponseMetadata`]
//! from the headers every response carries.

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::error::{CodecError, CodecResult};
use crate::domain::{BuildType, FieldValue, Point, QueryResult, ResponseMetadata, Series, Version};

pub const DATE_HEADER: &str = "date";
pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const BUILD_TYPE_HEADER: &str = "x-influxdb-build";
pub const VERSION_HEADER: &str = "x-influxdb-version";

/// Name of the column holding the row timestamp
const TIME_COLUMN: &str = "time";

// ============================================
// Envelope
// ============================================

#[derive(Debug, Default, Deserialize)]
struct ResponseEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    results: Vec<ResultEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct ResultEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    statement_id: u32,
    #[serde(default)]
    error: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    series: Vec<SeriesEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct SeriesEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    columns: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    values: Vec<Vec<Value>>,
}

/// Missing keys and explicit `null`s both decode as the empty value
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

// ============================================
// Decoder
// ============================================

/// Decodes response bodies and headers
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseDecoder;

impl ResponseDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode a result envelope into per-statement results
    pub fn decode(&self, body: &str) -> CodecResult<Vec<QueryResult>> {
        let content = body.strip_suffix('\n').unwrap_or(body);
        debug!(body = content, "Decoding response body");

        let envelope: ResponseEnvelope = serde_json::from_str(content)?;
        envelope
            .results
            .into_iter()
            .map(|result| -> CodecResult<QueryResult> {
                let series = result
                    .series
                    .into_iter()
                    .map(decode_series)
                    .collect::<CodecResult<Vec<_>>>()?;
                Ok(QueryResult::new(result.statement_id, result.error, series))
            })
            .collect()
    }

    /// Extract the message from an error body such as `{"error":"..."}`
    pub fn decode_error(&self, body: &str) -> CodecResult<String> {
        let content = body.strip_suffix('\n').unwrap_or(body);
        debug!(body = content, "Decoding error body");

        let error: ErrorBody = serde_json::from_str(content)?;
        Ok(error.error)
    }

    /// Read server metadata from response headers
    ///
    /// A missing `Date` falls back to the local clock; other headers are optional.
    pub fn decode_headers(&self, headers: &HeaderMap) -> CodecResult<ResponseMetadata> {
        let timestamp = match header(headers, DATE_HEADER)? {
            Some(value) => DateTime::parse_from_rfc2822(value)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| CodecError::Header {
                    name: DATE_HEADER,
                    value: value.to_string(),
                })?,
            None => Utc::now(),
        };

        let request_id = header(headers, REQUEST_ID_HEADER)?.map(str::to_string);
        let build_type = header(headers, BUILD_TYPE_HEADER)?
            .map(BuildType::from_identifier)
            .transpose()?;
        let version = header(headers, VERSION_HEADER)?
            .map(Version::parse)
            .transpose()?;

        Ok(ResponseMetadata {
            timestamp,
            request_id,
            build_type,
            version,
        })
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &'static str) -> CodecResult<Option<&'a str>> {
    headers
        .get(name)
        .map(|value| {
            value.to_str().map_err(|_| CodecError::Header {
                name,
                value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
            })
        })
        .transpose()
}

fn decode_series(entry: SeriesEntry) -> CodecResult<Series> {
    let points = entry
        .values
        .iter()
        .map(|row| decode_row(&entry.columns, row))
        .collect::<CodecResult<Vec<_>>>()?;
    Ok(Series::new(entry.name, points))
}

fn decode_row(columns: &[String], row: &[Value]) -> CodecResult<Point> {
    if row.len() < columns.len() {
        return Err(CodecError::Malformed(format!(
            "row has {} values for {} columns",
            row.len(),
            columns.len()
        )));
    }

    let mut builder = Point::builder();
    let mut start = 0;
    if columns.first().map(String::as_str) == Some(TIME_COLUMN) {
        builder = builder.timestamp(parse_timestamp(&row[0])?);
        start = 1;
    }

    for (column, cell) in columns.iter().zip(row).skip(start) {
        builder = match classify(cell) {
            Cell::Field(value) => builder.field(column.as_str(), value),
            Cell::Tag(value) => builder.tag(column.as_str(), value),
        };
    }

    Ok(builder.build())
}

fn parse_timestamp(cell: &Value) -> CodecResult<DateTime<Utc>> {
    let text = match cell {
        Value::String(s) => s.as_str(),
        other => return Err(CodecError::Timestamp(other.to_string())),
    };
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CodecError::Timestamp(format!("{text}: {e}")))
}

enum Cell {
    Field(FieldValue),
    Tag(String),
}

/// Numbers and booleans are fields; everything else is a tag in string form
fn classify(cell: &Value) -> Cell {
    match cell {
        Value::Bool(b) => Cell::Field(FieldValue::Boolean(*b)),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Cell::Field(FieldValue::Integer(i)),
            (None, Some(f)) => Cell::Field(FieldValue::Float(f)),
            (None, None) => Cell::Tag(n.to_string()),
        },
        Value::String(s) => Cell::Tag(s.clone()),
        other => Cell::Tag(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_decode_single_series() {
        let body = r#"{"results":[{"statement_id":0,"series":[{"name":"measurement_1","columns":["time","tag_1","field_1"],"values":[["2019-01-05T10:15:30Z","tag",1]]}]}]}
"#;
        let results = ResponseDecoder::new().decode(body).unwrap();
        assert_eq!(results.len(), 1);

        let series = &results[0].series()[0];
        assert_eq!(series.name(), "measurement_1");
        assert_eq!(series.points().len(), 1);

        let point = &series.points()[0];
        assert_eq!(
            point.timestamp(),
            Some(Utc.with_ymd_and_hms(2019, 1, 5, 10, 15, 30).unwrap())
        );
        assert_eq!(point.tag("tag_1"), Some("tag"));
        assert_eq!(point.field("field_1"), Some(&FieldValue::Integer(1)));
    }

    #[test]
    fn test_decode_without_time_column() {
        let body = r#"{"results":[{"statement_id":0,"series":[{"name":"retention_policies","columns":["name","duration","shardGroupDuration","replicaN","default"],"values":[["autogen","0s","168h0m0s",1,true]]}]}]}"#;
        let results = ResponseDecoder::new().decode(body).unwrap();
        let point = &results[0].series()[0].points()[0];

        assert!(point.timestamp().is_none());
        assert_eq!(point.tag("name"), Some("autogen"));
        assert_eq!(point.tag("shardGroupDuration"), Some("168h0m0s"));
        assert_eq!(point.field("replicaN"), Some(&FieldValue::Integer(1)));
        assert_eq!(point.field("default"), Some(&FieldValue::Boolean(true)));
    }

    #[test]
    fn test_cell_classification() {
        let body = r#"{"results":[{"series":[{"name":"m","columns":["a","b","c","d"],"values":[[1.5,null,"x",[1]],["1",2,false,{"k":1}]]}]}]}"#;
        let results = ResponseDecoder::new().decode(body).unwrap();
        let points = results[0].series()[0].points();

        assert_eq!(points[0].field("a"), Some(&FieldValue::Float(1.5)));
        assert_eq!(points[0].tag("b"), Some("null"));
        assert_eq!(points[0].tag("c"), Some("x"));
        assert_eq!(points[0].tag("d"), Some("[1]"));
        // classification is per cell, not per column
        assert_eq!(points[1].tag("a"), Some("1"));
        assert_eq!(points[1].field("b"), Some(&FieldValue::Integer(2)));
        assert_eq!(points[1].field("c"), Some(&FieldValue::Boolean(false)));
    }

    #[test]
    fn test_decode_statement_error_and_empty() {
        let body = r#"{"results":[{"statement_id":2,"error":"database not found: x"},{"statement_id":3,"extra":true}]}"#;
        let results = ResponseDecoder::new().decode(body).unwrap();

        assert_eq!(results[0].statement_id(), 2);
        assert_eq!(results[0].error(), Some("database not found: x"));
        assert!(results[0].series().is_empty());
        assert_eq!(results[1].error(), None);

        assert!(ResponseDecoder::new().decode("{}").unwrap().is_empty());
    }

    #[test]
    fn test_decode_null_collections() {
        let decoder = ResponseDecoder::new();

        let results = decoder
            .decode(r#"{"results":[{"statement_id":0,"series":null}]}"#)
            .unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].series().is_empty());

        let results = decoder
            .decode(r#"{"results":[{"series":[{"name":"cpu","columns":["time","usage"],"values":null}]}]}"#)
            .unwrap();
        assert_eq!(results[0].series()[0].name(), "cpu");
        assert!(results[0].series()[0].is_empty());

        assert!(decoder.decode(r#"{"results":null}"#).unwrap().is_empty());
    }

    #[test]
    fn test_decode_failures() {
        let decoder = ResponseDecoder::new();
        assert!(matches!(
            decoder.decode("not json"),
            Err(CodecError::Deserialization(_))
        ));

        let bad_time = r#"{"results":[{"series":[{"name":"m","columns":["time","v"],"values":[["yesterday",1]]}]}]}"#;
        assert!(matches!(
            decoder.decode(bad_time),
            Err(CodecError::Timestamp(_))
        ));

        let short_row = r#"{"results":[{"series":[{"name":"m","columns":["a","b"],"values":[[1]]}]}]}"#;
        assert!(matches!(
            decoder.decode(short_row),
            Err(CodecError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_error_body() {
        let decoder = ResponseDecoder::new();
        assert_eq!(
            decoder
                .decode_error("{\"error\":\"database not found\"}\n")
                .unwrap(),
            "database not found"
        );
        assert!(decoder.decode_error("{}").is_err());
    }

    #[test]
    fn test_decode_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(DATE_HEADER, HeaderValue::from_static("Sat, 05 Jan 2019 10:15:30 GMT"));
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("abc-123"));
        headers.insert(BUILD_TYPE_HEADER, HeaderValue::from_static("OSS"));
        headers.insert(VERSION_HEADER, HeaderValue::from_static("1.7.4"));

        let metadata = ResponseDecoder::new().decode_headers(&headers).unwrap();
        assert_eq!(
            metadata.timestamp,
            Utc.with_ymd_and_hms(2019, 1, 5, 10, 15, 30).unwrap()
        );
        assert_eq!(metadata.request_id.as_deref(), Some("abc-123"));
        assert_eq!(metadata.build_type, Some(BuildType::OpenSource));
        assert_eq!(metadata.version, Some(Version::new(1, 7, 4)));
    }

    #[test]
    fn test_decode_missing_and_invalid_headers() {
        let decoder = ResponseDecoder::new();
        let before = Utc::now();
        let metadata = decoder.decode_headers(&HeaderMap::new()).unwrap();
        assert!(metadata.timestamp >= before);
        assert!(metadata.build_type.is_none());
        assert!(metadata.version.is_none());

        let mut headers = HeaderMap::new();
        headers.insert(BUILD_TYPE_HEADER, HeaderValue::from_static("XYZ"));
        assert!(matches!(
            decoder.decode_headers(&headers),
            Err(CodecError::Domain(_))
        ));
    }
}
