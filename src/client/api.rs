//! Statement-level API
//!
//! Wraps a [`Transport`] with statement guards and response interpretation.
//! Non-success statuses become [`ClientError::Api`]; statement errors inside
//! a successful response become [`ClientError::QueryRejected`].

use tracing::debug;

use super::error::{ClientError, ClientResult};
use super::transport::{RawResponse, Transport};
use crate::codec::ResponseDecoder;
use crate::domain::{QueryResult, ResponseMetadata, Series};

const MULTI_SERIES_PATTERN: &str = r"^SELECT .* FROM .+,.+$";
const SELECT_INTO_PATTERN: &str = r"^SELECT .* INTO .* FROM .*$";

/// Decoded results of one call plus the server metadata
#[derive(Debug, Clone)]
pub struct ApiResponse {
    results: Vec<QueryResult>,
    metadata: ResponseMetadata,
}

impl ApiResponse {
    pub fn new(results: Vec<QueryResult>, metadata: ResponseMetadata) -> Self {
        Self { results, metadata }
    }

    pub fn results(&self) -> &[QueryResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<QueryResult> {
        self.results
    }

    pub fn metadata(&self) -> &ResponseMetadata {
        &self.metadata
    }

    /// First statement error carried by the response
    pub fn error_message(&self) -> Option<&str> {
        self.results.iter().find_map(QueryResult::error)
    }

    pub fn has_error(&self) -> bool {
        self.error_message().is_some()
    }
}

/// Client for individual statements and writes
pub struct ApiClient<T: Transport> {
    transport: T,
    decoder: ResponseDecoder,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            decoder: ResponseDecoder::new(),
        }
    }

    pub fn host_url(&self) -> &str {
        self.transport.base_url()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Check the server is reachable and read its metadata
    pub async fn ping(&self) -> ClientResult<ResponseMetadata> {
        let raw = self.transport.ping().await?;
        Ok(self.interpret(raw)?.metadata)
    }

    /// Run a single-measurement query and return its first series
    pub async fn query(&self, query: &str) -> ClientResult<Option<Series>> {
        if matches_statement(MULTI_SERIES_PATTERN, query)? {
            return Err(ClientError::IllegalStatement(
                "Query cannot span multiple measurements".to_string(),
            ));
        }

        Ok(self
            .query_multiple_series(query)
            .await?
            .and_then(|result| result.into_series().into_iter().next()))
    }

    /// Run a single statement and return its result
    pub async fn query_multiple_series(&self, query: &str) -> ClientResult<Option<QueryResult>> {
        if query.contains(';') {
            return Err(ClientError::IllegalStatement(
                "Query cannot contain multiple statements".to_string(),
            ));
        }

        Ok(self.batch_query(query).await?.into_results().into_iter().next())
    }

    /// Run one or more read-only statements
    pub async fn batch_query(&self, query: &str) -> ClientResult<ApiResponse> {
        if matches_statement(SELECT_INTO_PATTERN, query)? {
            return Err(ClientError::IllegalStatement(
                "Cannot execute 'SELECT INTO' as query".to_string(),
            ));
        }

        debug!(statement = query, "Executing query");
        let raw = self.transport.query(query).await?;
        self.interpret(raw)
    }

    /// Run a statement that changes server state
    pub async fn execute(&self, statement: &str) -> ClientResult<ApiResponse> {
        debug!(statement = statement, "Executing statement");
        let raw = self.transport.execute(statement).await?;
        self.interpret(raw)
    }

    /// Write line protocol to a database, optionally into a retention policy
    pub async fn write(
        &self,
        database: &str,
        retention_policy: Option<&str>,
        line_protocol: &str,
    ) -> ClientResult<ApiResponse> {
        debug!(
            database = database,
            retention_policy = retention_policy,
            "Writing line protocol: {}",
            line_protocol
        );
        let raw = self
            .transport
            .write(database, retention_policy, line_protocol)
            .await?;
        self.interpret(raw)
    }

    fn interpret(&self, raw: RawResponse) -> ClientResult<ApiResponse> {
        if !raw.is_success() {
            let message = self
                .decoder
                .decode_error(&raw.body)
                .unwrap_or_else(|_| raw.body.trim_end().to_string());
            return Err(ClientError::Api {
                status: raw.status,
                message,
            });
        }

        let metadata = self.decoder.decode_headers(&raw.headers)?;
        let results = if raw.body.trim().is_empty() {
            Vec::new()
        } else {
            self.decoder.decode(&raw.body)?
        };

        let response = ApiResponse::new(results, metadata);
        match response.error_message() {
            Some(message) => Err(ClientError::QueryRejected(message.to_string())),
            None => Ok(response),
        }
    }
}

fn matches_statement(pattern: &str, statement: &str) -> ClientResult<bool> {
    let re = regex::Regex::new(pattern).map_err(|e| ClientError::InvalidArgument(e.to_string()))?;
    Ok(re.is_match(statement))
}

/// Quote an identifier for use in a statement
pub(crate) fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\\\""))
}
