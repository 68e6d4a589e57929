//! HTTP transport
//!
//! The [`Transport`] trait covers the four endpoints the client uses. Every
//! request carries `precision=ms` so timestamps travel as epoch milliseconds.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::error::{ClientError, ClientResult};
use crate::config::ClientConfig;

const PRECISION: (&str, &str) = ("precision", "ms");
const LINE_PROTOCOL_CONTENT_TYPE: &str = "application/octet-stream";

/// Status, headers and body of a completed request
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<String>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Raw access to the database's HTTP endpoints
#[async_trait]
pub trait Transport: Send + Sync {
    /// Base URL requests are sent to
    fn base_url(&self) -> &str;

    /// `GET /ping`
    async fn ping(&self) -> ClientResult<RawResponse>;

    /// `GET /query?q=` for read-only statements
    async fn query(&self, query: &str) -> ClientResult<RawResponse>;

    /// `POST /query?q=` for statements that change state
    async fn execute(&self, statement: &str) -> ClientResult<RawResponse>;

    /// `POST /write?db=[&rp=]` with a line protocol body
    async fn write(
        &self,
        database: &str,
        retention_policy: Option<&str>,
        line_protocol: &str,
    ) -> ClientResult<RawResponse>;
}

/// [`Transport`] backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        Self::new(&config.url, Duration::from_millis(config.timeout_ms))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> ClientResult<RawResponse> {
        let response = request
            .query(&[PRECISION])
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(|e| self.map_error(e))?;
        debug!(status = status, "Received response");

        Ok(RawResponse::new(status, headers, body))
    }

    fn map_error(&self, e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            ClientError::Timeout
        } else if e.is_connect() {
            ClientError::Unavailable(self.base_url.clone())
        } else {
            ClientError::Http(e)
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn ping(&self) -> ClientResult<RawResponse> {
        self.send(self.client.get(self.url("ping"))).await
    }

    async fn query(&self, query: &str) -> ClientResult<RawResponse> {
        self.send(self.client.get(self.url("query")).query(&[("q", query)]))
            .await
    }

    async fn execute(&self, statement: &str) -> ClientResult<RawResponse> {
        self.send(self.client.post(self.url("query")).query(&[("q", statement)]))
            .await
    }

    async fn write(
        &self,
        database: &str,
        retention_policy: Option<&str>,
        line_protocol: &str,
    ) -> ClientResult<RawResponse> {
        let mut request = self
            .client
            .post(self.url("write"))
            .query(&[("db", database)]);
        if let Some(rp) = retention_policy {
            request = request.query(&[("rp", rp)]);
        }
        let request = request
            .header(CONTENT_TYPE, LINE_PROTOCOL_CONTENT_TYPE)
            .body(line_protocol.to_string());
        self.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalised() {
        let transport = HttpTransport::new("http://localhost:8086/", Duration::from_secs(1)).unwrap();
        assert_eq!(transport.base_url(), "http://localhost:8086");
        assert_eq!(transport.url("ping"), "http://localhost:8086/ping");
    }

    #[test]
    fn test_raw_response_status() {
        assert!(RawResponse::new(204, HeaderMap::new(), "").is_success());
        assert!(!RawResponse::new(404, HeaderMap::new(), "").is_success());
    }
}
