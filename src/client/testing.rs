//! In-memory transport for client tests

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use std::sync::Mutex;

use super::error::ClientResult;
use super::transport::{RawResponse, Transport};

/// A request as seen by the transport
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Ping,
    Query(String),
    Execute(String),
    Write {
        database: String,
        retention_policy: Option<String>,
        body: String,
    },
}

type Handler = Box<dyn Fn(&Request) -> RawResponse + Send + Sync>;

/// Records every request and answers through a handler
pub struct MockTransport {
    handler: Handler,
    requests: Mutex<Vec<Request>>,
}

impl MockTransport {
    pub fn new(handler: impl Fn(&Request) -> RawResponse + Send + Sync + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A server with databases `_internal` and `metrics`, where `metrics`
    /// holds the `autogen` and `weekly` retention policies and one `cpu` point
    pub fn standard() -> Self {
        Self::new(standard_server)
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    /// Statements sent through `execute`
    pub fn executed(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter_map(|r| match r {
                Request::Execute(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    /// Line protocol bodies sent through `write`
    pub fn writes(&self) -> Vec<Request> {
        self.requests()
            .into_iter()
            .filter(|r| matches!(r, Request::Write { .. }))
            .collect()
    }

    fn record(&self, request: Request) -> ClientResult<RawResponse> {
        let response = (self.handler)(&request);
        self.requests.lock().unwrap().push(request);
        Ok(response)
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn base_url(&self) -> &str {
        "mock://db"
    }

    async fn ping(&self) -> ClientResult<RawResponse> {
        self.record(Request::Ping)
    }

    async fn query(&self, query: &str) -> ClientResult<RawResponse> {
        self.record(Request::Query(query.to_string()))
    }

    async fn execute(&self, statement: &str) -> ClientResult<RawResponse> {
        self.record(Request::Execute(statement.to_string()))
    }

    async fn write(
        &self,
        database: &str,
        retention_policy: Option<&str>,
        line_protocol: &str,
    ) -> ClientResult<RawResponse> {
        self.record(Request::Write {
            database: database.to_string(),
            retention_policy: retention_policy.map(str::to_string),
            body: line_protocol.to_string(),
        })
    }
}

pub fn json_response(status: u16, body: &str) -> RawResponse {
    RawResponse::new(status, HeaderMap::new(), body)
}

const EMPTY_RESULT: &str = r#"{"results":[{"statement_id":0}]}"#;

const DATABASES: &str = r#"{"results":[{"statement_id":0,"series":[{"name":"databases","columns":["name"],"values":[["_internal"],["metrics"]]}]}]}"#;

const POLICIES: &str = r#"{"results":[{"statement_id":0,"series":[{"columns":["name","duration","shardGroupDuration","replicaN","default"],"values":[["autogen","0s","168h0m0s",1,true],["weekly","168h0m0s","24h0m0s",2,false]]}]}]}"#;

const CPU_POINTS: &str = r#"{"results":[{"statement_id":0,"series":[{"name":"cpu","columns":["time","host","usage"],"values":[["2024-03-01T12:00:00Z","web-1",0.75],["2024-03-01T12:01:00Z","web-2",0.5]]}]}]}"#;

fn standard_server(request: &Request) -> RawResponse {
    match request {
        Request::Ping => {
            let mut headers = HeaderMap::new();
            headers.insert("x-influxdb-build", HeaderValue::from_static("OSS"));
            headers.insert("x-influxdb-version", HeaderValue::from_static("1.7.4"));
            headers.insert("x-request-id", HeaderValue::from_static("req-1"));
            RawResponse::new(204, headers, "")
        }
        Request::Query(q) if q == "SHOW DATABASES" => json_response(200, DATABASES),
        Request::Query(q) if q == "SHOW RETENTION POLICIES ON \"metrics\"" => {
            json_response(200, POLICIES)
        }
        Request::Query(q) if q == "SELECT * FROM \"metrics\"..\"cpu\"" => {
            json_response(200, CPU_POINTS)
        }
        Request::Query(_) | Request::Execute(_) => json_response(200, EMPTY_RESULT),
        Request::Write { .. } => json_response(204, ""),
    }
}
