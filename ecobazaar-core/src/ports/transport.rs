//! Transport port - the wire underneath the HTTP access layer
//!
//! A transport only moves bytes: it reports a response of any status, or a
//! failure when no response arrived at all. Status classification, bearer
//! injection and session teardown live in `services::ApiClient`.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

/// HTTP verb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outbound call, relative to the API base URL
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<JsonValue>,
    /// Bearer credential, filled in by the access layer
    pub bearer: Option<String>,
    /// Set when this is a repeat of a call that already failed once
    pub retry: bool,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
            retry: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn json(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn query_pairs(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// Mark the request as a retry of an earlier failed attempt
    pub fn retried(mut self) -> Self {
        self.retry = true;
        self
    }

    /// Path plus encoded query string, e.g. `/wishlist/remove?userId=1&productId=5`
    pub fn target(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        format!("{}?{}", self.path, query)
    }
}

/// Percent-encode one path segment (`/`, spaces and other reserved bytes
/// escaped) so a text id can never change the route it is placed in
pub fn path_segment(raw: impl fmt::Display) -> String {
    let raw = raw.to_string();
    // form encoding writes a space as '+'; a literal '+' comes out as %2B
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Response of any status
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed JSON body; `None` for an empty body. Non-JSON text is carried
    /// as a JSON string.
    pub body: Option<JsonValue>,
}

impl ApiResponse {
    pub fn new(status: u16, body: Option<JsonValue>) -> Self {
        Self { status, body }
    }

    pub fn ok(body: JsonValue) -> Self {
        Self::new(200, Some(body))
    }

    pub fn no_content() -> Self {
        Self::new(204, None)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse a raw body the way the access layer expects it
    pub fn parse_body(text: &str) -> Option<JsonValue> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(
            serde_json::from_str(trimmed)
                .unwrap_or_else(|_| JsonValue::String(trimmed.to_string())),
        )
    }
}

/// No response reached the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure(pub String);

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wire transport
///
/// Implementations: `ReqwestTransport` (real network), `ScriptedTransport`
/// (canned responses for tests and offline runs).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transport name (e.g., "reqwest", "scripted")
    fn name(&self) -> &str;

    /// Execute one request. Any HTTP status is a successful execution.
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportFailure>;
}
