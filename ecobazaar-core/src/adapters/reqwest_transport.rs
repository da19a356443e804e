//! reqwest-backed transport
//!
//! Talks JSON to the EcoBazaar REST API. All status handling is left to the
//! access layer; this adapter only turns `reqwest` failures into
//! user-friendly transport failures.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use tracing::debug;

use crate::domain::result::{Error, Result};
use crate::ports::{ApiRequest, ApiResponse, HttpMethod, Transport, TransportFailure};

/// Default API base URL (local backend)
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Default overall request timeout
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// HTTP transport to the storefront backend
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Create a transport for `base_url` with the given overall timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(Error::Config("API base URL cannot be empty".to_string()));
        }
        url::Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid API base URL '{}': {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> TransportFailure {
        if error.is_timeout() {
            TransportFailure(format!(
                "Connection timed out after {} ms",
                self.timeout.as_millis()
            ))
        } else if error.is_connect() {
            TransportFailure(format!("Unable to connect to {}", self.base_url))
        } else {
            TransportFailure(format!("Request failed: {}", error))
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    fn name(&self) -> &str {
        "reqwest"
    }

    async fn execute(
        &self,
        request: &ApiRequest,
    ) -> std::result::Result<ApiResponse, TransportFailure> {
        let url = self.url(&request.path);
        debug!("Request: {} {}", request.method, request.target());

        let mut builder = self
            .client
            .request(Self::method(request.method), &url)
            .header("Accept", "application/json");
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| self.map_request_error(e))?;

        debug!("Response: {} {} -> {}", request.method, request.path, status);
        Ok(ApiResponse::new(status, ApiResponse::parse_body(&text)))
    }
}
