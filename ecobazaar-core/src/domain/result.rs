//! Result and error types for the core library

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Core library error type
///
/// The HTTP-facing variants mirror how the storefront reacts to a failure:
/// `AuthExpired` tears the session down, `Forbidden` is reported to the caller
/// only, `Validation` messages are shown verbatim, `Server` errors get a
/// generic fallback.
#[derive(Error, Debug)]
pub enum Error {
    /// No response reached the client (DNS, connect, timeout, TLS...)
    #[error("Network error: {0}")]
    Transport(String),

    /// HTTP 401, the session is no longer valid
    #[error("Session expired (HTTP 401)")]
    AuthExpired { payload: Option<JsonValue> },

    /// HTTP 403, valid session without permission for this resource
    #[error("Access forbidden (HTTP 403)")]
    Forbidden { payload: Option<JsonValue> },

    /// Any other 4xx response
    #[error("Request rejected (HTTP {status}){}", message_suffix(.payload))]
    Validation {
        status: u16,
        payload: Option<JsonValue>,
    },

    /// 5xx response
    #[error("Server error (HTTP {status})")]
    Server {
        status: u16,
        payload: Option<JsonValue>,
    },

    /// Every candidate endpoint shape failed
    #[error("No known endpoint contract succeeded for {operation} ({attempts} shapes tried)")]
    ContractMismatch {
        operation: String,
        attempts: usize,
        trace: Vec<crate::domain::ProbeRecord>,
    },

    #[error("{0}")]
    NotAuthenticated(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn message_suffix(payload: &Option<JsonValue>) -> String {
    match payload.as_ref().and_then(payload_message) {
        Some(msg) => format!(": {}", msg),
        None => String::new(),
    }
}

/// Extract the human-readable message from an error payload.
///
/// The backend is not consistent: some endpoints answer `{"error": ".."}`,
/// others `{"message": ".."}`, a few a bare JSON string.
pub fn payload_message(payload: &JsonValue) -> Option<String> {
    match payload {
        JsonValue::String(s) if !s.trim().is_empty() => Some(s.clone()),
        JsonValue::Object(map) => ["error", "message"]
            .iter()
            .filter_map(|key| map.get(*key))
            .filter_map(|v| v.as_str())
            .find(|s| !s.trim().is_empty())
            .map(|s| s.to_string()),
        _ => None,
    }
}

impl Error {
    /// Classify a non-success HTTP status with its parsed payload
    pub fn from_status(status: u16, payload: Option<JsonValue>) -> Self {
        match status {
            401 => Self::AuthExpired { payload },
            403 => Self::Forbidden { payload },
            500..=599 => Self::Server { status, payload },
            _ => Self::Validation { status, payload },
        }
    }

    /// Create a not-authenticated error
    pub fn not_authenticated(msg: impl Into<String>) -> Self {
        Self::NotAuthenticated(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// HTTP status, when a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthExpired { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::Validation { status, .. } | Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Parsed response payload, when a response was received
    pub fn payload(&self) -> Option<&JsonValue> {
        match self {
            Self::AuthExpired { payload }
            | Self::Forbidden { payload }
            | Self::Validation { payload, .. }
            | Self::Server { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }

    /// True for 401 and 403, which load paths treat as "nothing to show"
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthExpired { .. } | Self::Forbidden { .. })
    }

    /// Message provided by the server, if any
    pub fn server_message(&self) -> Option<String> {
        self.payload().and_then(payload_message)
    }

    /// Message to show a user: the server message, or `fallback`.
    ///
    /// 5xx payloads are never surfaced; local errors that already carry a
    /// user-facing sentence are returned as-is.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Server { .. } | Self::Transport(_) => fallback.to_string(),
            Self::NotAuthenticated(msg) => msg.clone(),
            _ => self.server_message().unwrap_or_else(|| fallback.to_string()),
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Uniform outcome of a UI action: `{success, data?, error?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult<T = ()> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ActionResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Convert a core result, rendering failures with `fallback` when the
    /// server did not say anything useful
    pub fn from_result(result: Result<T>, fallback: &str) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::fail(e.user_message(fallback)),
        }
    }
}

impl ActionResult<()> {
    /// Successful result without data
    pub fn done() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }
}

impl<T> From<Result<T>> for ActionResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::fail(e.to_string()),
        }
    }
}
