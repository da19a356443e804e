//! Scripted transport
//!
//! Answers requests from a table of canned replies keyed by method and target
//! (`path?query`). Every request is recorded, so tests can assert exactly
//! which calls went out, in which order and with which credential. A reply
//! can be held behind a [`Gate`] to interleave concurrent operations
//! deterministically.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Notify;

use crate::ports::{ApiRequest, ApiResponse, HttpMethod, Transport, TransportFailure};

/// Pauses a scripted reply until the test releases it
#[derive(Debug, Default)]
pub struct Gate {
    entered: Notify,
    release: Notify,
}

impl Gate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Wait until a request has reached this gate
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Let the held request complete
    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Respond(ApiResponse),
    Fail(String),
    Hold(Arc<Gate>, ApiResponse),
}

type RouteKey = (HttpMethod, String);

/// In-memory transport with canned replies
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<RouteKey, VecDeque<Reply>>>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, method: HttpMethod, target: &str, reply: Reply) {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry((method, target.to_string()))
            .or_default()
            .push_back(reply);
    }

    /// Queue a response. Replies are consumed in order; the last one repeats.
    pub fn on(&self, method: HttpMethod, target: &str, response: ApiResponse) -> &Self {
        self.push(method, target, Reply::Respond(response));
        self
    }

    /// Queue a transport failure (no response)
    pub fn fail_with(&self, method: HttpMethod, target: &str, message: &str) -> &Self {
        self.push(method, target, Reply::Fail(message.to_string()));
        self
    }

    /// Queue a response that is only delivered once `gate` is released
    pub fn hold(
        &self,
        method: HttpMethod,
        target: &str,
        gate: Arc<Gate>,
        response: ApiResponse,
    ) -> &Self {
        self.push(method, target, Reply::Hold(gate, response));
        self
    }

    /// Every request executed so far
    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// `METHOD target` of every request executed so far
    pub fn call_log(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|c| format!("{} {}", c.method, c.target()))
            .collect()
    }

    /// Number of requests to `method target`
    pub fn call_count(&self, method: HttpMethod, target: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.method == method && c.target() == target)
            .count()
    }

    fn next_reply(&self, key: &RouteKey) -> Option<Reply> {
        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        let queue = routes.get_mut(key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportFailure> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let key = (request.method, request.target());
        match self.next_reply(&key) {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Fail(message)) => Err(TransportFailure(message)),
            Some(Reply::Hold(gate, response)) => {
                gate.entered.notify_one();
                gate.release.notified().await;
                Ok(response)
            }
            None => Ok(ApiResponse::new(404, Some(json!({"error": "No route"})))),
        }
    }
}
