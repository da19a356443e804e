//! Endpoint probing trace
//!
//! Transient, never persisted. Only used to find out which of several
//! candidate server contracts is actually live.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// State of one candidate request shape during a probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum ProbeState {
    NotTried,
    Trying,
    Succeeded,
    Failed {
        status: Option<u16>,
        reason: String,
    },
}

/// One line of the trace
#[derive(Debug, Clone, Serialize)]
pub struct ProbeRecord {
    pub label: &'static str,
    pub method: &'static str,
    pub target: String,
    pub state: ProbeState,
    pub at: DateTime<Utc>,
}

impl ProbeRecord {
    pub fn new(label: &'static str, method: &'static str, target: impl Into<String>) -> Self {
        Self {
            label,
            method,
            target: target.into(),
            state: ProbeState::NotTried,
            at: Utc::now(),
        }
    }

    pub(crate) fn transition(&mut self, state: ProbeState) {
        self.state = state;
        self.at = Utc::now();
    }

    pub fn succeeded(&self) -> bool {
        self.state == ProbeState::Succeeded
    }
}
