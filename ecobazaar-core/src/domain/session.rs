//! Session domain model

use serde::{Deserialize, Serialize};

use super::user::User;

/// Authenticated identity: opaque bearer token plus the user record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

impl Session {
    pub fn new(token: impl Into<String>, user: User) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }
}

/// Lifecycle of the client session
///
/// `Uninitialized → Restoring → {Authenticated, Anonymous}`, and
/// `Authenticated → Anonymous` on logout or forced teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Uninitialized,
    Restoring,
    Authenticated,
    Anonymous,
}

impl SessionPhase {
    /// Restoration has produced a definite answer
    pub fn is_settled(&self) -> bool {
        matches!(self, SessionPhase::Authenticated | SessionPhase::Anonymous)
    }
}

/// Read-only view handed to UI consumers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub user: Option<User>,
    pub loading: bool,
    pub is_authenticated: bool,
}
