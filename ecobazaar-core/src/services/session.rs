//! Session manager - owns the authenticated identity
//!
//! `restore` runs once at startup and settles the session into
//! `Authenticated` or `Anonymous`. Login and registration never fail with an
//! error value: they always answer with an [`ActionResult`] the UI can render.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Map, Value as JsonValue};
use tracing::{debug, info, warn};

use super::http::ApiClient;
use super::persisted::{token_fingerprint, PersistedSession};
use super::session_handle::SessionHandle;
use crate::domain::result::{payload_message, ActionResult, Error, Result};
use crate::domain::{Role, Session, SessionPhase, SessionState, User};
use crate::ports::{path_segment, ApiRequest};

/// Result of a successful registration
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum RegisterOutcome {
    /// The server signed the new user in right away
    SignedIn(User),
    /// No token yet (e.g. email verification pending); raw server answer
    Pending(JsonValue),
}

pub struct SessionManager {
    api: Arc<ApiClient>,
    persisted: PersistedSession,
    session: Arc<SessionHandle>,
}

impl SessionManager {
    pub fn new(api: Arc<ApiClient>, persisted: PersistedSession, session: Arc<SessionHandle>) -> Self {
        Self {
            api,
            persisted,
            session,
        }
    }

    pub fn handle(&self) -> &Arc<SessionHandle> {
        &self.session
    }

    /// Restore the session from persisted storage.
    ///
    /// Both entries present and a well-formed user → `Authenticated`.
    /// A user record that does not parse → both entries purged, `Anonymous`.
    /// Anything missing → `Anonymous`. Runs once; later calls only report
    /// the current phase.
    pub fn restore(&self) -> SessionPhase {
        if !self.session.begin_restore() {
            return self.session.phase();
        }

        let saved = match self.persisted.load() {
            Ok(saved) => saved,
            Err(e) => {
                warn!("Could not read persisted session: {}", e);
                None
            }
        };

        let Some((token, blob)) = saved else {
            debug!("No saved session found");
            self.session.finish_anonymous();
            return SessionPhase::Anonymous;
        };

        let parsed = serde_json::from_str::<JsonValue>(&blob)
            .map_err(Error::from)
            .and_then(User::from_json);
        match parsed {
            Ok(user) => {
                info!(
                    "Restored session for user {} (token {})",
                    user.id,
                    token_fingerprint(&token)
                );
                self.session.establish(Session::new(token, user));
                SessionPhase::Authenticated
            }
            Err(e) => {
                warn!("Discarding corrupted persisted session: {}", e);
                if let Err(e) = self.persisted.clear() {
                    warn!("Failed to purge persisted session: {}", e);
                }
                self.session.finish_anonymous();
                SessionPhase::Anonymous
            }
        }
    }

    /// Resolves once `restore` has settled
    pub async fn ready(&self) {
        self.session.ready().await;
    }

    pub fn state(&self) -> SessionState {
        self.session.snapshot()
    }

    pub fn user(&self) -> Option<User> {
        self.session.user()
    }

    /// `{token, user}` from an auth response, if both are usable
    fn session_from(body: &JsonValue) -> Option<Session> {
        let token = body.get("token")?.as_str().filter(|t| !t.is_empty())?;
        let user = User::from_json(body.get("user")?.clone()).ok()?;
        Some(Session::new(token, user))
    }

    /// Persist first, then publish. A storage failure leaves the state as it was.
    fn sign_in(&self, session: Session) -> Result<User> {
        self.persisted.save(&session.token, &session.user)?;
        info!(
            "Signed in as user {} (token {})",
            session.user.id,
            token_fingerprint(&session.token)
        );
        let user = session.user.clone();
        self.session.establish(session);
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> ActionResult<User> {
        let request =
            ApiRequest::post("/auth/login").json(json!({ "email": email, "password": password }));

        match self.api.send(request).await {
            Ok(body) => match Self::session_from(&body) {
                Some(session) => ActionResult::from_result(self.sign_in(session), "Login failed"),
                None => {
                    warn!("Login response missing token or user");
                    ActionResult::fail(
                        payload_message(&body)
                            .unwrap_or_else(|| "Login failed - no token received".to_string()),
                    )
                }
            },
            Err(e) => {
                warn!("Login failed: {}", e);
                ActionResult::fail(e.user_message("Login failed"))
            }
        }
    }

    /// Register a new account. Without a token in the answer the user stays
    /// anonymous and the raw payload is returned.
    pub async fn register(&self, profile: JsonValue) -> ActionResult<RegisterOutcome> {
        let request = ApiRequest::post("/auth/register").json(profile);

        match self.api.send(request).await {
            Ok(body) => match Self::session_from(&body) {
                Some(session) => ActionResult::from_result(
                    self.sign_in(session).map(RegisterOutcome::SignedIn),
                    "Registration failed",
                ),
                None => {
                    info!("Registration succeeded without sign-in");
                    ActionResult::ok(RegisterOutcome::Pending(body))
                }
            },
            Err(e) => {
                warn!("Registration failed: {}", e);
                ActionResult::fail(e.user_message("Registration failed"))
            }
        }
    }

    /// Drop the session everywhere. Safe to call when already signed out.
    pub fn logout(&self) {
        if let Err(e) = self.persisted.clear() {
            warn!("Failed to clear persisted session: {}", e);
        }
        if self.session.clear() {
            info!("Logged out");
        }
    }

    /// Shallow-merge `patch` into the current user, in memory and in storage
    /// together
    pub fn update_user(&self, patch: &Map<String, JsonValue>) -> Result<User> {
        self.session.update_user(|current| {
            let merged = current.merged(patch)?;
            self.persisted.save_user(&merged)?;
            Ok(merged)
        })
    }

    pub async fn forgot_password(&self, email: &str) -> ActionResult<JsonValue> {
        let request = ApiRequest::post("/auth/forgot-password").json(json!({ "email": email }));
        ActionResult::from_result(self.api.send(request).await, "Failed to send reset email")
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> ActionResult<JsonValue> {
        let request = ApiRequest::post("/auth/reset-password")
            .json(json!({ "token": token, "password": password }));
        ActionResult::from_result(self.api.send(request).await, "Failed to reset password")
    }

    /// Check a password-reset token before showing the reset form
    pub async fn validate_token(&self, token: &str) -> ActionResult<JsonValue> {
        let request = ApiRequest::get(format!("/auth/validate-token/{}", path_segment(token)));
        ActionResult::from_result(self.api.send(request).await, "Invalid or expired token")
    }

    /// Roles a new account may register with
    pub async fn allowed_roles(&self) -> ActionResult<Vec<Role>> {
        ActionResult::from_result(
            self.api.get_json("/auth/allowed-roles").await,
            "Failed to load roles",
        )
    }
}
