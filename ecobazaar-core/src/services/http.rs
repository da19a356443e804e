//! HTTP access layer
//!
//! Single outbound gateway to the backend. Injects the bearer credential from
//! the persisted session, classifies failures, and reacts to authorization
//! failures:
//! - 401 on a first attempt tears the session down (persisted entries and
//!   in-memory session) and redirects to the login route, unless the user is
//!   on a public route already. When the persisted credential changed while
//!   the request was in flight, the request is retried once instead.
//! - 403 is only logged: the session is valid, it just lacks permission
//!
//! Everything else is returned to the caller tagged with status and payload.

use std::sync::Arc;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use super::persisted::{token_fingerprint, PersistedSession};
use super::session_handle::SessionHandle;
use crate::config::Config;
use crate::domain::result::{Error, Result};
use crate::ports::{ApiRequest, Navigator, Transport};

/// Routes that are valid for anonymous users
#[derive(Debug, Clone)]
pub struct PublicRoutes {
    pattern: Regex,
}

impl PublicRoutes {
    /// `/` matches exactly; every other route also matches its sub-paths
    pub fn new(routes: &[String]) -> Result<Self> {
        let alternatives: Vec<String> = routes
            .iter()
            .map(|r| r.trim().trim_end_matches('/'))
            .map(|r| {
                if r.is_empty() {
                    "/".to_string()
                } else {
                    format!("{}(?:/.*)?", regex::escape(r))
                }
            })
            .collect();
        let source = if alternatives.is_empty() {
            // Matches nothing
            "^$.".to_string()
        } else {
            format!("^(?:{})$", alternatives.join("|"))
        };
        let pattern = Regex::new(&source)
            .map_err(|e| Error::Config(format!("Invalid public route list: {}", e)))?;
        Ok(Self { pattern })
    }

    pub fn contains(&self, route: &str) -> bool {
        let path = route.split(['?', '#']).next().unwrap_or("");
        let path = if path.is_empty() { "/" } else { path };
        self.pattern.is_match(path)
    }
}

pub struct ApiClient {
    transport: Arc<dyn Transport>,
    persisted: PersistedSession,
    session: Arc<SessionHandle>,
    navigator: Arc<dyn Navigator>,
    login_route: String,
    public_routes: PublicRoutes,
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        persisted: PersistedSession,
        session: Arc<SessionHandle>,
        navigator: Arc<dyn Navigator>,
        config: &Config,
    ) -> Result<Self> {
        Ok(Self {
            transport,
            persisted,
            session,
            navigator,
            login_route: config.login_route.clone(),
            public_routes: PublicRoutes::new(&config.public_routes)?,
        })
    }

    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    fn bearer(&self) -> Option<String> {
        match self.persisted.token() {
            Ok(token) => token,
            Err(e) => {
                warn!("Could not read persisted session, sending unauthenticated: {}", e);
                None
            }
        }
    }

    /// Execute a request. A 2xx answer yields its body (`Null` when empty).
    ///
    /// A 401 answered to a credential that is no longer the persisted one
    /// (another login happened while the request was in flight) is retried
    /// once with the current credential instead of tearing the new session
    /// down.
    pub async fn send(&self, mut request: ApiRequest) -> Result<JsonValue> {
        loop {
            request.bearer = self.bearer();
            debug!(
                "{} {} (authenticated: {}, retry: {})",
                request.method,
                request.target(),
                request.bearer.is_some(),
                request.retry
            );

            let response = self
                .transport
                .execute(&request)
                .await
                .map_err(|e| Error::Transport(e.0))?;

            if response.is_success() {
                return Ok(response.body.unwrap_or(JsonValue::Null));
            }

            match response.status {
                401 if !request.retry => {
                    let current = self.bearer();
                    if current.is_some() && current != request.bearer {
                        info!(
                            "401 for {} was sent with a superseded credential, retrying",
                            request.path
                        );
                        request = request.retried();
                        continue;
                    }
                    self.teardown(&request);
                }
                401 => debug!("401 on retried request {}, session already handled", request.path),
                403 => warn!("Access forbidden (403) for: {}", request.target()),
                status => debug!("{} {} failed with {}", request.method, request.path, status),
            }
            return Err(Error::from_status(response.status, response.body));
        }
    }

    /// Execute a request and deserialize its body
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let body = self.send(request).await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: impl Into<String>) -> Result<T> {
        self.send_json(ApiRequest::get(path)).await
    }

    /// Forced teardown after an authorization failure
    fn teardown(&self, request: &ApiRequest) {
        warn!(
            "Authentication failed (401) for {}, logging out (token {})",
            request.path,
            request
                .bearer
                .as_deref()
                .map(token_fingerprint)
                .unwrap_or_else(|| "none".to_string())
        );
        if let Err(e) = self.persisted.clear() {
            warn!("Failed to clear persisted session: {}", e);
        }
        self.session.clear();

        let current = self.navigator.current_route();
        if self.public_routes.contains(&current) {
            debug!("Staying on public route {}", current);
        } else {
            info!("Redirecting from {} to {}", current, self.login_route);
            self.navigator.navigate(&self.login_route);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{Gate, MemoryNavigator, MemorySessionStore, ScriptedTransport};
    use crate::domain::{Role, Session, User};
    use crate::ports::{ApiResponse, HttpMethod, SessionStore};
    use crate::services::persisted::{TOKEN_KEY, USER_KEY};
    use serde_json::json;

    struct Fixture {
        transport: Arc<ScriptedTransport>,
        store: Arc<MemorySessionStore>,
        session: Arc<SessionHandle>,
        navigator: Arc<MemoryNavigator>,
        api: ApiClient,
    }

    fn fixture(route: &str) -> Fixture {
        let transport = Arc::new(ScriptedTransport::new());
        let store = Arc::new(MemorySessionStore::with_entries(&[
            (TOKEN_KEY, "t1"),
            (USER_KEY, r#"{"id":1,"role":"USER"}"#),
        ]));
        let session = Arc::new(SessionHandle::new());
        session.establish(Session::new("t1", User::new(1, Role::User)));
        let navigator = Arc::new(MemoryNavigator::new(route));
        let api = ApiClient::new(
            transport.clone(),
            PersistedSession::new(store.clone()),
            session.clone(),
            navigator.clone(),
            &Config::default(),
        )
        .unwrap();
        Fixture {
            transport,
            store,
            session,
            navigator,
            api,
        }
    }

    #[test]
    fn test_public_routes() {
        let routes = PublicRoutes::new(&Config::default().public_routes).unwrap();
        assert!(routes.contains("/"));
        assert!(routes.contains(""));
        assert!(routes.contains("/login"));
        assert!(routes.contains("/login?next=/cart"));
        assert!(routes.contains("/register/seller"));
        assert!(!routes.contains("/cart"));
        assert!(!routes.contains("/products/7"));
        assert!(!routes.contains("/loginx"));
    }

    #[test]
    fn test_empty_public_route_list_matches_nothing() {
        let routes = PublicRoutes::new(&[]).unwrap();
        assert!(!routes.contains("/"));
    }

    #[tokio::test]
    async fn test_bearer_from_persisted_pair() {
        let f = fixture("/cart");
        f.transport
            .on(HttpMethod::Get, "/cart/1", ApiResponse::ok(json!({"items": []})));
        f.api.send(ApiRequest::get("/cart/1")).await.unwrap();
        assert_eq!(f.transport.calls()[0].bearer.as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn test_no_token_goes_out_unauthenticated() {
        let f = fixture("/");
        f.store.remove_many(&[USER_KEY]).unwrap();
        f.transport
            .on(HttpMethod::Get, "/products", ApiResponse::ok(json!([])));
        f.api.send(ApiRequest::get("/products")).await.unwrap();
        assert_eq!(f.transport.calls()[0].bearer, None);
    }

    #[tokio::test]
    async fn test_empty_success_body_is_null() {
        let f = fixture("/cart");
        f.transport
            .on(HttpMethod::Delete, "/cart/1/items/3", ApiResponse::no_content());
        let body = f.api.send(ApiRequest::delete("/cart/1/items/3")).await.unwrap();
        assert!(body.is_null());
    }

    #[tokio::test]
    async fn test_401_tears_down_and_redirects() {
        let f = fixture("/cart");
        f.transport
            .on(HttpMethod::Get, "/cart/1", ApiResponse::new(401, None));

        let err = f.api.send(ApiRequest::get("/cart/1")).await.unwrap_err();
        assert!(matches!(err, Error::AuthExpired { .. }));
        assert!(f.store.is_empty());
        assert_eq!(f.store.removal_count(), 1);
        assert!(f.session.user().is_none());
        assert_eq!(f.navigator.redirects(), vec!["/login".to_string()]);
    }

    #[tokio::test]
    async fn test_401_on_public_route_does_not_redirect() {
        for route in ["/", "/login", "/register"] {
            let f = fixture(route);
            f.transport
                .on(HttpMethod::Get, "/cart/1", ApiResponse::new(401, None));
            let _ = f.api.send(ApiRequest::get("/cart/1")).await;
            assert!(f.navigator.redirects().is_empty(), "redirected from {}", route);
            assert!(f.store.is_empty());
        }
    }

    #[tokio::test]
    async fn test_401_on_retry_does_not_clear_again() {
        let f = fixture("/cart");
        f.transport
            .on(HttpMethod::Get, "/cart/1", ApiResponse::new(401, None));

        let _ = f.api.send(ApiRequest::get("/cart/1")).await;
        let err = f
            .api
            .send(ApiRequest::get("/cart/1").retried())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AuthExpired { .. }));
        assert_eq!(f.store.removal_count(), 1);
        assert_eq!(f.navigator.redirects().len(), 1);
    }

    #[tokio::test]
    async fn test_late_401_for_replaced_token_keeps_new_session() {
        let f = fixture("/cart");
        let gate = Gate::new();
        f.transport
            .hold(HttpMethod::Get, "/cart/1", gate.clone(), ApiResponse::new(401, None))
            .on(HttpMethod::Get, "/cart/1", ApiResponse::ok(json!({"items": []})));

        let request = f.api.send(ApiRequest::get("/cart/1"));
        let relogin = async {
            gate.entered().await;
            PersistedSession::new(f.store.clone())
                .save("t2", &User::new(1, Role::User))
                .unwrap();
            f.session.establish(Session::new("t2", User::new(1, Role::User)));
            gate.release();
        };
        let (result, ()) = tokio::join!(request, relogin);

        assert_eq!(result.unwrap(), json!({"items": []}));
        let calls = f.transport.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].bearer.as_deref(), Some("t1"));
        assert_eq!(calls[1].bearer.as_deref(), Some("t2"));
        assert!(calls[1].retry);
        assert_eq!(f.store.removal_count(), 0);
        assert!(f.session.user().is_some());
        assert!(f.navigator.redirects().is_empty());
    }

    #[tokio::test]
    async fn test_retry_with_current_token_that_fails_is_not_repeated() {
        let f = fixture("/cart");
        let gate = Gate::new();
        f.transport
            .hold(HttpMethod::Get, "/cart/1", gate.clone(), ApiResponse::new(401, None))
            .on(HttpMethod::Get, "/cart/1", ApiResponse::new(401, None));

        let request = f.api.send(ApiRequest::get("/cart/1"));
        let relogin = async {
            gate.entered().await;
            PersistedSession::new(f.store.clone())
                .save("t2", &User::new(1, Role::User))
                .unwrap();
            gate.release();
        };
        let (result, ()) = tokio::join!(request, relogin);

        assert!(matches!(result.unwrap_err(), Error::AuthExpired { .. }));
        assert_eq!(f.transport.calls().len(), 2);
        assert_eq!(f.store.removal_count(), 0);
    }

    #[tokio::test]
    async fn test_403_keeps_session() {
        let f = fixture("/admin");
        f.transport.on(
            HttpMethod::Get,
            "/dashboard/admin",
            ApiResponse::new(403, Some(json!({"error": "Admins only"}))),
        );

        let err = f.api.send(ApiRequest::get("/dashboard/admin")).await.unwrap_err();
        assert!(matches!(err, Error::Forbidden { .. }));
        assert_eq!(err.server_message().as_deref(), Some("Admins only"));
        assert!(!f.store.is_empty());
        assert_eq!(f.store.removal_count(), 0);
        assert!(f.session.user().is_some());
        assert!(f.navigator.redirects().is_empty());
    }

    #[tokio::test]
    async fn test_other_failures_propagate_tagged() {
        let f = fixture("/cart");
        f.transport.on(
            HttpMethod::Post,
            "/cart/1/items",
            ApiResponse::new(400, Some(json!({"error": "Out of stock"}))),
        );
        f.transport
            .fail_with(HttpMethod::Get, "/cart/1", "connection reset");

        let err = f
            .api
            .send(ApiRequest::post("/cart/1/items"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.server_message().as_deref(), Some("Out of stock"));

        let err = f.api.send(ApiRequest::get("/cart/1")).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert!(f.session.user().is_some());
    }
}
