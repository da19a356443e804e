//! End-to-end tests for the storefront session and resource caches
//!
//! Every test drives a full `StorefrontContext`: scripted transport, in-memory
//! session store, in-memory navigator. Nothing touches the network or disk.
//!
//! Run with: cargo test --test storefront_flow_test -- --nocapture

use std::sync::Arc;

use serde_json::{json, Value as JsonValue};

use ecobazaar_core::adapters::{Gate, MemoryNavigator, MemorySessionStore, ScriptedTransport};
use ecobazaar_core::config::Config;
use ecobazaar_core::domain::NewOrder;
use ecobazaar_core::ports::{ApiResponse, HttpMethod, SessionStore};
use ecobazaar_core::services::persisted::{TOKEN_KEY, USER_KEY};
use ecobazaar_core::services::{LoadOutcome, WishlistChange};
use ecobazaar_core::{Error, ResourceId, SessionPhase, StorefrontContext};

// ============================================================================
// Test Helpers
// ============================================================================

struct Harness {
    ctx: StorefrontContext,
    transport: Arc<ScriptedTransport>,
    store: Arc<MemorySessionStore>,
    navigator: Arc<MemoryNavigator>,
}

fn user_blob(id: i64) -> String {
    json!({"id": id, "email": "ada@example.com", "firstName": "Ada", "role": "USER"}).to_string()
}

fn harness_with(store: MemorySessionStore, route: &str) -> Harness {
    let transport = Arc::new(ScriptedTransport::new());
    let store = Arc::new(store);
    let navigator = Arc::new(MemoryNavigator::new(route));
    let ctx = StorefrontContext::with_parts(
        Config::default(),
        store.clone(),
        transport.clone(),
        navigator.clone(),
    )
    .expect("Failed to build context");
    Harness {
        ctx,
        transport,
        store,
        navigator,
    }
}

/// Context whose store already holds a session for user 1
fn signed_in_harness(route: &str) -> Harness {
    let blob = user_blob(1);
    harness_with(
        MemorySessionStore::with_entries(&[(TOKEN_KEY, "tok-1"), (USER_KEY, &blob)]),
        route,
    )
}

fn anonymous_harness() -> Harness {
    harness_with(MemorySessionStore::new(), "/")
}

fn cart_body(items: &[(i64, i64, u32)]) -> JsonValue {
    let items: Vec<JsonValue> = items
        .iter()
        .map(|(id, product_id, quantity)| {
            json!({"id": id, "productId": product_id, "quantity": quantity})
        })
        .collect();
    json!({"id": 1, "items": items})
}

fn empty_caches(h: &Harness) {
    h.transport
        .on(HttpMethod::Get, "/cart/1", ApiResponse::ok(cart_body(&[])))
        .on(HttpMethod::Get, "/wishlist/1", ApiResponse::ok(json!([])));
}

// ============================================================================
// Restoration
// ============================================================================

#[tokio::test]
async fn test_restore_valid_session_loads_caches() {
    let h = signed_in_harness("/");
    h.transport
        .on(HttpMethod::Get, "/cart/1", ApiResponse::ok(cart_body(&[(11, 7, 2)])))
        .on(
            HttpMethod::Get,
            "/wishlist/1",
            ApiResponse::ok(json!([{"id": 9, "product": {"id": 5, "name": "Bamboo Brush"}}])),
        );

    assert_eq!(h.ctx.restore().await, SessionPhase::Authenticated);

    let state = h.ctx.session.state();
    assert!(state.is_authenticated);
    assert!(!state.loading);
    assert_eq!(state.user.unwrap().id, ResourceId::from(1));
    assert_eq!(h.ctx.cart.cart().unwrap().item_count(), 2);
    assert!(h.ctx.wishlist.contains(&ResourceId::from(5)));

    // Both loads carried the persisted token
    for call in h.transport.calls() {
        assert_eq!(call.bearer.as_deref(), Some("tok-1"));
    }
}

#[tokio::test]
async fn test_restore_corrupt_user_purges_both_entries() {
    let h = harness_with(
        MemorySessionStore::with_entries(&[(TOKEN_KEY, "tok-1"), (USER_KEY, "{not json")]),
        "/",
    );

    assert_eq!(h.ctx.restore().await, SessionPhase::Anonymous);
    assert!(h.store.is_empty());
    assert!(h.ctx.session.user().is_none());
    assert!(h.transport.calls().is_empty());
}

#[tokio::test]
async fn test_restore_with_token_only_is_anonymous() {
    let h = harness_with(MemorySessionStore::with_entries(&[(TOKEN_KEY, "tok-1")]), "/");

    assert_eq!(h.ctx.restore().await, SessionPhase::Anonymous);
    // A half pair is not a session, and outbound calls go without a bearer
    let catalog = json!([{"id": 3, "name": "Jute Bag"}]);
    h.transport.on(HttpMethod::Get, "/products/featured", ApiResponse::ok(catalog));
    let featured = h.ctx.catalog.featured().await.unwrap();
    assert_eq!(featured.len(), 1);
    assert_eq!(h.transport.calls()[0].bearer, None);
}

#[tokio::test]
async fn test_operations_wait_for_restore() {
    let h = signed_in_harness("/cart");
    empty_caches(&h);
    h.transport
        .on(HttpMethod::Post, "/cart/1/items", ApiResponse::ok(json!({"message": "ok"})));

    // The add starts first but cannot proceed until restoration settles
    let (added, phase) = tokio::join!(h.ctx.cart.add_to_cart(7, 1), h.ctx.restore());

    assert_eq!(phase, SessionPhase::Authenticated);
    assert!(added.success, "{:?}", added.error);
    assert_eq!(h.transport.call_count(HttpMethod::Post, "/cart/1/items"), 1);
}

// ============================================================================
// Login / Logout
// ============================================================================

#[tokio::test]
async fn test_login_persists_session_and_loads_caches() {
    let h = anonymous_harness();
    h.ctx.restore().await;
    h.transport.on(
        HttpMethod::Post,
        "/auth/login",
        ApiResponse::ok(json!({
            "token": "tok-new",
            "user": {"id": 1, "email": "ada@example.com", "role": "USER"}
        })),
    );
    empty_caches(&h);

    let result = h.ctx.login("ada@example.com", "secret").await;

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.data.unwrap().email(), Some("ada@example.com"));
    assert_eq!(h.store.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-new"));
    assert!(h.store.get(USER_KEY).unwrap().is_some());
    assert!(h.ctx.session.state().is_authenticated);

    let calls = h.transport.calls();
    assert_eq!(calls[0].bearer, None);
    assert_eq!(
        calls[0].body,
        Some(json!({"email": "ada@example.com", "password": "secret"}))
    );
    assert!(calls[1..]
        .iter()
        .all(|c| c.bearer.as_deref() == Some("tok-new")));
    assert_eq!(h.transport.call_count(HttpMethod::Get, "/cart/1"), 1);
    assert_eq!(h.transport.call_count(HttpMethod::Get, "/wishlist/1"), 1);
}

#[tokio::test]
async fn test_login_scenario_persists_exact_user() {
    let h = anonymous_harness();
    h.ctx.restore().await;
    h.transport.on(
        HttpMethod::Post,
        "/auth/login",
        ApiResponse::ok(json!({"token": "t1", "user": {"id": 1, "role": "USER"}})),
    );
    empty_caches(&h);

    let result = h.ctx.login("a@x.com", "p1").await;

    assert!(result.success);
    assert_eq!(h.ctx.session.user().unwrap().id, ResourceId::from(1));
    assert_eq!(h.store.get(TOKEN_KEY).unwrap().as_deref(), Some("t1"));
    let persisted: JsonValue =
        serde_json::from_str(&h.store.get(USER_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(persisted, json!({"id": 1, "role": "USER"}));
}

#[tokio::test]
async fn test_login_rejected_shows_server_message() {
    let h = anonymous_harness();
    h.ctx.restore().await;
    h.transport.on(
        HttpMethod::Post,
        "/auth/login",
        ApiResponse::new(400, Some(json!({"error": "Invalid email or password"}))),
    );

    let result = h.ctx.login("ada@example.com", "nope").await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Invalid email or password"));
    assert!(h.store.is_empty());
    assert_eq!(h.transport.calls().len(), 1);
}

#[tokio::test]
async fn test_login_without_token_is_failure() {
    let h = anonymous_harness();
    h.ctx.restore().await;
    h.transport.on(
        HttpMethod::Post,
        "/auth/login",
        ApiResponse::ok(json!({"user": {"id": 1}})),
    );

    let result = h.ctx.login("ada@example.com", "secret").await;

    assert!(!result.success);
    assert_eq!(
        result.error.as_deref(),
        Some("Login failed - no token received")
    );
    assert!(!h.ctx.session.state().is_authenticated);
}

#[tokio::test]
async fn test_logout_empties_everything() {
    let h = signed_in_harness("/cart");
    h.transport
        .on(HttpMethod::Get, "/cart/1", ApiResponse::ok(cart_body(&[(11, 7, 1)])))
        .on(HttpMethod::Get, "/wishlist/1", ApiResponse::ok(json!([{"id": 9, "productId": 5}])));
    h.ctx.restore().await;
    assert!(h.ctx.cart.cart().is_some());

    h.ctx.logout();

    assert!(h.store.is_empty());
    assert!(h.ctx.session.user().is_none());
    assert!(!h.ctx.session.state().is_authenticated);
    assert!(h.ctx.cart.cart().is_none());
    assert!(h.ctx.wishlist.entries().is_empty());
    assert!(!h.ctx.wishlist.contains(&ResourceId::from(5)));

    // A second logout is a no-op
    h.ctx.logout();
    assert!(h.store.is_empty());
    assert!(h.navigator.redirects().is_empty());
}

// ============================================================================
// Access layer: 401 / 403
// ============================================================================

#[tokio::test]
async fn test_401_clears_session_once_and_redirects() {
    let h = signed_in_harness("/cart");
    h.transport
        .on(HttpMethod::Get, "/cart/1", ApiResponse::new(401, None))
        .on(HttpMethod::Get, "/wishlist/1", ApiResponse::ok(json!([])));
    h.ctx.restore().await;

    assert!(h.store.is_empty());
    assert_eq!(h.store.removal_count(), 1);
    assert!(h.ctx.session.user().is_none());
    assert_eq!(h.navigator.redirects(), vec!["/login".to_string()]);
    assert!(h.ctx.cart.cart().is_none());
}

#[tokio::test]
async fn test_401_on_public_route_does_not_redirect() {
    for route in ["/", "/login", "/register"] {
        let h = signed_in_harness(route);
        h.transport
            .on(HttpMethod::Get, "/cart/1", ApiResponse::new(401, None))
            .on(HttpMethod::Get, "/wishlist/1", ApiResponse::new(401, None));
        h.ctx.restore().await;

        assert!(h.store.is_empty(), "session kept on {}", route);
        assert!(h.navigator.redirects().is_empty(), "redirected from {}", route);
    }
}

#[tokio::test]
async fn test_403_is_harmless() {
    let h = signed_in_harness("/orders");
    h.transport
        .on(HttpMethod::Get, "/cart/1", ApiResponse::new(403, None))
        .on(HttpMethod::Get, "/wishlist/1", ApiResponse::ok(json!([])));

    h.ctx.restore().await;
    let (cart, wishlist) = h.ctx.sync_caches().await;

    assert_eq!(cart, LoadOutcome::Cleared);
    assert_eq!(wishlist, LoadOutcome::Loaded);
    assert!(h.ctx.session.state().is_authenticated);
    assert_eq!(h.store.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-1"));
    assert!(h.navigator.redirects().is_empty());
    assert!(h.ctx.cart.state().error.is_none());
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
async fn test_add_to_cart_without_session_makes_no_call() {
    let h = anonymous_harness();
    h.ctx.restore().await;

    let result = h.ctx.cart.add_to_cart(7, 1).await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Please login first"));
    assert!(h.transport.calls().is_empty());
}

#[tokio::test]
async fn test_stale_cart_load_is_discarded_after_logout() {
    let h = signed_in_harness("/cart");
    let gate = Gate::new();
    // First reply serves the restore, the held one the load under test
    empty_caches(&h);
    h.transport.hold(
        HttpMethod::Get,
        "/cart/1",
        gate.clone(),
        ApiResponse::ok(cart_body(&[(11, 7, 3)])),
    );
    h.ctx.restore().await;

    let (outcome, _) = tokio::join!(h.ctx.cart.load(), async {
        gate.entered().await;
        h.ctx.logout();
        gate.release();
    });

    assert_eq!(outcome, LoadOutcome::Discarded);
    assert!(h.ctx.cart.cart().is_none());
    assert!(!h.ctx.cart.state().loading);
}

#[tokio::test]
async fn test_place_order_refreshes_cart() {
    let h = signed_in_harness("/checkout");
    h.transport
        .on(HttpMethod::Get, "/cart/1", ApiResponse::ok(cart_body(&[(11, 7, 1)])))
        .on(HttpMethod::Get, "/cart/1", ApiResponse::ok(cart_body(&[])))
        .on(HttpMethod::Get, "/wishlist/1", ApiResponse::ok(json!([])))
        .on(
            HttpMethod::Post,
            "/orders/1",
            ApiResponse::ok(json!({"id": 44, "status": "PLACED", "totalPrice": 12.5})),
        );
    h.ctx.restore().await;
    assert!(!h.ctx.cart.cart().unwrap().is_empty());

    let order = NewOrder {
        shipping_address: "1 Green St".to_string(),
        payment_method: None,
    };
    let order = h.ctx.orders.place(&order).await.unwrap();

    assert_eq!(order.id, ResourceId::from(44));
    assert!(h.ctx.cart.cart().unwrap().is_empty());
}

// ============================================================================
// Wishlist
// ============================================================================

#[tokio::test]
async fn test_contains_matches_both_entry_shapes() {
    let h = signed_in_harness("/wishlist");
    h.transport
        .on(HttpMethod::Get, "/cart/1", ApiResponse::ok(cart_body(&[])))
        .on(
            HttpMethod::Get,
            "/wishlist/1",
            ApiResponse::ok(json!([
                {"id": 1, "productId": 5},
                {"id": 2, "product": {"id": "8", "name": "Cork Mat"}}
            ])),
        )
        .on(HttpMethod::Get, "/products/5", ApiResponse::new(500, None));
    h.ctx.restore().await;

    // Product 5 could not be hydrated but is still recognized by its bare id
    assert!(h.ctx.wishlist.contains(&ResourceId::from(5)));
    assert!(h.ctx.wishlist.contains(&ResourceId::from(8)));
    assert!(!h.ctx.wishlist.contains(&ResourceId::from(6)));
    assert_eq!(
        h.ctx.wishlist.product_for_entry(&ResourceId::from(1)).unwrap().id,
        ResourceId::from(5)
    );
}

#[tokio::test]
async fn test_partial_entries_keep_the_wishlist_usable() {
    let h = signed_in_harness("/wishlist");
    h.transport
        .on(HttpMethod::Get, "/cart/1", ApiResponse::ok(cart_body(&[])))
        .on(
            HttpMethod::Get,
            "/wishlist/1",
            ApiResponse::ok(json!([
                {"id": 1, "productId": 5, "product": {"id": 5}},
                {"id": 2, "productId": 6, "product": {"name": "Lamp"}},
                {"id": 3, "productId": null},
                {"id": 4, "product": {"id": "8", "name": "Cork Mat"}}
            ])),
        );

    h.ctx.restore().await;

    assert!(h.ctx.wishlist.contains(&ResourceId::from(5)));
    assert!(h.ctx.wishlist.contains(&ResourceId::from(6)));
    assert!(h.ctx.wishlist.contains(&ResourceId::from(8)));
    assert_eq!(h.ctx.wishlist.entries().len(), 3);
    assert!(h.ctx.wishlist.error().is_none());
}

#[tokio::test]
async fn test_wishlist_auth_failures_are_swallowed() {
    // 403: session stays, cache empties, no message
    let h = signed_in_harness("/wishlist");
    empty_caches(&h);
    h.transport
        .on(HttpMethod::Get, "/wishlist/1", ApiResponse::new(403, None));
    h.ctx.restore().await;

    assert_eq!(h.ctx.wishlist.load().await, LoadOutcome::Cleared);
    assert!(h.ctx.wishlist.entries().is_empty());
    assert!(h.ctx.wishlist.error().is_none());
    assert!(h.ctx.session.state().is_authenticated);

    // 401: session torn down, still no message on the wishlist
    let h = signed_in_harness("/");
    empty_caches(&h);
    h.transport
        .on(HttpMethod::Get, "/wishlist/1", ApiResponse::new(401, None));
    h.ctx.restore().await;

    assert_eq!(h.ctx.wishlist.load().await, LoadOutcome::Cleared);
    assert!(h.ctx.wishlist.state().error.is_none());
    assert!(h.ctx.session.user().is_none());
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn test_stale_wishlist_load_is_discarded_after_user_switch() {
    let h = signed_in_harness("/wishlist");
    let gate = Gate::new();
    // First reply serves the restore, the held one the load under test
    empty_caches(&h);
    h.transport
        .hold(
            HttpMethod::Get,
            "/wishlist/1",
            gate.clone(),
            ApiResponse::ok(json!([{"id": 9, "productId": 5, "product": {"id": 5}}])),
        )
        .on(
            HttpMethod::Post,
            "/auth/login",
            ApiResponse::ok(json!({"token": "tok-2", "user": {"id": 2, "role": "USER"}})),
        )
        .on(HttpMethod::Get, "/cart/2", ApiResponse::ok(cart_body(&[])))
        .on(
            HttpMethod::Get,
            "/wishlist/2",
            ApiResponse::ok(json!([{"id": 20, "productId": 6, "product": {"id": 6}}])),
        );
    h.ctx.restore().await;

    let (outcome, login) = tokio::join!(h.ctx.wishlist.load(), async {
        gate.entered().await;
        h.ctx.logout();
        let login = h.ctx.login("grace@example.com", "secret").await;
        gate.release();
        login
    });

    assert!(login.success, "{:?}", login.error);
    assert_eq!(outcome, LoadOutcome::Discarded);
    assert!(h.ctx.wishlist.contains(&ResourceId::from(6)));
    assert!(!h.ctx.wishlist.contains(&ResourceId::from(5)));
    assert!(!h.ctx.wishlist.state().loading);
}

#[tokio::test]
async fn test_toggle_add_then_remove_uses_fresh_state() {
    let h = signed_in_harness("/products/5");
    h.transport
        .on(HttpMethod::Get, "/cart/1", ApiResponse::ok(cart_body(&[])))
        .on(HttpMethod::Get, "/wishlist/1", ApiResponse::ok(json!([])))
        .on(HttpMethod::Get, "/wishlist/1", ApiResponse::ok(json!([{"id": 9, "productId": 5}])))
        .on(HttpMethod::Get, "/wishlist/1", ApiResponse::ok(json!([])))
        .on(HttpMethod::Get, "/products/5", ApiResponse::ok(json!({"id": 5, "name": "Tote"})))
        .on(HttpMethod::Post, "/wishlist/1", ApiResponse::ok(json!({"id": 9})))
        .on(HttpMethod::Delete, "/wishlist/1/5", ApiResponse::no_content());
    h.ctx.restore().await;

    assert_eq!(h.ctx.wishlist.toggle(5).await.unwrap(), WishlistChange::Added);
    assert!(h.ctx.wishlist.contains(&ResourceId::from(5)));

    assert_eq!(h.ctx.wishlist.toggle(5).await.unwrap(), WishlistChange::Removed);
    assert!(!h.ctx.wishlist.contains(&ResourceId::from(5)));

    let mutations: Vec<String> = h
        .transport
        .call_log()
        .into_iter()
        .filter(|c| !c.starts_with("GET"))
        .collect();
    assert_eq!(mutations, vec!["POST /wishlist/1", "DELETE /wishlist/1/5"]);
    let post = h
        .transport
        .calls()
        .into_iter()
        .find(|c| c.method == HttpMethod::Post)
        .unwrap();
    assert_eq!(post.body, Some(json!({"productId": 5})));
}

#[tokio::test]
async fn test_removal_tries_shapes_in_order() {
    let h = signed_in_harness("/wishlist");
    h.transport
        .on(HttpMethod::Get, "/cart/1", ApiResponse::ok(cart_body(&[])))
        .on(HttpMethod::Get, "/wishlist/1", ApiResponse::ok(json!([{"id": 9, "productId": 5}])))
        .on(HttpMethod::Get, "/wishlist/1", ApiResponse::ok(json!([])))
        .on(
            HttpMethod::Delete,
            "/wishlist/remove?userId=1&productId=5",
            ApiResponse::ok(json!({"message": "Removed"})),
        );
    h.ctx.restore().await;

    h.ctx.wishlist.remove_entry(9).await.unwrap();

    let deletes: Vec<String> = h
        .transport
        .call_log()
        .into_iter()
        .filter(|c| c.starts_with("DELETE"))
        .collect();
    assert_eq!(
        deletes,
        vec![
            "DELETE /wishlist/1/5",
            "DELETE /wishlist/remove?userId=1&productId=5"
        ]
    );
    assert!(!h.ctx.wishlist.contains(&ResourceId::from(5)));
}

#[tokio::test]
async fn test_failed_removal_leaves_cache_unchanged() {
    let h = signed_in_harness("/wishlist");
    h.transport
        .on(HttpMethod::Get, "/cart/1", ApiResponse::ok(cart_body(&[])))
        .on(
            HttpMethod::Get,
            "/wishlist/1",
            ApiResponse::ok(json!([{"id": 9, "product": {"id": 5}}])),
        );
    h.ctx.restore().await;
    let before = h.ctx.wishlist.entries();

    let err = h.ctx.wishlist.remove_product(5).await.unwrap_err();

    match err {
        Error::ContractMismatch { attempts, trace, .. } => {
            assert_eq!(attempts, 4);
            let labels: Vec<_> = trace.iter().map(|r| r.label).collect();
            assert_eq!(
                labels,
                vec!["path-param", "query-params", "root-with-query", "root-with-body"]
            );
            assert!(trace.iter().all(|r| !r.succeeded()));
        }
        other => panic!("expected ContractMismatch, got {:?}", other),
    }
    assert_eq!(h.ctx.wishlist.entries(), before);
    assert_eq!(
        h.ctx.wishlist.error().as_deref(),
        Some("Failed to remove from wishlist")
    );
    assert_eq!(h.transport.call_count(HttpMethod::Get, "/wishlist/1"), 1);
}

#[tokio::test]
async fn test_wishlist_mutation_without_session_sets_error() {
    let h = anonymous_harness();
    h.ctx.restore().await;

    let err = h.ctx.wishlist.toggle(5).await.unwrap_err();

    assert!(matches!(err, Error::NotAuthenticated(_)));
    assert_eq!(
        h.ctx.wishlist.error().as_deref(),
        Some("Please log in to manage your wishlist")
    );
    assert!(h.transport.calls().is_empty());
}
