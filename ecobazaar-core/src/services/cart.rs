//! Cart cache
//!
//! In-memory snapshot of the signed-in user's server cart. Mutations go to
//! the server and are followed by a full reload; the cart is never patched
//! locally.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, warn};

use super::cache::{CacheSlot, LoadOutcome};
use super::http::ApiClient;
use super::session_handle::SessionHandle;
use crate::domain::result::{ActionResult, Error, Result};
use crate::domain::{Cart, CartFilter, ResourceId};
use crate::ports::{path_segment, ApiRequest};

pub(crate) const LOGIN_FIRST: &str = "Please login first";

/// UI view of the cart cache
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CartState {
    pub cart: Option<Cart>,
    pub loading: bool,
    pub error: Option<String>,
}

fn decode_cart(body: JsonValue) -> Result<Cart> {
    let (cart, rejected) = Cart::from_json(body)?;
    for line in &rejected {
        warn!("Skipping unreadable cart line {}: {}", line.index, line.reason);
    }
    Ok(cart)
}

pub struct CartService {
    api: Arc<ApiClient>,
    session: Arc<SessionHandle>,
    slot: Mutex<CacheSlot<Cart>>,
}

impl CartService {
    pub fn new(api: Arc<ApiClient>, session: Arc<SessionHandle>) -> Self {
        Self {
            api,
            session,
            slot: Mutex::new(CacheSlot::default()),
        }
    }

    fn slot(&self) -> MutexGuard<'_, CacheSlot<Cart>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn fetch(&self, user_id: &ResourceId) -> Result<Option<Cart>> {
        let request = ApiRequest::get(format!("/cart/{}", path_segment(user_id)));
        let body = self.api.send(request).await?;
        if body.is_null() {
            return Ok(None);
        }
        Ok(Some(decode_cart(body)?))
    }

    /// Fetch the cart of the current user and replace the cache
    pub async fn load(&self) -> LoadOutcome {
        self.session.ready().await;
        let Some((generation, user_id)) = self.session.identity() else {
            return LoadOutcome::Skipped;
        };

        let ticket = self.slot().begin(generation);
        let (value, error, outcome) = match self.fetch(&user_id).await {
            Ok(cart) => (cart, None, LoadOutcome::Loaded),
            Err(e) if e.is_auth_failure() => {
                warn!("Cart access denied, user may need to log in again: {}", e);
                (None, None, LoadOutcome::Cleared)
            }
            Err(e) => {
                warn!("Failed to load cart: {}", e);
                (None, Some(e.user_message("Failed to load cart")), LoadOutcome::Failed)
            }
        };

        let current = self.session.generation();
        // a 401 tears the session down while this load is in flight; the
        // cache ends up empty either way
        if self.slot().settle(ticket, current, value, error) || outcome == LoadOutcome::Cleared {
            outcome
        } else {
            debug!("Dropping cart response for a superseded load");
            LoadOutcome::Discarded
        }
    }

    pub async fn refresh(&self) -> LoadOutcome {
        self.load().await
    }

    async fn signed_in_user(&self) -> Option<ResourceId> {
        self.session.ready().await;
        self.session.identity().map(|(_, id)| id)
    }

    /// Send a mutation and reload the cart once it succeeded
    async fn mutate(&self, request: ApiRequest, fallback: &str) -> ActionResult {
        match self.api.send(request).await {
            Ok(_) => {
                self.load().await;
                ActionResult::done()
            }
            Err(e) => {
                warn!("Cart update failed: {}", e);
                ActionResult::fail(e.user_message(fallback))
            }
        }
    }

    pub async fn add_to_cart(&self, product_id: impl Into<ResourceId>, quantity: u32) -> ActionResult {
        let Some(user_id) = self.signed_in_user().await else {
            return ActionResult::fail(LOGIN_FIRST);
        };
        let product_id = product_id.into();
        let request = ApiRequest::post(format!("/cart/{}/items", path_segment(&user_id)))
            .json(json!({ "productId": product_id, "quantity": quantity }));
        self.mutate(request, "Failed to add to cart").await
    }

    pub async fn remove_from_cart(&self, item_id: impl Into<ResourceId>) -> ActionResult {
        let Some(user_id) = self.signed_in_user().await else {
            return ActionResult::fail(LOGIN_FIRST);
        };
        let request = ApiRequest::delete(format!(
            "/cart/{}/items/{}",
            path_segment(&user_id),
            path_segment(item_id.into())
        ));
        self.mutate(request, "Failed to remove from cart").await
    }

    /// Server-side filtered view of the cart. Does not touch the cache.
    pub async fn filtered(&self, filter: &CartFilter) -> Result<Cart> {
        let user_id = self
            .signed_in_user()
            .await
            .ok_or_else(|| Error::not_authenticated(LOGIN_FIRST))?;
        let request =
            ApiRequest::get(format!("/cart/{}/filtered", path_segment(&user_id))).query_pairs(filter.to_pairs());
        let body: JsonValue = self.api.send(request).await?;
        if body.is_null() {
            return Ok(Cart::default());
        }
        decode_cart(body)
    }

    /// Forget the cached cart locally (no server call)
    pub fn clear_cart(&self) {
        self.slot().reset();
    }

    pub fn cart(&self) -> Option<Cart> {
        let generation = self.session.generation();
        self.slot().value(generation).cloned()
    }

    pub fn state(&self) -> CartState {
        let generation = self.session.generation();
        let slot = self.slot();
        CartState {
            cart: slot.value(generation).cloned(),
            loading: slot.loading(),
            error: slot.error(generation).map(str::to_string),
        }
    }
}
