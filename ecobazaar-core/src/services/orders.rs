//! Order service
//!
//! Placing an order empties the server cart, so the cart cache is reloaded
//! right after.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::info;

use super::cart::{CartService, LOGIN_FIRST};
use super::http::ApiClient;
use super::session_handle::SessionHandle;
use crate::domain::result::Result;
use crate::domain::{NewOrder, Order, ResourceId};
use crate::ports::{path_segment, ApiRequest};

pub struct OrderService {
    api: Arc<ApiClient>,
    session: Arc<SessionHandle>,
    cart: Arc<CartService>,
}

fn order_list(body: JsonValue) -> Result<Vec<Order>> {
    if body.is_null() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_value(body)?)
}

impl OrderService {
    pub fn new(api: Arc<ApiClient>, session: Arc<SessionHandle>, cart: Arc<CartService>) -> Self {
        Self { api, session, cart }
    }

    async fn user_id(&self) -> Result<ResourceId> {
        self.session.require_user_id(LOGIN_FIRST).await
    }

    pub async fn place(&self, order: &NewOrder) -> Result<Order> {
        let user_id = self.user_id().await?;
        let request = ApiRequest::post(format!("/orders/{}", path_segment(&user_id)))
            .json(serde_json::to_value(order)?);
        let placed: Order = self.api.send_json(request).await?;
        info!("Placed order {} for user {}", placed.id, user_id);
        self.cart.load().await;
        Ok(placed)
    }

    pub async fn list(&self) -> Result<Vec<Order>> {
        let user_id = self.user_id().await?;
        let request = ApiRequest::get(format!("/orders/user/{}", path_segment(&user_id)));
        order_list(self.api.send(request).await?)
    }

    pub async fn get(&self, order_id: &ResourceId) -> Result<Order> {
        self.user_id().await?;
        self.api
            .get_json(format!("/orders/{}", path_segment(order_id)))
            .await
    }

    /// Every order on the platform (admin)
    pub async fn all(&self) -> Result<Vec<Order>> {
        self.user_id().await?;
        order_list(self.api.send(ApiRequest::get("/orders/all")).await?)
    }

    /// Move an order to `status` (seller/admin). The status travels as a
    /// query parameter, the request has no body.
    pub async fn update_status(&self, order_id: &ResourceId, status: &str) -> Result<Order> {
        self.user_id().await?;
        let request = ApiRequest::put(format!("/orders/{}/status", path_segment(order_id)))
            .query("status", status);
        let updated: Order = self.api.send_json(request).await?;
        info!("Order {} is now {}", order_id, status);
        Ok(updated)
    }
}
