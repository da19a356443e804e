//! Catalog service - products and categories
//!
//! Anonymous access is fine for reads; the bearer is attached when a session
//! exists so sellers and admins see their own listings. Seller and admin
//! operations name the acting user in the query string, the server checks
//! the role.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::info;

use super::http::ApiClient;
use super::session_handle::SessionHandle;
use crate::domain::result::Result;
use crate::domain::{Category, Product, ProductQuery, ResourceId};
use crate::ports::{path_segment, ApiRequest};

const LOGIN_TO_MANAGE: &str = "Please login to manage products";

pub struct CatalogService {
    api: Arc<ApiClient>,
    session: Arc<SessionHandle>,
}

/// Product listings come either as a bare array or wrapped in a page object
fn product_list(body: JsonValue) -> Result<Vec<Product>> {
    let list = match body {
        JsonValue::Null => return Ok(Vec::new()),
        JsonValue::Object(mut page) => ["content", "products", "items"]
            .iter()
            .find_map(|key| page.remove(*key))
            .unwrap_or(JsonValue::Array(Vec::new())),
        other => other,
    };
    Ok(serde_json::from_value(list)?)
}

impl CatalogService {
    pub fn new(api: Arc<ApiClient>, session: Arc<SessionHandle>) -> Self {
        Self { api, session }
    }

    pub async fn search(&self, query: &ProductQuery) -> Result<Vec<Product>> {
        let request = ApiRequest::get("/products").query_pairs(query.to_pairs());
        product_list(self.api.send(request).await?)
    }

    pub async fn product(&self, id: &ResourceId) -> Result<Product> {
        self.api.get_json(format!("/products/{}", path_segment(id))).await
    }

    pub async fn featured(&self) -> Result<Vec<Product>> {
        product_list(self.api.send(ApiRequest::get("/products/featured")).await?)
    }

    async fn acting_user(&self) -> Result<ResourceId> {
        self.session.require_user_id(LOGIN_TO_MANAGE).await
    }

    /// Listings of the signed-in seller
    pub async fn my_products(&self) -> Result<Vec<Product>> {
        let seller_id = self.acting_user().await?;
        let request = ApiRequest::get(format!("/products/seller/{}", path_segment(&seller_id)));
        product_list(self.api.send(request).await?)
    }

    /// Create a listing from a product form. Field names are the server's.
    pub async fn create_product(&self, draft: JsonValue) -> Result<Product> {
        self.acting_user().await?;
        let created: Product = self
            .api
            .send_json(ApiRequest::post("/products/add").json(draft))
            .await?;
        info!("Created product {}", created.id);
        Ok(created)
    }

    pub async fn update_product(&self, id: &ResourceId, changes: JsonValue) -> Result<Product> {
        self.acting_user().await?;
        let request = ApiRequest::put(format!("/products/{}", path_segment(id))).json(changes);
        self.api.send_json(request).await
    }

    pub async fn delete_product(&self, id: &ResourceId) -> Result<()> {
        let user_id = self.acting_user().await?;
        let request = ApiRequest::delete(format!("/products/{}", path_segment(id)))
            .query("userId", &user_id);
        self.api.send(request).await?;
        info!("Deleted product {}", id);
        Ok(())
    }

    /// Admin: listings waiting for verification
    pub async fn pending_products(&self) -> Result<Vec<Product>> {
        self.acting_user().await?;
        product_list(self.api.send(ApiRequest::get("/products/admin/pending")).await?)
    }

    /// Admin: approve a pending listing
    pub async fn verify_product(&self, id: &ResourceId) -> Result<JsonValue> {
        let admin_id = self.acting_user().await?;
        let request = ApiRequest::put(format!("/products/admin/verify/{}", path_segment(id)))
            .query("adminId", &admin_id);
        self.api.send(request).await
    }

    /// Admin: flip the featured flag
    pub async fn toggle_featured(&self, id: &ResourceId) -> Result<JsonValue> {
        let admin_id = self.acting_user().await?;
        let request = ApiRequest::put(format!("/products/{}/feature", path_segment(id)))
            .query("adminId", &admin_id);
        self.api.send(request).await
    }

    pub async fn categories(&self) -> Result<Vec<Category>> {
        match self.api.send(ApiRequest::get("/categories")).await? {
            JsonValue::Null => Ok(Vec::new()),
            body => Ok(serde_json::from_value(body)?),
        }
    }

    pub async fn create_category(&self, category: &Category) -> Result<Category> {
        let request = ApiRequest::post("/categories").json(serde_json::to_value(category)?);
        self.api.send_json(request).await
    }

    pub async fn update_category(&self, id: &ResourceId, category: &Category) -> Result<Category> {
        let request = ApiRequest::put(format!("/categories/{}", path_segment(id)))
            .json(serde_json::to_value(category)?);
        self.api.send_json(request).await
    }

    pub async fn delete_category(&self, id: &ResourceId) -> Result<()> {
        let request = ApiRequest::delete(format!("/categories/{}", path_segment(id)));
        self.api.send(request).await.map(|_| ())
    }
}
