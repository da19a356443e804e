//! Product reviews
//!
//! Reading a product's reviews is public. Writing and deleting act as the
//! signed-in user, whose id the server expects in the body or query.

use std::sync::Arc;

use serde_json::{json, Value as JsonValue};
use tracing::info;

use super::http::ApiClient;
use super::session_handle::SessionHandle;
use crate::domain::result::{Error, Result};
use crate::domain::{NewReview, ResourceId, Review, RATING_RANGE};
use crate::ports::{path_segment, ApiRequest};

const LOGIN_TO_REVIEW: &str = "Please login to write a review";

pub struct ReviewService {
    api: Arc<ApiClient>,
    session: Arc<SessionHandle>,
}

fn review_list(body: JsonValue) -> Result<Vec<Review>> {
    match body {
        JsonValue::Null => Ok(Vec::new()),
        body => Ok(serde_json::from_value(body)?),
    }
}

impl ReviewService {
    pub fn new(api: Arc<ApiClient>, session: Arc<SessionHandle>) -> Self {
        Self { api, session }
    }

    pub async fn for_product(&self, product_id: &ResourceId) -> Result<Vec<Review>> {
        let request = ApiRequest::get(format!("/reviews/product/{}", path_segment(product_id)));
        review_list(self.api.send(request).await?)
    }

    /// Reviews written by the signed-in user
    pub async fn mine(&self) -> Result<Vec<Review>> {
        let user_id = self.session.require_user_id(LOGIN_TO_REVIEW).await?;
        let request = ApiRequest::get(format!("/reviews/user/{}", path_segment(&user_id)));
        review_list(self.api.send(request).await?)
    }

    pub async fn add(
        &self,
        product_id: impl Into<ResourceId>,
        rating: u8,
        comment: Option<String>,
    ) -> Result<Review> {
        if !RATING_RANGE.contains(&rating) {
            return Err(Error::Validation {
                status: 400,
                payload: Some(json!({"error": "Rating must be between 1 and 5"})),
            });
        }
        let user_id = self.session.require_user_id(LOGIN_TO_REVIEW).await?;
        let review = NewReview {
            product_id: product_id.into(),
            user_id,
            rating,
            comment: comment.filter(|c| !c.trim().is_empty()),
        };
        let request = ApiRequest::post("/reviews").json(serde_json::to_value(&review)?);
        let saved: Review = self.api.send_json(request).await?;
        info!("Review {} added for product {}", saved.id, review.product_id);
        Ok(saved)
    }

    pub async fn delete(&self, review_id: &ResourceId) -> Result<()> {
        let user_id = self.session.require_user_id(LOGIN_TO_REVIEW).await?;
        let request = ApiRequest::delete(format!("/reviews/{}", path_segment(review_id)))
            .query("userId", &user_id);
        self.api.send(request).await.map(|_| ())
    }
}
