//! Product reviews

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::id::ResourceId;

/// Star ratings accepted by the review endpoint
pub const RATING_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// A review as listed under a product or a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ResourceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ResourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<ResourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Review {
    /// Reviewer name when the server includes one
    pub fn author(&self) -> Option<&str> {
        ["userName", "reviewerName", "name"]
            .iter()
            .find_map(|key| self.extra.get(*key).and_then(JsonValue::as_str))
    }
}

/// Payload for `POST /reviews`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub product_id: ResourceId,
    pub user_id: ResourceId,
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}
