//! Order and carbon report models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::id::ResourceId;

/// A placed order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: ResourceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_carbon_footprint: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_date: Option<String>,
    #[serde(default)]
    pub items: Vec<JsonValue>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Checkout payload for `POST /orders/{userId}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub shipping_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

/// Per-user carbon impact summary (`GET /carbon/report/{userId}`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_carbon_footprint: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_carbon_saved: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_orders: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// One row of `GET /community/carbon-leaderboard`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<ResourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_carbon_saved: Option<Decimal>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl LeaderboardEntry {
    pub fn display_name(&self) -> String {
        ["userName", "name", "fullName"]
            .iter()
            .find_map(|key| self.extra.get(*key).and_then(JsonValue::as_str))
            .map(str::to_string)
            .or_else(|| self.user_id.as_ref().map(|id| format!("User #{}", id)))
            .unwrap_or_else(|| "Anonymous".to_string())
    }
}
