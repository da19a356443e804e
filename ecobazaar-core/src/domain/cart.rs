//! Cart domain model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::id::ResourceId;
use super::product::Product;
use super::records::{decode_each, decode_with_product_fallback, Rejected};

/// Server-held cart of the signed-in user
///
/// The client never edits a cart in place: every mutation goes through the
/// API and the whole cart is fetched again.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ResourceId>,
    #[serde(default, alias = "cartItems")]
    pub items: Vec<CartItem>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// One line of a cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(alias = "id")]
    pub item_id: ResourceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ResourceId>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
    /// Unit price when the server sends it on the line itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

fn default_quantity() -> u32 {
    1
}

impl CartItem {
    /// Decode one line, tolerating a partial nested product the same way
    /// wishlist entries do
    pub fn from_json(value: JsonValue) -> serde_json::Result<Self> {
        decode_with_product_fallback(value)
    }

    /// Product reference, from the bare id or the nested product
    pub fn product_ref(&self) -> Option<&ResourceId> {
        self.product_id
            .as_ref()
            .or_else(|| self.product.as_ref().map(|p| &p.id))
    }

    pub fn unit_price(&self) -> Option<Decimal> {
        self.price
            .or_else(|| self.product.as_ref().and_then(|p| p.price))
    }

    pub fn line_total(&self) -> Option<Decimal> {
        self.unit_price().map(|p| p * Decimal::from(self.quantity))
    }

    pub fn line_carbon(&self) -> Option<Decimal> {
        self.product
            .as_ref()
            .and_then(|p| p.carbon_footprint)
            .map(|c| c * Decimal::from(self.quantity))
    }
}

impl Cart {
    /// Decode a cart body line by line. Lines that cannot be decoded are
    /// left out and returned alongside the cart.
    pub fn from_json(mut body: JsonValue) -> serde_json::Result<(Self, Vec<Rejected>)> {
        let lines = match body.as_object_mut() {
            Some(fields) => {
                let items = fields.remove("items");
                let alias = fields.remove("cartItems");
                items.or(alias)
            }
            None => None,
        };
        let mut cart: Cart = serde_json::from_value(body)?;
        let lines: Option<Vec<JsonValue>> = match lines {
            Some(lines) => serde_json::from_value(lines)?,
            None => None,
        };
        let (items, rejected) = decode_each(lines.unwrap_or_default(), CartItem::from_json);
        cart.items = items;
        Ok((cart, rejected))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Sum of line totals; lines without a known price are skipped
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().filter_map(CartItem::line_total).sum()
    }

    /// Estimated kg CO2e of the cart
    pub fn carbon_total(&self) -> Decimal {
        self.items.iter().filter_map(CartItem::line_carbon).sum()
    }

    pub fn contains_product(&self, product_id: &ResourceId) -> bool {
        self.items
            .iter()
            .any(|i| i.product_ref() == Some(product_id))
    }
}

/// Filters for `GET /cart/{userId}/filtered`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartFilter {
    pub category: Option<String>,
    pub eco_rating: Option<String>,
    pub max_carbon: Option<String>,
}

impl CartFilter {
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        [
            ("category", &self.category),
            ("ecoRating", &self.eco_rating),
            ("maxCarbon", &self.max_carbon),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| (key.to_string(), v.clone())))
        .collect()
    }
}
