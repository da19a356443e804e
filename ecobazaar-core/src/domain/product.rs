//! Product domain model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::id::ResourceId;

/// A marketplace product as returned by the catalog endpoints
///
/// Sustainability fields are optional: not every seller fills them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ResourceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    /// kg CO2e per unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbon_footprint: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eco_rating: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<JsonValue>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Product {
    pub fn new(id: impl Into<ResourceId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            price: None,
            carbon_footprint: None,
            eco_rating: None,
            category: None,
            extra: Map::new(),
        }
    }

    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Product #{}", self.id))
    }

    /// Eco rating rendered for display; the API sends either a letter grade
    /// or a numeric score
    pub fn eco_rating_label(&self) -> Option<String> {
        match self.eco_rating.as_ref()? {
            JsonValue::String(s) => Some(s.clone()),
            JsonValue::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Product category (`/categories`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ResourceId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Category {
    /// A category that has not been saved yet
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            extra: Map::new(),
        }
    }
}

/// Catalog search parameters (`GET /products?...`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub keyword: Option<String>,
    pub category: Option<String>,
    pub eco_rating: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub sort_by: Option<String>,
}

impl ProductQuery {
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: Some(keyword.into()),
            ..Default::default()
        }
    }

    /// Query-string pairs, skipping unset filters
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        [
            ("keyword", &self.keyword),
            ("category", &self.category),
            ("ecoRating", &self.eco_rating),
            ("minPrice", &self.min_price),
            ("maxPrice", &self.max_price),
            ("sortBy", &self.sort_by),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| (key.to_string(), v.clone())))
        .collect()
    }
}
