//! Wishlist domain model
//!
//! The backend is not consistent about the shape of a wishlist entry: some
//! deployments return `{id, productId}`, others embed the product
//! (`{id, product: {id, ...}}`), some send both. Entries are normalized into
//! [`EntryTarget`] once, at deserialization time, so membership and removal
//! never sniff JSON shapes at the call site.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::id::ResourceId;
use super::product::Product;
use super::records::decode_with_product_fallback;

/// What a wishlist entry points at
#[derive(Debug, Clone, PartialEq)]
pub enum EntryTarget {
    /// Only the product id is known
    Bare(ResourceId),
    /// Product embedded; the entry-level `productId` may or may not be present
    WithProduct {
        product_id: Option<ResourceId>,
        product: Product,
    },
}

impl EntryTarget {
    /// Product id used for removal calls: the entry-level id first, the
    /// nested product's id otherwise
    pub fn product_id(&self) -> &ResourceId {
        match self {
            EntryTarget::Bare(id) => id,
            EntryTarget::WithProduct {
                product_id: Some(id),
                ..
            } => id,
            EntryTarget::WithProduct { product, .. } => &product.id,
        }
    }

    /// Whether this entry refers to `product_id`, through either the nested
    /// product or the bare id
    pub fn refers_to(&self, product_id: &ResourceId) -> bool {
        match self {
            EntryTarget::Bare(id) => id == product_id,
            EntryTarget::WithProduct {
                product_id: bare,
                product,
            } => &product.id == product_id || bare.as_ref() == Some(product_id),
        }
    }

    pub fn product(&self) -> Option<&Product> {
        match self {
            EntryTarget::Bare(_) => None,
            EntryTarget::WithProduct { product, .. } => Some(product),
        }
    }
}

/// One wishlist entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEntry", into = "RawEntry")]
pub struct WishlistEntry {
    pub entry_id: Option<ResourceId>,
    pub target: EntryTarget,
    pub extra: Map<String, JsonValue>,
}

impl WishlistEntry {
    pub fn bare(entry_id: impl Into<ResourceId>, product_id: impl Into<ResourceId>) -> Self {
        Self {
            entry_id: Some(entry_id.into()),
            target: EntryTarget::Bare(product_id.into()),
            extra: Map::new(),
        }
    }

    pub fn with_product(entry_id: impl Into<ResourceId>, product: Product) -> Self {
        Self {
            entry_id: Some(entry_id.into()),
            target: EntryTarget::WithProduct {
                product_id: None,
                product,
            },
            extra: Map::new(),
        }
    }

    /// Decode one entry as the server sent it. A nested product without an
    /// id takes the entry's `productId`; a nested product that cannot be read
    /// at all leaves a bare entry when `productId` is known.
    pub fn from_json(value: JsonValue) -> serde_json::Result<Self> {
        decode_with_product_fallback(value)
    }

    pub fn product_id(&self) -> &ResourceId {
        self.target.product_id()
    }

    pub fn refers_to(&self, product_id: &ResourceId) -> bool {
        self.target.refers_to(product_id)
    }

    /// Attach product details fetched separately, keeping the bare id
    pub fn hydrate(&mut self, product: Product) {
        if let EntryTarget::Bare(id) = &self.target {
            self.target = EntryTarget::WithProduct {
                product_id: Some(id.clone()),
                product,
            };
        }
    }
}

/// Wire shape of an entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<ResourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    product_id: Option<ResourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    product: Option<Product>,
    #[serde(flatten)]
    extra: Map<String, JsonValue>,
}

impl TryFrom<RawEntry> for WishlistEntry {
    type Error = String;

    fn try_from(raw: RawEntry) -> std::result::Result<Self, Self::Error> {
        let target = match (raw.product, raw.product_id) {
            (Some(product), product_id) => EntryTarget::WithProduct {
                product_id,
                product,
            },
            (None, Some(id)) => EntryTarget::Bare(id),
            (None, None) => {
                return Err("wishlist entry has neither productId nor product".to_string())
            }
        };
        Ok(Self {
            entry_id: raw.id,
            target,
            extra: raw.extra,
        })
    }
}

impl From<WishlistEntry> for RawEntry {
    fn from(entry: WishlistEntry) -> Self {
        let (product_id, product) = match entry.target {
            EntryTarget::Bare(id) => (Some(id), None),
            EntryTarget::WithProduct {
                product_id,
                product,
            } => (product_id, Some(product)),
        };
        RawEntry {
            id: entry.entry_id,
            product_id,
            product,
            extra: entry.extra,
        }
    }
}
