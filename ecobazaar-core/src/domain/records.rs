//! Per-record decoding of server collections
//!
//! Cart lines and wishlist entries are decoded one at a time: a single record
//! the client cannot make sense of is reported back to the caller instead of
//! failing the whole collection.

use serde_json::Value as JsonValue;

/// A record that could not be decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    /// Position in the collection as sent by the server
    pub index: usize,
    pub reason: String,
}

/// Decode every value with `decode`, keeping the ones that succeed
pub fn decode_each<T>(
    values: Vec<JsonValue>,
    decode: impl Fn(JsonValue) -> serde_json::Result<T>,
) -> (Vec<T>, Vec<Rejected>) {
    let mut decoded = Vec::with_capacity(values.len());
    let mut rejected = Vec::new();
    for (index, value) in values.into_iter().enumerate() {
        match decode(value) {
            Ok(item) => decoded.push(item),
            Err(e) => rejected.push(Rejected {
                index,
                reason: e.to_string(),
            }),
        }
    }
    (decoded, rejected)
}

/// Give a nested `product` object without an `id` the record's `productId`
pub(crate) fn backfill_product_id(record: &mut JsonValue) {
    let Some(fields) = record.as_object_mut() else {
        return;
    };
    let Some(product_id) = fields.get("productId").filter(|v| !v.is_null()).cloned() else {
        return;
    };
    if let Some(JsonValue::Object(product)) = fields.get_mut("product") {
        if product.get("id").map_or(true, JsonValue::is_null) {
            product.insert("id".to_string(), product_id);
        }
    }
}

/// Decode a record that may embed a `product`; when the embedded details are
/// unusable, decode it again without them
pub(crate) fn decode_with_product_fallback<T: serde::de::DeserializeOwned>(
    mut record: JsonValue,
) -> serde_json::Result<T> {
    backfill_product_id(&mut record);
    let error = match serde_json::from_value::<T>(record.clone()) {
        Ok(decoded) => return Ok(decoded),
        Err(e) => e,
    };
    let dropped = record
        .as_object_mut()
        .and_then(|fields| fields.remove("product"))
        .is_some();
    if dropped {
        serde_json::from_value(record).map_err(|_| error)
    } else {
        Err(error)
    }
}
