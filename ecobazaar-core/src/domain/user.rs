//! User domain model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::id::ResourceId;
use super::result::Result;

/// Marketplace role as assigned by the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    User,
    Seller,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Seller => "SELLER",
            Role::Admin => "ADMIN",
        }
    }
}

/// Represents an authenticated user
///
/// Only `id` and `role` are interpreted by the client. Every other profile
/// field the server sends is carried in `profile` so the persisted copy keeps
/// the full record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: ResourceId,
    #[serde(default)]
    pub role: Role,
    #[serde(flatten)]
    pub profile: Map<String, JsonValue>,
}

impl User {
    pub fn new(id: impl Into<ResourceId>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
            profile: Map::new(),
        }
    }

    /// Parse a persisted or server-provided user blob
    pub fn from_json(value: JsonValue) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Display name, falling back to the email address
    pub fn display_name(&self) -> Option<&str> {
        ["name", "fullName", "username", "email"]
            .iter()
            .filter_map(|key| self.profile.get(*key))
            .find_map(|v| v.as_str())
    }

    pub fn email(&self) -> Option<&str> {
        self.profile.get("email").and_then(|v| v.as_str())
    }

    /// Shallow merge of `patch` over the current fields.
    ///
    /// The merged record must still be a valid user; on failure `self` is
    /// returned untouched through the error path.
    pub fn merged(&self, patch: &Map<String, JsonValue>) -> Result<Self> {
        let mut current = match serde_json::to_value(self)? {
            JsonValue::Object(map) => map,
            _ => Map::new(),
        };
        for (key, value) in patch {
            current.insert(key.clone(), value.clone());
        }
        Self::from_json(JsonValue::Object(current))
    }
}
