//! Server-assigned identifiers

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Identifier as sent by the backend.
///
/// Depending on the endpoint the API returns ids as JSON numbers or strings.
/// The original representation is kept so a record serializes back exactly as
/// it was received, while comparison goes through the canonical text form:
/// `7` and `"7"` are the same id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Number(i64),
    Text(String),
}

impl ResourceId {
    /// Canonical text form, used in URL paths and comparisons
    pub fn as_key(&self) -> String {
        match self {
            ResourceId::Number(n) => n.to_string(),
            ResourceId::Text(s) => s.trim().to_string(),
        }
    }
}

impl PartialEq for ResourceId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ResourceId::Number(a), ResourceId::Number(b)) => a == b,
            _ => self.as_key() == other.as_key(),
        }
    }
}

impl Eq for ResourceId {}

impl Hash for ResourceId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_key().hash(state);
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_key())
    }
}

impl From<i64> for ResourceId {
    fn from(n: i64) -> Self {
        ResourceId::Number(n)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        s.parse::<i64>()
            .map(ResourceId::Number)
            .unwrap_or_else(|_| ResourceId::Text(s.to_string()))
    }
}

impl From<String> for ResourceId {
    fn from(s: String) -> Self {
        ResourceId::from(s.as_str())
    }
}
