//! Persisted session - the two localStorage-style entries
//!
//! The token and the JSON user record are always written and cleared
//! together. A reader that finds one without the other treats the session as
//! absent.

use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::domain::result::Result;
use crate::domain::User;
use crate::ports::SessionStore;

pub const TOKEN_KEY: &str = "ecobazaar_token";
pub const USER_KEY: &str = "ecobazaar_user";

/// Short, non-reversible identifier of a token for log lines
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(&digest[..4])
}

#[derive(Clone)]
pub struct PersistedSession {
    store: Arc<dyn SessionStore>,
}

impl PersistedSession {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Raw `(token, user blob)` pair, only when both entries are present
    pub fn load(&self) -> Result<Option<(String, String)>> {
        let mut values = self
            .store
            .get_many(&[TOKEN_KEY, USER_KEY])?
            .into_iter()
            .map(|v| v.filter(|s| !s.trim().is_empty()));
        let token = values.next().flatten();
        let user = values.next().flatten();
        Ok(token.zip(user))
    }

    /// Bearer credential for outbound calls
    pub fn token(&self) -> Result<Option<String>> {
        Ok(self.load()?.map(|(token, _)| token))
    }

    pub fn save(&self, token: &str, user: &User) -> Result<()> {
        let blob = serde_json::to_string(user)?;
        self.store.set_many(&[(TOKEN_KEY, token), (USER_KEY, &blob)])
    }

    /// Replace the user record, keeping the token
    pub fn save_user(&self, user: &User) -> Result<()> {
        let blob = serde_json::to_string(user)?;
        self.store.set_many(&[(USER_KEY, &blob)])
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove_many(&[TOKEN_KEY, USER_KEY])
    }
}

impl std::fmt::Debug for PersistedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistedSession").finish_non_exhaustive()
    }
}
