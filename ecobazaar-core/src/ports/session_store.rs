//! Session store port - client-local key/value persistence
//!
//! Plays the role browser `localStorage` plays for the web storefront: a
//! handful of string entries that survive restarts and are shared by every
//! client instance pointed at the same storage.

use crate::domain::result::Result;

/// Persisted string entries
///
/// Multi-key writes and removals must be atomic: a `get_many` reader never
/// observes a state where only some of the keys of one `set_many` /
/// `remove_many` call were applied. Implementations shared between processes
/// override `get_many` to read under one lock.
pub trait SessionStore: Send + Sync {
    /// Read a single entry
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Read several entries from one consistent snapshot
    fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>> {
        keys.iter().map(|key| self.get(key)).collect()
    }

    /// Write several entries at once
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()>;

    /// Remove several entries at once (missing keys are ignored)
    fn remove_many(&self, keys: &[&str]) -> Result<()>;
}
