//! Per-user cache slot shared by the cart and wishlist caches
//!
//! A slot remembers the session generation its value was loaded under.
//! Reads pass the current generation and see nothing when it differs, so a
//! torn-down session can never leak into the next one. Every load takes a
//! ticket; only the most recent ticket of the still-current generation may
//! write its result.

use serde::Serialize;

/// What a `load()` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOutcome {
    /// No signed-in user, nothing fetched
    Skipped,
    /// Fresh data stored
    Loaded,
    /// 401/403 from the server: cache emptied, no error shown
    Cleared,
    /// Any other failure: cache emptied, error set
    Failed,
    /// The result arrived for a superseded session or load and was dropped
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LoadTicket {
    generation: u64,
    seq: u64,
}

#[derive(Debug)]
pub(crate) struct CacheSlot<T> {
    value: Option<T>,
    owner: u64,
    error: Option<(u64, String)>,
    loading: bool,
    issued: u64,
}

impl<T> Default for CacheSlot<T> {
    fn default() -> Self {
        Self {
            value: None,
            owner: 0,
            error: None,
            loading: false,
            issued: 0,
        }
    }
}

impl<T> CacheSlot<T> {
    pub(crate) fn begin(&mut self, generation: u64) -> LoadTicket {
        self.issued += 1;
        self.loading = true;
        LoadTicket {
            generation,
            seq: self.issued,
        }
    }

    /// Store a load result. Returns false when the ticket is stale.
    pub(crate) fn settle(
        &mut self,
        ticket: LoadTicket,
        current_generation: u64,
        value: Option<T>,
        error: Option<String>,
    ) -> bool {
        if ticket.seq != self.issued {
            return false;
        }
        self.loading = false;
        if ticket.generation != current_generation {
            self.value = None;
            self.error = None;
            return false;
        }
        self.value = value;
        self.owner = ticket.generation;
        self.error = error.map(|e| (ticket.generation, e));
        true
    }

    pub(crate) fn value(&self, current_generation: u64) -> Option<&T> {
        if self.owner == current_generation {
            self.value.as_ref()
        } else {
            None
        }
    }

    pub(crate) fn error(&self, current_generation: u64) -> Option<&str> {
        match &self.error {
            Some((generation, message)) if *generation == current_generation => Some(message),
            _ => None,
        }
    }

    pub(crate) fn set_error(&mut self, current_generation: u64, message: impl Into<String>) {
        self.error = Some((current_generation, message.into()));
    }

    pub(crate) fn clear_error(&mut self) {
        self.error = None;
    }

    pub(crate) fn loading(&self) -> bool {
        self.loading
    }

    /// Drop everything, including any load still in flight
    pub(crate) fn reset(&mut self) {
        self.value = None;
        self.error = None;
        self.loading = false;
        self.issued += 1;
    }
}
