//! Wishlist cache
//!
//! Same load/mutate/reload discipline as the cart. Removal goes through the
//! [`EndpointResolver`] because the server route for it differs between
//! deployments. Entries may arrive bare (`{id, productId}`) or with the
//! product embedded; bare entries are hydrated from `/products/{id}` during
//! load when possible.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info, warn};

use super::cache::{CacheSlot, LoadOutcome};
use super::endpoint::EndpointResolver;
use super::http::ApiClient;
use super::session_handle::SessionHandle;
use crate::domain::result::{Error, Result};
use crate::domain::records::decode_each;
use crate::domain::{EntryTarget, ProbeRecord, Product, ResourceId, WishlistEntry};
use crate::ports::{path_segment, ApiRequest};

const LOGIN_REQUIRED: &str = "Please log in to manage your wishlist";
const UPDATE_FAILED: &str = "Failed to update wishlist";
const REMOVE_FAILED: &str = "Failed to remove from wishlist";

/// UI view of the wishlist cache
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WishlistState {
    pub wishlist: Vec<WishlistEntry>,
    pub loading: bool,
    pub error: Option<String>,
}

/// What a toggle did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WishlistChange {
    Added,
    Removed,
}

pub struct WishlistService {
    api: Arc<ApiClient>,
    session: Arc<SessionHandle>,
    resolver: EndpointResolver,
    slot: Mutex<CacheSlot<Vec<WishlistEntry>>>,
    last_probe: Mutex<Vec<ProbeRecord>>,
}

impl WishlistService {
    pub fn new(api: Arc<ApiClient>, session: Arc<SessionHandle>) -> Self {
        Self::with_resolver(api, session, EndpointResolver::wishlist_removal())
    }

    pub fn with_resolver(
        api: Arc<ApiClient>,
        session: Arc<SessionHandle>,
        resolver: EndpointResolver,
    ) -> Self {
        Self {
            api,
            session,
            resolver,
            slot: Mutex::new(CacheSlot::default()),
            last_probe: Mutex::new(Vec::new()),
        }
    }

    fn slot(&self) -> MutexGuard<'_, CacheSlot<Vec<WishlistEntry>>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn fetch(&self, user_id: &ResourceId) -> Result<Vec<WishlistEntry>> {
        let body = self
            .api
            .send(ApiRequest::get(format!("/wishlist/{}", path_segment(user_id))))
            .await?;
        let records: Vec<JsonValue> = match body {
            JsonValue::Null => Vec::new(),
            body => serde_json::from_value(body)?,
        };
        let (mut entries, rejected) = decode_each(records, WishlistEntry::from_json);
        for record in &rejected {
            warn!("Skipping unreadable wishlist entry {}: {}", record.index, record.reason);
        }

        for entry in entries.iter_mut() {
            let EntryTarget::Bare(product_id) = &entry.target else {
                continue;
            };
            let product_id = product_id.clone();
            let path = format!("/products/{}", path_segment(&product_id));
            match self.api.get_json::<Product>(path).await {
                Ok(product) => entry.hydrate(product),
                Err(e) => warn!("Failed to fetch product {}: {}", product_id, e),
            }
        }
        Ok(entries)
    }

    /// Fetch the wishlist of the current user and replace the cache
    pub async fn load(&self) -> LoadOutcome {
        self.session.ready().await;
        let Some((generation, user_id)) = self.session.identity() else {
            return LoadOutcome::Skipped;
        };

        let ticket = {
            let mut slot = self.slot();
            slot.clear_error();
            slot.begin(generation)
        };
        let (value, error, outcome) = match self.fetch(&user_id).await {
            Ok(entries) => (Some(entries), None, LoadOutcome::Loaded),
            Err(e) if e.is_auth_failure() => {
                warn!("Wishlist access denied, user may need to log in again: {}", e);
                (None, None, LoadOutcome::Cleared)
            }
            Err(e) => {
                warn!("Failed to load wishlist: {}", e);
                (
                    None,
                    Some("Failed to load wishlist".to_string()),
                    LoadOutcome::Failed,
                )
            }
        };

        let current = self.session.generation();
        // a 401 tears the session down while this load is in flight; the
        // cache ends up empty either way
        if self.slot().settle(ticket, current, value, error) || outcome == LoadOutcome::Cleared {
            outcome
        } else {
            debug!("Dropping wishlist response for a superseded load");
            LoadOutcome::Discarded
        }
    }

    pub async fn reload(&self) -> LoadOutcome {
        self.load().await
    }

    /// Entries visible to the current session
    pub fn entries(&self) -> Vec<WishlistEntry> {
        let generation = self.session.generation();
        self.slot().value(generation).cloned().unwrap_or_default()
    }

    /// Whether `product_id` is on the wishlist, whichever shape its entry has
    pub fn contains(&self, product_id: &ResourceId) -> bool {
        let generation = self.session.generation();
        self.slot()
            .value(generation)
            .is_some_and(|entries| entries.iter().any(|e| e.refers_to(product_id)))
    }

    fn entry(&self, entry_id: &ResourceId) -> Option<WishlistEntry> {
        self.entries()
            .into_iter()
            .find(|e| e.entry_id.as_ref() == Some(entry_id))
    }

    /// Product behind an entry: the embedded one, or a stub carrying the id
    pub fn product_for_entry(&self, entry_id: &ResourceId) -> Option<Product> {
        self.entry(entry_id).map(|entry| match entry.target.product() {
            Some(product) => product.clone(),
            None => Product::new(entry.product_id().clone()),
        })
    }

    pub fn state(&self) -> WishlistState {
        let generation = self.session.generation();
        let slot = self.slot();
        WishlistState {
            wishlist: slot.value(generation).cloned().unwrap_or_default(),
            loading: slot.loading(),
            error: slot.error(generation).map(str::to_string),
        }
    }

    pub fn error(&self) -> Option<String> {
        let generation = self.session.generation();
        self.slot().error(generation).map(str::to_string)
    }

    pub fn clear_error(&self) {
        self.slot().clear_error();
    }

    /// Forget the cached wishlist locally (no server call)
    pub fn clear(&self) {
        self.slot().reset();
    }

    /// Trace of the most recent removal attempt
    pub fn last_probe_trace(&self) -> Vec<ProbeRecord> {
        self.last_probe
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_error(&self, message: &str) {
        let generation = self.session.generation();
        self.slot().set_error(generation, message);
    }

    /// Current user id, or the login error recorded for the UI
    async fn require_user(&self) -> Result<ResourceId> {
        self.session.ready().await;
        match self.session.identity() {
            Some((_, user_id)) => {
                self.clear_error();
                Ok(user_id)
            }
            None => {
                self.set_error(LOGIN_REQUIRED);
                Err(Error::not_authenticated(LOGIN_REQUIRED))
            }
        }
    }

    fn fail<T>(&self, error: Error, fallback: &str) -> Result<T> {
        warn!("Wishlist update failed: {}", error);
        self.set_error(&error.user_message(fallback));
        Err(error)
    }

    async fn add_remote(&self, user_id: &ResourceId, product_id: &ResourceId) -> Result<()> {
        let request = ApiRequest::post(format!("/wishlist/{}", path_segment(user_id)))
            .json(json!({ "productId": product_id }));
        self.api.send(request).await.map(|_| ())
    }

    async fn remove_remote(&self, user_id: &ResourceId, product_id: &ResourceId) -> Result<()> {
        let probe = self.resolver.resolve(&self.api, user_id, product_id).await;
        *self.last_probe.lock().unwrap_or_else(PoisonError::into_inner) = probe.trace;
        let adopted = probe.outcome?;
        debug!("Removed product {} via {} shape", product_id, adopted);
        Ok(())
    }

    /// Reload after a removal and report entries the server kept anyway
    async fn reload_after_removal(&self, product_id: &ResourceId) {
        if self.load().await == LoadOutcome::Loaded && self.contains(product_id) {
            warn!(
                "Product {} is still on the wishlist after a successful removal call",
                product_id
            );
        }
    }

    /// Add the product if absent, remove it if present, then reload
    pub async fn toggle(&self, product_id: impl Into<ResourceId>) -> Result<WishlistChange> {
        let user_id = self.require_user().await?;
        let product_id = product_id.into();

        if self.contains(&product_id) {
            info!("Removing product {} from wishlist", product_id);
            if let Err(e) = self.remove_remote(&user_id, &product_id).await {
                return self.fail(e, UPDATE_FAILED);
            }
            self.reload_after_removal(&product_id).await;
            Ok(WishlistChange::Removed)
        } else {
            info!("Adding product {} to wishlist", product_id);
            if let Err(e) = self.add_remote(&user_id, &product_id).await {
                return self.fail(e, UPDATE_FAILED);
            }
            self.load().await;
            Ok(WishlistChange::Added)
        }
    }

    pub async fn add(&self, product_id: impl Into<ResourceId>) -> Result<()> {
        let user_id = self.require_user().await?;
        let product_id = product_id.into();
        if let Err(e) = self.add_remote(&user_id, &product_id).await {
            return self.fail(e, UPDATE_FAILED);
        }
        self.load().await;
        Ok(())
    }

    /// Remove by product id
    pub async fn remove_product(&self, product_id: impl Into<ResourceId>) -> Result<()> {
        let user_id = self.require_user().await?;
        let product_id = product_id.into();
        if let Err(e) = self.remove_remote(&user_id, &product_id).await {
            return self.fail(e, REMOVE_FAILED);
        }
        self.reload_after_removal(&product_id).await;
        Ok(())
    }

    /// Remove by wishlist entry id, resolved against the current cache
    pub async fn remove_entry(&self, entry_id: impl Into<ResourceId>) -> Result<()> {
        let user_id = self.require_user().await?;
        let entry_id = entry_id.into();
        let Some(entry) = self.entry(&entry_id) else {
            return self.fail(
                Error::not_found(format!("Wishlist item {}", entry_id)),
                REMOVE_FAILED,
            );
        };
        let product_id = entry.product_id().clone();

        info!("Removing wishlist entry {} (product {})", entry_id, product_id);
        if let Err(e) = self.remove_remote(&user_id, &product_id).await {
            return self.fail(e, REMOVE_FAILED);
        }
        self.reload_after_removal(&product_id).await;
        Ok(())
    }

    /// Ask the server whether `product_id` is on the wishlist. Does not touch
    /// the cache; an answer in an unknown shape falls back to the cached view.
    pub async fn check(&self, product_id: impl Into<ResourceId>) -> Result<bool> {
        let user_id = self.require_user().await?;
        let product_id = product_id.into();
        let request = ApiRequest::get(format!(
            "/wishlist/{}/check/{}",
            path_segment(&user_id),
            path_segment(&product_id)
        ));
        match check_answer(&self.api.send(request).await?) {
            Some(present) => Ok(present),
            None => {
                warn!("Unrecognized wishlist check answer for product {}", product_id);
                Ok(self.contains(&product_id))
            }
        }
    }
}

/// `true`, `{"inWishlist": true}` and similar
fn check_answer(body: &JsonValue) -> Option<bool> {
    match body {
        JsonValue::Bool(present) => Some(*present),
        JsonValue::Object(fields) => ["inWishlist", "isInWishlist", "exists", "present"]
            .iter()
            .find_map(|key| fields.get(*key))
            .and_then(check_answer),
        JsonValue::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
