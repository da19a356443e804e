//! EcoBazaar Core - session and resource synchronization for the storefront
//!
//! This crate implements the client core following hexagonal architecture:
//!
//! - **domain**: Core entities (User, Session, Cart, WishlistEntry, etc.)
//! - **ports**: Trait definitions for external dependencies (Transport, SessionStore, Navigator)
//! - **services**: Access layer, session manager, resource caches
//! - **adapters**: Concrete implementations (reqwest, session file, in-memory)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use adapters::{FileSessionStore, MemoryNavigator, ReqwestTransport};
use config::Config;
use ports::{Navigator, SessionStore, Transport};
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{ActionResult, Error};
pub use domain::{
    Cart, CartItem, Product, ResourceId, Role, SessionPhase, SessionState, User, WishlistEntry,
};

/// Main context for storefront operations
///
/// Holds one shared session and every service built on top of it. UI code
/// receives this (or the individual services) explicitly; nothing is global.
pub struct StorefrontContext {
    pub config: Config,
    pub session_handle: Arc<SessionHandle>,
    pub api: Arc<ApiClient>,
    pub session: SessionManager,
    pub cart: Arc<CartService>,
    pub wishlist: WishlistService,
    pub catalog: CatalogService,
    pub orders: OrderService,
    pub carbon: CarbonService,
    pub reviews: ReviewService,
    pub dashboard: DashboardService,
}

impl StorefrontContext {
    /// Create a context backed by the session file in `data_dir` and the
    /// configured HTTP backend
    pub fn new(data_dir: &Path, navigator: Arc<dyn Navigator>) -> Result<Self> {
        let config = Config::load(data_dir)?;
        let store = Arc::new(FileSessionStore::new(data_dir)?);
        let transport = Arc::new(ReqwestTransport::new(&config.api_base_url, config.timeout())?);
        Ok(Self::with_parts(config, store, transport, navigator)?)
    }

    /// Assemble a context from explicit parts
    pub fn with_parts(
        config: Config,
        store: Arc<dyn SessionStore>,
        transport: Arc<dyn Transport>,
        navigator: Arc<dyn Navigator>,
    ) -> domain::result::Result<Self> {
        let session_handle = Arc::new(SessionHandle::new());
        let persisted = PersistedSession::new(store);
        let api = Arc::new(ApiClient::new(
            transport,
            persisted.clone(),
            Arc::clone(&session_handle),
            navigator,
            &config,
        )?);
        debug!("Storefront context using {} transport", api.transport_name());

        let session = SessionManager::new(Arc::clone(&api), persisted, Arc::clone(&session_handle));
        let cart = Arc::new(CartService::new(Arc::clone(&api), Arc::clone(&session_handle)));
        let wishlist = WishlistService::new(Arc::clone(&api), Arc::clone(&session_handle));
        let catalog = CatalogService::new(Arc::clone(&api), Arc::clone(&session_handle));
        let orders = OrderService::new(
            Arc::clone(&api),
            Arc::clone(&session_handle),
            Arc::clone(&cart),
        );
        let carbon = CarbonService::new(Arc::clone(&api), Arc::clone(&session_handle));
        let reviews = ReviewService::new(Arc::clone(&api), Arc::clone(&session_handle));
        let dashboard = DashboardService::new(Arc::clone(&api), Arc::clone(&session_handle));

        Ok(Self {
            config,
            session_handle,
            api,
            session,
            cart,
            wishlist,
            catalog,
            orders,
            carbon,
            reviews,
            dashboard,
        })
    }

    /// In-process context for tests and offline use: memory store, `/` route
    pub fn in_memory(transport: Arc<dyn Transport>) -> domain::result::Result<Self> {
        Self::with_parts(
            Config::default(),
            Arc::new(adapters::MemorySessionStore::new()),
            transport,
            Arc::new(MemoryNavigator::default()),
        )
    }

    /// Restore the persisted session, then load both caches for its user
    pub async fn restore(&self) -> SessionPhase {
        let phase = self.session.restore();
        if phase == SessionPhase::Authenticated {
            self.sync_caches().await;
        }
        phase
    }

    /// Reload cart and wishlist for the current user
    pub async fn sync_caches(&self) -> (LoadOutcome, LoadOutcome) {
        tokio::join!(self.cart.load(), self.wishlist.load())
    }

    /// Log in and load the new user's caches
    pub async fn login(&self, email: &str, password: &str) -> ActionResult<User> {
        let result = self.session.login(email, password).await;
        if result.success {
            self.sync_caches().await;
        }
        result
    }

    /// Register; when the backend signs the new account in, load its caches
    pub async fn register(&self, profile: serde_json::Value) -> ActionResult<RegisterOutcome> {
        let result = self.session.register(profile).await;
        if matches!(result.data, Some(RegisterOutcome::SignedIn(_))) {
            self.sync_caches().await;
        }
        result
    }

    /// Log out and drop every per-user cache
    pub fn logout(&self) {
        self.session.logout();
        self.cart.clear_cart();
        self.wishlist.clear();
    }
}
