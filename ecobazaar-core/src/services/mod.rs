//! Service layer - session and resource synchronization
//!
//! Services coordinate domain logic and port interactions. The access layer
//! (`ApiClient`) sits under everything; the session manager owns identity;
//! the caches mirror per-user server collections.

mod cache;
mod carbon;
mod cart;
mod catalog;
mod dashboard;
pub mod endpoint;
mod http;
mod orders;
pub mod persisted;
mod reviews;
mod session;
mod session_handle;
mod wishlist;

pub use cache::LoadOutcome;
pub use carbon::CarbonService;
pub use cart::{CartService, CartState};
pub use catalog::CatalogService;
pub use dashboard::{Audience, DashboardService};
pub use endpoint::{Candidate, EndpointResolver, Probe};
pub use http::{ApiClient, PublicRoutes};
pub use orders::OrderService;
pub use persisted::{token_fingerprint, PersistedSession};
pub use reviews::ReviewService;
pub use session::{RegisterOutcome, SessionManager};
pub use session_handle::SessionHandle;
pub use wishlist::{WishlistChange, WishlistService, WishlistState};
