//! Core domain entities
//!
//! All storefront entities are defined here. These are pure data structures
//! with shape normalization logic - no I/O or external dependencies.

mod cart;
pub mod id;
mod order;
mod probe;
mod product;
pub mod records;
pub mod result;
mod review;
mod session;
mod user;
mod wishlist;

pub use cart::{Cart, CartFilter, CartItem};
pub use id::ResourceId;
pub use order::{CarbonReport, LeaderboardEntry, NewOrder, Order};
pub use probe::{ProbeRecord, ProbeState};
pub use product::{Category, Product, ProductQuery};
pub use review::{NewReview, Review, RATING_RANGE};
pub use session::{Session, SessionPhase, SessionState};
pub use user::{Role, User};
pub use wishlist::{EntryTarget, WishlistEntry};
