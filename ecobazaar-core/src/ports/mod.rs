//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The core depends
//! only on these traits: where the session is persisted, how bytes reach the
//! backend and where the UI currently is.

mod navigator;
mod session_store;
mod transport;

pub use navigator::Navigator;
pub use session_store::SessionStore;
pub use transport::{path_segment, ApiRequest, ApiResponse, HttpMethod, Transport, TransportFailure};
