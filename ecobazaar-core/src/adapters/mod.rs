//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - reqwest HTTP client for the Transport port
//! - Scripted transport with canned replies (tests, offline demos)
//! - JSON file under an advisory lock for the SessionStore port
//! - In-memory SessionStore and Navigator

pub mod file_store;
pub mod memory_store;
pub mod navigator;
pub mod reqwest_transport;
pub mod scripted;

#[cfg(test)]
pub mod mock_server;

pub use file_store::FileSessionStore;
pub use memory_store::MemorySessionStore;
pub use navigator::MemoryNavigator;
pub use reqwest_transport::ReqwestTransport;
pub use scripted::{Gate, ScriptedTransport};
