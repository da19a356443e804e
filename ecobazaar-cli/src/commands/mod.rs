//! CLI command implementations

pub mod auth;
pub mod carbon;
pub mod cart;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod wishlist;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use ecobazaar_core::adapters::MemoryNavigator;
use ecobazaar_core::{ActionResult, StorefrontContext};

use crate::output;

/// Get the data directory from environment or default
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("ECOBAZAAR_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".ecobazaar"))
        .context("Could not find home directory (set ECOBAZAAR_DIR)")
}

/// A restored storefront context plus the route the command "is on"
pub struct App {
    pub ctx: StorefrontContext,
    navigator: Arc<MemoryNavigator>,
}

impl App {
    /// Build the context and restore the stored session.
    ///
    /// `route` is the storefront page the command corresponds to; a forced
    /// logout only redirects away from non-public routes.
    pub async fn open(route: &str) -> Result<Self> {
        let data_dir = get_data_dir()?;
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

        let navigator = Arc::new(MemoryNavigator::new(route));
        let ctx = StorefrontContext::new(&data_dir, navigator.clone())
            .context("Failed to initialize storefront context")?;
        ctx.restore().await;
        Ok(Self { ctx, navigator })
    }

    /// Tell the user when the server ended the session during this command
    pub fn report_redirects(&self) {
        if let Some(route) = self.navigator.redirects().last() {
            output::warning(&format!(
                "Your session has expired. Please log in again (redirected to {}).",
                route
            ));
        }
    }

    /// Fail with the login hint unless a session exists
    pub fn require_user(&self) -> Result<()> {
        if self.ctx.session.state().is_authenticated {
            Ok(())
        } else {
            anyhow::bail!("Not logged in. Run `eb login <email>` first.")
        }
    }
}

/// Turn a failed action into a command error, keeping the server message
pub fn check<T>(result: ActionResult<T>) -> Result<Option<T>> {
    if result.success {
        Ok(result.data)
    } else {
        anyhow::bail!(result.error.unwrap_or_else(|| "Request failed".to_string()))
    }
}
