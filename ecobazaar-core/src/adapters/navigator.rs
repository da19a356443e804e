//! In-memory navigator
//!
//! Stands in for the UI location: the CLI keeps its notional route here and
//! tests read back the redirects the access layer issued.

use std::sync::{Mutex, PoisonError, RwLock};

use crate::ports::Navigator;

#[derive(Debug)]
pub struct MemoryNavigator {
    route: RwLock<String>,
    redirects: Mutex<Vec<String>>,
}

impl MemoryNavigator {
    pub fn new(route: &str) -> Self {
        Self {
            route: RwLock::new(route.to_string()),
            redirects: Mutex::new(Vec::new()),
        }
    }

    /// Move without recording a redirect (the user navigated)
    pub fn set_route(&self, route: &str) {
        *self.route.write().unwrap_or_else(PoisonError::into_inner) = route.to_string();
    }

    /// Routes the access layer redirected to, oldest first
    pub fn redirects(&self) -> Vec<String> {
        self.redirects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn current_route(&self) -> String {
        self.route
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn navigate(&self, route: &str) {
        self.set_route(route);
        self.redirects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route.to_string());
    }
}
