//! Navigator port - the UI location

/// Current route of the hosting UI and the ability to move it
pub trait Navigator: Send + Sync {
    /// Current route, e.g. `/products/7`
    fn current_route(&self) -> String;

    /// Send the user to `route`
    fn navigate(&self, route: &str);
}
