//! Navigation hook invoked when a session ends

use std::sync::Mutex;
use tracing::info;

/// Receives the route the user should be sent to after session teardown
pub trait Navigator: Send + Sync + std::fmt::Debug {
    /// Navigate to `route`
    fn navigate(&self, route: &str);
}

/// Navigator that only records the redirect in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: &str) {
        info!(route, "Session ended, returning to entry route");
    }
}

/// Test double that remembers every route it was asked to visit
///
/// Lets tests assert that a teardown redirected exactly once and where to.
/// Applications use `LogNavigator` or their own `Navigator`.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes visited so far, oldest first
    pub fn routes(&self) -> Vec<String> {
        self.routes
            .lock()
            .map(|routes| routes.clone())
            .unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.push(route.to_string());
        }
    }
}
