//! services/client/src/adapters/navigator.rs
//!
//! A `Navigator` for headless hosts: there is no screen to switch, so the
//! redirect is recorded in the log for whoever drives the client.

use academic_search_core::ports::Navigator;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct LogNavigator {
    login_route: String,
}

impl LogNavigator {
    pub fn new(login_route: impl Into<String>) -> Self {
        Self {
            login_route: login_route.into(),
        }
    }
}

impl Navigator for LogNavigator {
    fn redirect_to_login(&self) {
        warn!("Session cleared; sign in again at {}", self.login_route);
    }
}
