//! Navigation side effects of session transitions.

use std::fmt;
use std::sync::Mutex;

use log::info;

/// Views the session context navigates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Receives one navigation per session transition.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Navigator that only logs, for headless front ends.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: Route) {
        info!("navigate to {}", route);
    }
}

/// Navigator that remembers every navigation.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<Route> {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn last(&self) -> Option<Route> {
        self.history().last().copied()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(route);
    }
}
