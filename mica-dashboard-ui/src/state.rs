//! Application state managed via Dioxus context.
//!
//! `DashboardState` wraps the core [`Dashboard`] in a signal and is provided
//! with `use_context_provider`. Child components retrieve it with
//! `use_context::<DashboardState>()`.

use mica_core::config::DashboardConfig;
use mica_core::dashboard::Dashboard;
use dioxus::prelude::*;

/// Shared state for every dashboard widget.
#[derive(Clone, Copy)]
pub struct DashboardState {
    /// Filters, widget states and the map layer stack
    pub dashboard: Signal<Dashboard>,
    /// Configuration problem reported at startup
    pub error_msg: Signal<Option<String>>,
}

impl DashboardState {
    pub fn new(config: DashboardConfig, startup_error: Option<String>) -> Self {
        Self {
            dashboard: Signal::new(Dashboard::new(config)),
            error_msg: Signal::new(startup_error),
        }
    }
}
