//! Occurrence monitoring dashboard.
//!
//! Mounted into `#mica-dashboard-root` of a host page that loads OpenLayers
//! (`ol`) and D3 (`d3`) and may define `window.micaDashboardConfig` to point
//! the widgets at its endpoints.
//!
//! Data flow:
//! 1. On mount: read the page configuration (or fall back to the defaults)
//!    and fire the initial requests of every widget.
//! 2. The filter panel publishes new filters; each widget derives its request
//!    and the answers are routed back by ticket, stale ones are dropped.
//! 3. Map changes are queued as commands and replayed by `map.js`.

use dioxus::prelude::*;
use mica_core::config::DashboardConfig;
use mica_dashboard_ui::components::{
    ColorLegend, ErrorDisplay, FilterPanel, HistogramChart, MapControls, MapPanel,
    OccurrenceCounter, ResultsTable,
};
use mica_dashboard_ui::fetch::act;
use mica_dashboard_ui::js_bridge;
use mica_dashboard_ui::state::DashboardState;

fn main() {
    dioxus_logger::init(dioxus_logger::tracing::Level::INFO).expect("failed to init logger");
    dioxus::LaunchBuilder::new()
        .with_cfg(dioxus::web::Config::new().rootname("mica-dashboard-root"))
        .launch(App);
}

/// The page configuration, or the defaults plus the reason it was rejected.
fn load_config() -> (DashboardConfig, Option<String>) {
    match js_bridge::page_config_json() {
        None => (DashboardConfig::default(), None),
        Some(json) => match DashboardConfig::from_json(&json) {
            Ok(config) => (config, None),
            Err(e) => {
                log::error!("Ignoring page configuration: {}", e);
                (DashboardConfig::default(), Some(e.to_string()))
            }
        },
    }
}

#[component]
fn App() -> Element {
    let state = use_context_provider(|| {
        let (config, problem) = load_config();
        DashboardState::new(config, problem)
    });

    // ─── Mount: load the map/chart scripts and fetch everything once ───
    use_effect(move || {
        js_bridge::init_scripts();
        act(state, |dashboard| dashboard.initial_requests());
    });

    rsx! {
        div {
            style: "max-width: 1100px; margin: 0 auto; padding: 8px; font-family: system-ui, -apple-system, sans-serif;",

            if let Some(err) = state.error_msg.read().as_ref() {
                ErrorDisplay { title: "Configuration".to_string(), message: err.clone() }
            }

            FilterPanel {}
            OccurrenceCounter {}

            div {
                style: "display: grid; grid-template-columns: 1fr; gap: 8px;",
                MapControls {}
                MapPanel {}
                ColorLegend {}
            }

            HistogramChart {}

            h3 { style: "margin: 16px 0 8px 0; font-size: 16px;", "Occurrences" }
            ResultsTable {}
        }
    }
}
