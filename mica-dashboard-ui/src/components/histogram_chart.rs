//! Monthly occurrence histogram rendered with D3.

use super::{ChartContainer, ErrorDisplay};
use crate::js_bridge;
use crate::state::DashboardState;
use dioxus::prelude::*;
use mica_core::histogram::HistogramMode;
use mica_core::load_state::LoadState;

/// DOM id for the D3 chart container div.
const HISTOGRAM_CONTAINER_ID: &str = "mica-histogram";

fn mode_caption(mode: HistogramMode) -> String {
    match mode {
        HistogramMode::SinceFirstRecord => "Occurrences per month since the first record".to_string(),
        HistogramMode::Lookback { months } => format!("Occurrences per month, last {} months", months),
    }
}

#[component]
pub fn HistogramChart() -> Element {
    let state = use_context::<DashboardState>();
    let series_state = use_memo(move || state.dashboard.read().histogram.state().clone());
    let mode = state.dashboard.peek().histogram.mode();

    // Re-render only when the series itself changes.
    use_effect(move || match &*series_state.read() {
        LoadState::Loaded(series) => {
            let data_json = serde_json::to_string(series).unwrap_or_default();
            let config_json = serde_json::json!({
                "color": "#3182bd",
                "yAxisLabel": "Occurrences",
            })
            .to_string();
            js_bridge::render_histogram(HISTOGRAM_CONTAINER_ID, &data_json, &config_json);
        }
        LoadState::Empty | LoadState::Idle => js_bridge::destroy_histogram(HISTOGRAM_CONTAINER_ID),
        LoadState::Loading { .. } | LoadState::Failed { .. } => {}
    });

    let current = series_state();
    let total = current.value().map(|series| series.total());
    let caption = match total {
        Some(total) => format!("{} ({} in total)", mode_caption(mode), total),
        None => mode_caption(mode),
    };

    rsx! {
        div {
            style: "margin: 16px 0;",
            div {
                style: "display: flex; align-items: baseline; gap: 12px; margin-bottom: 4px;",
                h3 { style: "margin: 0; font-size: 16px;", "Monthly occurrences" }
                span { style: "font-size: 12px; color: #666;", "{caption}" }
            }
            if let Some(message) = current.error() {
                ErrorDisplay { title: "Could not load the histogram".to_string(), message: message.to_string() }
            }
            ChartContainer {
                id: HISTOGRAM_CONTAINER_ID.to_string(),
                loading: current.is_loading(),
                empty: matches!(current, LoadState::Empty),
            }
        }
    }
}
