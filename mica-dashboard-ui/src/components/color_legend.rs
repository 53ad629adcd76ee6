//! Legend for the aggregated hexagon layer.

use super::ErrorDisplay;
use crate::state::DashboardState;
use dioxus::prelude::*;
use mica_core::count::group_thousands;
use mica_core::layers::DataLayerKind;
use mica_core::load_state::LoadState;
use mica_core::zoom::hex_size_caption;

const LEGEND_TICKS: usize = 5;

#[component]
pub fn ColorLegend() -> Element {
    let state = use_context::<DashboardState>();
    let dashboard = state.dashboard.read();
    let map = &dashboard.map;
    if map.visible_layer() != DataLayerKind::Choropleth {
        return rsx! {};
    }
    let scale = map.style().scale;
    let hex_size = hex_size_caption(map.zoom());
    let empty = matches!(map.min_max(), LoadState::Empty);
    let error = map.min_max().error().map(str::to_string);
    drop(dashboard);

    let swatches: Vec<(String, String)> = scale
        .ticks(LEGEND_TICKS)
        .into_iter()
        .map(|(value, color)| {
            let style = format!(
                "flex: 1; padding: 2px 6px; text-align: center; font-size: 11px; background: {}; color: {};",
                color,
                color.legible_text_color()
            );
            (style, group_thousands(value.round() as u64))
        })
        .collect();

    rsx! {
        div {
            style: "margin: 4px 0;",
            if let Some(message) = error {
                ErrorDisplay { title: "Could not load the count range".to_string(), message }
            }
            if empty {
                p { style: "font-size: 12px; color: #666;", "No hexagon contains occurrences at this zoom level." }
            } else {
                div {
                    style: "display: flex; border: 1px solid #ccc;",
                    for (style, label) in swatches {
                        span { style: "{style}", "{label}" }
                    }
                }
            }
            p {
                style: "font-size: 11px; color: #888; margin: 2px 0;",
                "Occurrences per hexagon, hexagon size {hex_size}"
            }
        }
    }
}
