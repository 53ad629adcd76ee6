//! The OpenLayers map and its event loop.

use crate::fetch::{act, flush_map};
use crate::js_bridge;
use crate::state::DashboardState;
use dioxus::prelude::*;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::{Map, Value};

/// DOM id of the map container.
const MAP_CONTAINER_ID: &str = "mica-map";

/// Events forwarded by `micaMapEvents` in `map.js`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum MapEvent {
    /// The view settled at a (possibly fractional) zoom level.
    Zoom { zoom: f64 },
    /// A single click with the attributes of the features under the pointer.
    Click {
        zoom: f64,
        coordinate: [f64; 2],
        #[serde(default)]
        features: Vec<Map<String, Value>>,
    },
}

fn zoom_level(zoom: f64) -> u8 {
    zoom.clamp(0.0, f64::from(u8::MAX)) as u8
}

#[component]
pub fn MapPanel(#[props(default = 500)] height: u32) -> Element {
    let state = use_context::<DashboardState>();

    // Create the map once, then push the initial layer stack.
    use_effect(move || {
        let config = state.dashboard.peek().config().clone();
        js_bridge::init_map(MAP_CONTAINER_ID, &config);
        flush_map(state);
    });

    use_future(move || async move {
        let mut events = document::eval(js_bridge::MAP_EVENTS_JS);
        loop {
            match events.recv::<MapEvent>().await {
                Ok(MapEvent::Zoom { zoom }) => {
                    let level = zoom_level(zoom.round());
                    act(state, |dashboard| dashboard.map.set_zoom(level));
                }
                Ok(MapEvent::Click { zoom, coordinate, features }) => {
                    let popup = state
                        .dashboard
                        .peek()
                        .map
                        .click(zoom_level(zoom.floor()), coordinate, &features);
                    match popup {
                        Some(popup) => {
                            debug!("Popup with {} feature(s)", popup.features.len());
                            js_bridge::show_popup(&popup);
                        }
                        None => js_bridge::hide_popup(),
                    }
                }
                Err(e) => {
                    warn!("Map event channel closed: {:?}", e);
                    break;
                }
            }
        }
    });

    let style = format!("height: {}px; width: 100%;", height);
    rsx! {
        div {
            id: MAP_CONTAINER_ID,
            class: "map",
            style: "{style}",
        }
    }
}
