//! Data layer selector, opacity slider and counter toggle.

use crate::fetch::mutate;
use crate::state::DashboardState;
use dioxus::prelude::*;
use log::warn;
use mica_core::layers::DataLayerKind;

#[component]
pub fn MapControls() -> Element {
    let state = use_context::<DashboardState>();
    let (visible, opacity, show_counters) = {
        let dashboard = state.dashboard.read();
        (
            dashboard.map.visible_layer(),
            dashboard.map.opacity(),
            dashboard.map.style().show_counters,
        )
    };

    let on_layer_change = move |evt: Event<FormData>| match evt.value().parse::<DataLayerKind>() {
        Ok(kind) => mutate(state, |dashboard| {
            if let Err(e) = dashboard.map.set_visible_layer(kind) {
                warn!("{}", e);
            }
        }),
        Err(e) => warn!("{}", e),
    };

    let on_opacity_change = move |evt: Event<FormData>| {
        if let Ok(opacity) = evt.value().parse::<f64>() {
            mutate(state, |dashboard| dashboard.map.set_opacity(opacity));
        }
    };

    let on_counters_change = move |evt: Event<FormData>| {
        let show = evt.checked();
        mutate(state, |dashboard| dashboard.map.set_show_counters(show));
    };

    rsx! {
        div {
            style: "margin: 8px 0; display: flex; gap: 16px; align-items: center; flex-wrap: wrap;",
            label {
                style: "font-weight: bold;",
                "Display: "
                select {
                    onchange: on_layer_change,
                    for kind in DataLayerKind::ALL {
                        option {
                            value: kind.name(),
                            selected: kind == visible,
                            {kind.label()}
                        }
                    }
                }
            }
            label {
                style: "font-weight: bold;",
                "Opacity: "
                input {
                    r#type: "range",
                    min: "0",
                    max: "1",
                    step: "0.05",
                    value: "{opacity}",
                    oninput: on_opacity_change,
                }
            }
            if visible == DataLayerKind::Choropleth {
                label {
                    input {
                        r#type: "checkbox",
                        checked: show_counters,
                        onchange: on_counters_change,
                    }
                    " Show counters"
                }
            }
        }
    }
}
