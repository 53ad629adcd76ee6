//! Filter editor. Every change publishes a new filter state; widgets refetch
//! only when the state actually differs.

use super::DateRangePicker;
use crate::fetch::{act, update_filters};
use crate::state::DashboardState;
use dioxus::prelude::*;
use mica_core::filters::{parse_optional_id, FilterState, RecordsType};

#[derive(Props, Clone, PartialEq)]
struct IdSelectProps {
    label: &'static str,
    selected: Option<u32>,
    choices: Vec<(u32, String)>,
    onchange: EventHandler<Option<u32>>,
}

/// Select over a loaded option list. "All" clears the filter. A selected id
/// missing from the list still shows, so the control never lies.
#[component]
fn IdSelect(props: IdSelectProps) -> Element {
    let orphan = props
        .selected
        .filter(|id| !props.choices.iter().any(|(choice, _)| choice == id));

    rsx! {
        label {
            style: "font-weight: bold;",
            "{props.label}: "
            select {
                style: "max-width: 220px;",
                onchange: move |evt: Event<FormData>| props.onchange.call(parse_optional_id(&evt.value())),
                option { value: "", selected: props.selected.is_none(), "All" }
                if let Some(id) = orphan {
                    option { value: "{id}", selected: true, "#{id}" }
                }
                for (id, name) in props.choices.iter().cloned() {
                    option {
                        key: "{id}",
                        value: "{id}",
                        selected: props.selected == Some(id),
                        "{name}"
                    }
                }
            }
        }
    }
}

#[component]
pub fn FilterPanel() -> Element {
    let state = use_context::<DashboardState>();
    let (filters, datasets, species, areas) = {
        let dashboard = state.dashboard.read();
        let options = &dashboard.options;
        (
            dashboard.filters().clone(),
            options.datasets.items().iter().map(|d| (d.id, d.name.clone())).collect::<Vec<_>>(),
            options.species.items().iter().map(|s| (s.id, s.name.clone())).collect::<Vec<_>>(),
            options.areas.items().iter().map(|a| (a.id, a.name.clone())).collect::<Vec<_>>(),
        )
    };
    let records = filters.records_type.map(|r| r.as_str()).unwrap_or("");

    let on_records_change = move |evt: Event<FormData>| {
        let records_type = RecordsType::parse(&evt.value());
        update_filters(state, |filters| filters.records_type = records_type);
    };

    let on_reset = move |_| {
        act(state, |dashboard| dashboard.set_filters(FilterState::default()));
    };

    rsx! {
        div {
            style: "margin: 8px 0; padding: 8px; border: 1px solid #e0e0e0; border-radius: 4px;",
            div {
                style: "display: flex; gap: 12px; align-items: center; flex-wrap: wrap;",
                IdSelect {
                    label: "Dataset",
                    selected: filters.dataset_id,
                    choices: datasets,
                    onchange: move |id| update_filters(state, |filters| filters.dataset_id = id),
                }
                IdSelect {
                    label: "Species",
                    selected: filters.species_id,
                    choices: species,
                    onchange: move |id| update_filters(state, |filters| filters.species_id = id),
                }
                IdSelect {
                    label: "Area",
                    selected: filters.area_id,
                    choices: areas,
                    onchange: move |id| update_filters(state, |filters| filters.area_id = id),
                }
                label {
                    style: "font-weight: bold;",
                    "Records: "
                    select {
                        onchange: on_records_change,
                        option { value: "", selected: records.is_empty(), "All" }
                        option {
                            value: RecordsType::Observations.as_str(),
                            selected: records == RecordsType::Observations.as_str(),
                            "Observations"
                        }
                        option {
                            value: RecordsType::Catches.as_str(),
                            selected: records == RecordsType::Catches.as_str(),
                            "Catches"
                        }
                    }
                }
                button {
                    r#type: "button",
                    disabled: filters.is_unfiltered(),
                    onclick: on_reset,
                    "Reset filters"
                }
            }
            DateRangePicker {}
        }
    }
}
