//! Paginated occurrence table. Sorting and paging happen on the server.

use super::{ErrorDisplay, LoadingSpinner};
use crate::fetch::act;
use crate::state::DashboardState;
use dioxus::prelude::*;
use log::warn;
use mica_core::load_state::LoadState;
use mica_core::occurrence::OccurrenceRecord;
use mica_core::table::{Column, PageNav, COLUMNS};

const HEADER_STYLE: &str = "text-align: left; padding: 4px 8px; background: #343a40;";
const CELL_STYLE: &str = "padding: 4px 8px; border-bottom: 1px solid #eee;";

#[component]
fn OccurrenceRow(record: OccurrenceRecord) -> Element {
    let (lat, lon) = record.display_coordinates();
    rsx! {
        tr {
            th { scope: "row", style: "{CELL_STYLE}", "{record.id}" }
            td { style: "{CELL_STYLE}", "{lat}" }
            td { style: "{CELL_STYLE}", "{lon}" }
            td { style: "{CELL_STYLE}", "{record.date}" }
            td { style: "{CELL_STYLE}", "{record.species_name}" }
            td { style: "{CELL_STYLE}", "{record.dataset_name}" }
        }
    }
}

#[component]
pub fn ResultsTable() -> Element {
    let state = use_context::<DashboardState>();
    let dashboard = state.dashboard.read();
    let table = &dashboard.table;
    let sort_by = table.sort_by().to_string();
    let rows: Vec<OccurrenceRecord> = table.rows().value().cloned().unwrap_or_default();
    let loading = table.rows().is_loading();
    let empty = matches!(table.rows(), LoadState::Empty);
    let error = table.rows().error().map(str::to_string);
    let caption = table.page_caption();
    let total = table.window().map(|w| w.total_count);
    let has_previous = table.can_navigate(PageNav::Previous);
    let has_next = table.can_navigate(PageNav::Next);
    drop(dashboard);

    // Highlight the active sort column; only sortable columns get a pointer.
    let headers: Vec<(Column, String)> = COLUMNS
        .into_iter()
        .map(|column| {
            let color = if column.sort_key == Some(sort_by.as_str()) { "#8ecbff" } else { "#fff" };
            let cursor = if column.sort_key.is_some() { "pointer" } else { "default" };
            (column, format!("{} color: {}; cursor: {};", HEADER_STYLE, color, cursor))
        })
        .collect();

    let sort = move |column: Column| {
        act(state, |dashboard| dashboard.table.change_sort(&column));
    };
    let navigate = move |nav: PageNav| {
        act(state, |dashboard| dashboard.table.navigate(nav));
    };
    let on_page_input = move |evt: Event<FormData>| {
        let Ok(page) = evt.value().trim().parse::<u32>() else {
            return;
        };
        act(state, |dashboard| match dashboard.table.go_to_page(page) {
            Ok(request) => Some(request),
            Err(e) => {
                warn!("{}", e);
                None
            }
        });
    };

    rsx! {
        div {
            id: "table-outer",
            if let Some(message) = error {
                ErrorDisplay { title: "Could not load occurrences".to_string(), message }
            }
            table {
                style: "width: 100%; border-collapse: collapse; font-size: 13px;",
                thead {
                    tr {
                        for (column, style) in headers {
                            th {
                                scope: "col",
                                style: "{style}",
                                onclick: move |_| sort(column),
                                "{column.label}"
                            }
                        }
                    }
                }
                tbody {
                    for record in rows {
                        OccurrenceRow { key: "{record.id}", record: record.clone() }
                    }
                }
            }
            if loading {
                LoadingSpinner { label: "Loading occurrences...".to_string() }
            } else if empty {
                p { style: "text-align: center; color: #666;", "No occurrences match the selection." }
            }
            p {
                style: "text-align: center; display: flex; gap: 8px; justify-content: center; align-items: center;",
                button {
                    r#type: "button",
                    disabled: !has_previous,
                    onclick: move |_| navigate(PageNav::First),
                    "First"
                }
                button {
                    r#type: "button",
                    disabled: !has_previous,
                    onclick: move |_| navigate(PageNav::Previous),
                    "Previous"
                }
                span { "{caption}" }
                button {
                    r#type: "button",
                    disabled: !has_next,
                    onclick: move |_| navigate(PageNav::Next),
                    "Next"
                }
                button {
                    r#type: "button",
                    disabled: !has_next,
                    onclick: move |_| navigate(PageNav::Last),
                    "Last"
                }
                label {
                    "Go to "
                    input {
                        r#type: "number",
                        min: "1",
                        style: "width: 60px;",
                        onchange: on_page_input,
                    }
                }
                if let Some(total) = total {
                    span { style: "color: #666;", "({total} results)" }
                }
            }
        }
    }
}
