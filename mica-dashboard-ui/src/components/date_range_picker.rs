//! Date range picker bound to the start and end date filters.

use crate::fetch::update_filters;
use crate::state::DashboardState;
use dioxus::prelude::*;
use mica_core::filters::{parse_optional_date, DATE_FORMAT};

/// Start and end date inputs. Clearing an input removes that bound. Both
/// inputs are bounded by the span of stored occurrences once it is known.
#[component]
pub fn DateRangePicker() -> Element {
    let state = use_context::<DashboardState>();
    let (start, end, inverted, earliest, latest) = {
        let dashboard = state.dashboard.read();
        let filters = dashboard.filters();
        let bounds = dashboard.options.date_range.state().value().copied();
        let format = |d: Option<chrono::NaiveDate>| {
            d.map(|d| d.format(DATE_FORMAT).to_string()).unwrap_or_default()
        };
        (
            format(filters.start_date),
            format(filters.end_date),
            filters.has_inverted_dates(),
            format(bounds.and_then(|b| b.min)),
            format(bounds.and_then(|b| b.max)),
        )
    };

    let on_start_change = move |evt: Event<FormData>| {
        let start_date = parse_optional_date(&evt.value());
        update_filters(state, |filters| filters.start_date = start_date);
    };

    let on_end_change = move |evt: Event<FormData>| {
        let end_date = parse_optional_date(&evt.value());
        update_filters(state, |filters| filters.end_date = end_date);
    };

    rsx! {
        div {
            style: "margin: 8px 0; display: flex; gap: 12px; align-items: center;",
            label {
                style: "font-weight: bold;",
                "From: "
                input {
                    r#type: "date",
                    min: "{earliest}",
                    max: "{latest}",
                    value: "{start}",
                    onchange: on_start_change,
                }
            }
            label {
                style: "font-weight: bold;",
                "To: "
                input {
                    r#type: "date",
                    min: "{earliest}",
                    max: "{latest}",
                    value: "{end}",
                    onchange: on_end_change,
                }
            }
            if inverted {
                span {
                    style: "color: #C62828; font-size: 12px;",
                    "Start date is after end date: nothing can match."
                }
            }
        }
    }
}
