//! "N occurrences matching selection" headline.

use super::ErrorDisplay;
use crate::state::DashboardState;
use dioxus::prelude::*;

#[component]
pub fn OccurrenceCounter() -> Element {
    let state = use_context::<DashboardState>();
    let summary = use_memo(move || {
        let dashboard = state.dashboard.read();
        let count = dashboard.count.state();
        (
            dashboard.count.label(),
            count.is_loading(),
            count.error().map(str::to_string),
        )
    });
    let (label, loading, error) = summary();
    let title_style = if loading { "margin: 0; color: #999;" } else { "margin: 0;" };
    let text = label.unwrap_or_else(|| "Counting occurrences...".to_string());

    rsx! {
        div {
            style: "margin: 8px 0;",
            h4 {
                style: "{title_style}",
                "{text}"
            }
            if let Some(message) = error {
                ErrorDisplay { title: "Could not count occurrences".to_string(), message }
            }
        }
    }
}
