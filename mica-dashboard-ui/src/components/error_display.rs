//! Error display component.

use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
pub struct ErrorDisplayProps {
    pub message: String,
    /// What failed, e.g. "Could not load the occurrence count"
    #[props(default = "Error".to_string())]
    pub title: String,
}

/// Displays a failed request next to the widget it belongs to.
#[component]
pub fn ErrorDisplay(props: ErrorDisplayProps) -> Element {
    rsx! {
        div {
            style: "padding: 8px 12px; margin: 8px 0; background: #FFEBEE; color: #C62828; border-radius: 4px; border: 1px solid #EF9A9A; font-size: 13px;",
            strong { "{props.title}: " }
            "{props.message}"
        }
    }
}
