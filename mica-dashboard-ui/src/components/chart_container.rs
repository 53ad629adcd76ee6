//! Container for a D3 chart with loading and empty overlays.

use dioxus::prelude::*;

/// Props for ChartContainer
#[derive(Props, Clone, PartialEq)]
pub struct ChartContainerProps {
    /// The DOM id D3 renders into
    pub id: String,
    /// A request for the chart's data is in flight
    #[props(default = false)]
    pub loading: bool,
    /// The server answered with no data
    #[props(default = false)]
    pub empty: bool,
    /// Optional minimum height in pixels
    #[props(default = 260)]
    pub min_height: u32,
}

#[component]
pub fn ChartContainer(props: ChartContainerProps) -> Element {
    let style = format!(
        "min-height: {}px; position: relative; width: 100%;",
        props.min_height
    );
    let overlay = if props.loading {
        Some("Loading chart...")
    } else if props.empty {
        Some("No occurrences for this selection")
    } else {
        None
    };

    rsx! {
        div {
            style: "{style}",
            if let Some(text) = overlay {
                div {
                    style: "position: absolute; top: 50%; left: 50%; transform: translate(-50%, -50%); color: #666; background: rgba(255, 255, 255, 0.8); padding: 4px 8px;",
                    "{text}"
                }
            }
            div {
                id: "{props.id}",
                style: "width: 100%;",
            }
        }
    }
}
