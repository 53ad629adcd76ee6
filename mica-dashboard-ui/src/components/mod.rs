//! Dioxus RSX components for the occurrence dashboard.

mod chart_container;
mod color_legend;
mod date_range_picker;
mod error_display;
mod filter_panel;
mod histogram_chart;
mod loading_spinner;
mod map_controls;
mod map_panel;
mod occurrence_counter;
mod results_table;

pub use chart_container::ChartContainer;
pub use color_legend::ColorLegend;
pub use date_range_picker::DateRangePicker;
pub use error_display::ErrorDisplay;
pub use filter_panel::FilterPanel;
pub use histogram_chart::HistogramChart;
pub use loading_spinner::LoadingSpinner;
pub use map_controls::MapControls;
pub use map_panel::MapPanel;
pub use occurrence_counter::OccurrenceCounter;
pub use results_table::ResultsTable;
