pub mod api;
pub mod area;
#[cfg(feature = "api")]
pub mod client;
pub mod color_scale;
pub mod config;
pub mod count;
pub mod dashboard;
pub mod error;
pub mod filters;
pub mod histogram;
pub mod layers;
pub mod load_state;
pub mod map_view;
pub mod month_range;
pub mod occurrence;
pub mod options;
pub mod sequence;
pub mod table;
pub mod zoom;
