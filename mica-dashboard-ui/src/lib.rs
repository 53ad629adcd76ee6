//! Dioxus components and browser glue for the occurrence dashboard.
//!
//! This crate provides:
//! - `state`: `DashboardState`, the shared signal around the core `Dashboard`
//! - `fetch`: sends requests with `gloo-net` and applies the answers
//! - `js_bridge`: wrappers for the OpenLayers map and the D3 histogram via `js_sys::eval()`
//! - `components`: the dashboard widgets

pub mod components;
pub mod fetch;
pub mod js_bridge;
pub mod state;
