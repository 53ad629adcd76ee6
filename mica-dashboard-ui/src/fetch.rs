//! Browser-side request runner.
//!
//! Widgets hand out [`ApiRequest`]s; this module sends them with `gloo-net`,
//! applies each answer to the shared [`Dashboard`](mica_core::dashboard::Dashboard)
//! and pushes any queued map commands to the OpenLayers bridge.

use crate::js_bridge;
use crate::state::DashboardState;
use chrono::{Local, NaiveDate};
use dioxus::prelude::*;
use gloo_net::http::Request;
use log::debug;
use mica_core::api::{ApiRequest, ApiResponse};
use mica_core::config::EndpointConfig;
use mica_core::dashboard::Dashboard;
use mica_core::error::{DashboardError, Result};
use mica_core::filters::FilterState;

/// GET `request` and decode the answer for its endpoint.
pub async fn fetch(endpoints: &EndpointConfig, request: &ApiRequest) -> Result<ApiResponse> {
    let url = request.endpoint.url(endpoints);
    let resp = Request::get(&url)
        .query(request.params.iter().map(|(key, value)| (*key, value.as_str())))
        .send()
        .await
        .map_err(|e| DashboardError::Http(e.to_string()))?;
    if !resp.ok() {
        return Err(DashboardError::Status {
            status: resp.status(),
            url: resp.url(),
        });
    }
    let body = resp
        .text()
        .await
        .map_err(|e| DashboardError::Http(e.to_string()))?;
    ApiResponse::decode(request.endpoint, &body)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Send every request concurrently and apply each answer when it arrives.
///
/// Must be called from a component scope (event handler, effect or task).
pub fn dispatch(state: DashboardState, requests: Vec<ApiRequest>) {
    flush_map(state);
    if requests.is_empty() {
        return;
    }
    let endpoints = state.dashboard.peek().config().endpoints.clone();
    for request in requests {
        let endpoints = endpoints.clone();
        spawn(async move {
            let result = fetch(&endpoints, &request).await;
            let mut dashboard = state.dashboard;
            if !dashboard.write().apply(&request, result, today()) {
                debug!("Ignored stale answer from {:?}", request.endpoint);
            }
            flush_map(state);
        });
    }
}

/// Run `action` on the dashboard, then send the requests it returned.
pub fn act<I>(state: DashboardState, action: impl FnOnce(&mut Dashboard) -> I)
where
    I: IntoIterator<Item = ApiRequest>,
{
    let requests: Vec<ApiRequest> = {
        let mut dashboard = state.dashboard;
        let mut guard = dashboard.write();
        let requests = action(&mut *guard);
        requests.into_iter().collect()
    };
    dispatch(state, requests);
}

/// Like [`act`] for actions that never fetch.
pub fn mutate(state: DashboardState, action: impl FnOnce(&mut Dashboard)) {
    act(state, |dashboard| {
        action(dashboard);
        None::<ApiRequest>
    });
}

/// Publish the current filters with `edit` applied.
pub fn update_filters(state: DashboardState, edit: impl FnOnce(&mut FilterState)) {
    act(state, |dashboard| {
        let mut next = dashboard.filters().clone();
        edit(&mut next);
        dashboard.set_filters(next)
    });
}

/// Forward queued map commands to the map.
pub fn flush_map(state: DashboardState) {
    let mut dashboard = state.dashboard;
    if !dashboard.peek().map.has_pending_commands() {
        return;
    }
    let commands = dashboard.write().map.take_commands();
    js_bridge::apply_map_commands(&commands);
}
