//! Native HTTP client for the dashboard endpoints.

use crate::api::{ApiRequest, ApiResponse};
use crate::config::EndpointConfig;
use crate::error::{DashboardError, Result};
use log::{info, warn};
use reqwest::{Client, StatusCode};
use std::time::Duration;

const MAX_TRIES: u32 = 3;

/// Sends [`ApiRequest`]s with `reqwest`, retrying transient failures.
#[derive(Debug, Clone)]
pub struct DashboardClient {
    client: Client,
    endpoints: EndpointConfig,
}

impl DashboardClient {
    pub fn new(endpoints: EndpointConfig) -> Self {
        DashboardClient {
            client: Client::new(),
            endpoints,
        }
    }

    pub fn endpoints(&self) -> &EndpointConfig {
        &self.endpoints
    }

    /// GET the request's endpoint and return the raw body.
    ///
    /// Transport errors and 5xx answers are retried with exponential backoff;
    /// any other non-success status fails immediately.
    pub async fn fetch_text(&self, request: &ApiRequest) -> Result<String> {
        let url = request.endpoint.url(&self.endpoints);
        let mut sleep_millis: u64 = 500;
        let mut last_error = DashboardError::Http(format!("no attempt made for {}", url));

        for attempt in 1..=MAX_TRIES {
            match self.client.get(&url).query(&request.params).send().await {
                Ok(response) if response.status() == StatusCode::OK => {
                    return Ok(response.text().await?);
                }
                Ok(response) => {
                    let status = response.status();
                    warn!("Attempt {}/{}: {} answered {}", attempt, MAX_TRIES, url, status);
                    last_error = DashboardError::Status {
                        status: status.as_u16(),
                        url: url.clone(),
                    };
                    if !status.is_server_error() {
                        return Err(last_error);
                    }
                }
                Err(e) => {
                    warn!("Attempt {}/{}: request to {} failed: {}", attempt, MAX_TRIES, url, e);
                    last_error = e.into();
                }
            }

            if attempt < MAX_TRIES {
                info!("Sleeping for {} milliseconds before retrying {}", sleep_millis, url);
                tokio::time::sleep(Duration::from_millis(sleep_millis)).await;
                sleep_millis *= 2;
            }
        }

        Err(last_error)
    }

    /// Send the request and decode the body for its endpoint.
    pub async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let body = self.fetch_text(request).await?;
        ApiResponse::decode(request.endpoint, &body)
    }
}
