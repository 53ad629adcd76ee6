//! Server endpoints, outgoing requests and decoded responses.
//!
//! Requests are plain values: widgets build them, the host (browser or CLI)
//! sends them, and the decoded [`ApiResponse`] is handed back together with
//! the request's ticket.

use crate::area::AreaOverlay;
use crate::config::EndpointConfig;
use crate::count::CountResponse;
use crate::error::Result;
use crate::histogram::MonthlyCount;
use crate::map_view::MinMaxResponse;
use crate::options::{AreaOption, DatasetOption, DateRange, SpeciesOption};
use crate::sequence::Ticket;
use crate::table::PageResponse;

/// The JSON endpoints the dashboard reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Count,
    MonthlyHistogram,
    Occurrences,
    MinMax,
    Area(u32),
    Datasets,
    Species,
    Areas,
    DateRange,
}

impl Endpoint {
    /// Resolve the URL for this endpoint.
    pub fn url(&self, endpoints: &EndpointConfig) -> String {
        match self {
            Endpoint::Count => endpoints.counter_url.clone(),
            Endpoint::MonthlyHistogram => endpoints.histogram_url.clone(),
            Endpoint::Occurrences => endpoints.occurrences_url.clone(),
            Endpoint::MinMax => endpoints.min_max_url.clone(),
            Endpoint::Area(id) => endpoints
                .area_url_template
                .replace(EndpointConfig::ID_PLACEHOLDER, &id.to_string()),
            Endpoint::Datasets => endpoints.datasets_url.clone(),
            Endpoint::Species => endpoints.species_url.clone(),
            Endpoint::Areas => endpoints.areas_url.clone(),
            Endpoint::DateRange => endpoints.date_range_url.clone(),
        }
    }
}

/// A GET request waiting to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub endpoint: Endpoint,
    pub ticket: Ticket,
    pub params: Vec<(&'static str, String)>,
}

impl ApiRequest {
    pub fn new(endpoint: Endpoint, ticket: Ticket, params: Vec<(&'static str, String)>) -> Self {
        ApiRequest {
            endpoint,
            ticket,
            params,
        }
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Count(CountResponse),
    MonthlyHistogram(Vec<MonthlyCount>),
    Occurrences(PageResponse),
    MinMax(MinMaxResponse),
    Area(AreaOverlay),
    Datasets(Vec<DatasetOption>),
    Species(Vec<SpeciesOption>),
    Areas(Vec<AreaOption>),
    DateRange(DateRange),
}

impl ApiResponse {
    /// Decode `body` as the response type of `endpoint`.
    pub fn decode(endpoint: Endpoint, body: &str) -> Result<ApiResponse> {
        Ok(match endpoint {
            Endpoint::Count => ApiResponse::Count(serde_json::from_str(body)?),
            Endpoint::MonthlyHistogram => ApiResponse::MonthlyHistogram(serde_json::from_str(body)?),
            Endpoint::Occurrences => ApiResponse::Occurrences(serde_json::from_str(body)?),
            Endpoint::MinMax => ApiResponse::MinMax(serde_json::from_str(body)?),
            Endpoint::Area(id) => ApiResponse::Area(AreaOverlay::from_geojson_str(id, body)?),
            Endpoint::Datasets => ApiResponse::Datasets(serde_json::from_str(body)?),
            Endpoint::Species => ApiResponse::Species(serde_json::from_str(body)?),
            Endpoint::Areas => ApiResponse::Areas(serde_json::from_str(body)?),
            Endpoint::DateRange => ApiResponse::DateRange(serde_json::from_str(body)?),
        })
    }
}
