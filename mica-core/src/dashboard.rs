//! The dashboard as a whole: one filter store feeding every widget.
//!
//! Data flows one way. The filter panel publishes a new [`FilterState`],
//! every widget derives its request from it, the host sends the requests and
//! hands each result back to [`Dashboard::apply`], which routes it to the
//! widget that issued the ticket.

use crate::api::{ApiRequest, ApiResponse, Endpoint};
use crate::config::DashboardConfig;
use crate::count::CountSummary;
use crate::error::DashboardError;
use crate::filters::{FilterState, FilterStore, FilterSubscriber};
use crate::histogram::HistogramAggregator;
use crate::map_view::MapViewController;
use crate::options::FilterOptions;
use crate::table::PagedResultsTable;
use chrono::NaiveDate;
use log::{info, warn};

#[derive(Debug, Clone)]
pub struct Dashboard {
    config: DashboardConfig,
    store: FilterStore,
    pub count: CountSummary,
    pub histogram: HistogramAggregator,
    pub table: PagedResultsTable,
    pub map: MapViewController,
    pub options: FilterOptions,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        Dashboard {
            count: CountSummary::new(),
            histogram: HistogramAggregator::new(config.histogram_mode),
            table: PagedResultsTable::new(config.page_size, config.default_sort.clone()),
            map: MapViewController::new(&config),
            options: FilterOptions::new(),
            store: FilterStore::default(),
            config,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn filters(&self) -> &FilterState {
        self.store.current()
    }

    /// Revision of the filters, bumped on every accepted change.
    pub fn revision(&self) -> u64 {
        self.store.revision()
    }

    fn notify(&mut self) -> Vec<ApiRequest> {
        let filters = self.store.current().clone();
        let subscribers: [&mut dyn FilterSubscriber<Request = ApiRequest>; 4] =
            [&mut self.count, &mut self.histogram, &mut self.table, &mut self.map];
        let mut requests: Vec<ApiRequest> = subscribers
            .into_iter()
            .filter_map(|widget| widget.filters_changed(&filters))
            .collect();
        requests.extend(self.map.sync_area(&filters));
        requests
    }

    /// Requests every widget needs on first display, followed by the
    /// filter panel's choices.
    pub fn initial_requests(&mut self) -> Vec<ApiRequest> {
        let mut requests = self.notify();
        requests.extend(self.options.requests());
        requests
    }

    /// Publish new filters. Structurally equal filters change nothing and
    /// produce no request.
    pub fn set_filters(&mut self, filters: FilterState) -> Vec<ApiRequest> {
        if !self.store.publish(filters) {
            return Vec::new();
        }
        info!("Filters changed (revision {})", self.store.revision());
        self.notify()
    }

    /// Route a finished request to its widget. Returns `true` if the result
    /// was applied, `false` if it was stale.
    pub fn apply(
        &mut self,
        request: &ApiRequest,
        result: Result<ApiResponse, DashboardError>,
        today: NaiveDate,
    ) -> bool {
        let ticket = request.ticket;
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                warn!("Request to {:?} failed: {}", request.endpoint, err);
                let message = err.to_string();
                return match request.endpoint {
                    Endpoint::Count => self.count.fail(ticket, &message),
                    Endpoint::MonthlyHistogram => self.histogram.fail(ticket, &message),
                    Endpoint::Occurrences => self.table.fail(ticket, &message),
                    Endpoint::MinMax => self.map.fail_min_max(ticket, &message),
                    Endpoint::Area(_) => self.map.fail_area(ticket, &message),
                    Endpoint::Datasets | Endpoint::Species | Endpoint::Areas | Endpoint::DateRange => {
                        self.options.fail(request.endpoint, ticket, &message)
                    }
                };
            }
        };

        match response {
            ApiResponse::Count(count) => self.count.apply(ticket, count),
            ApiResponse::MonthlyHistogram(counts) => self.histogram.apply(ticket, &counts, today),
            ApiResponse::Occurrences(page) => self.table.apply(ticket, page),
            ApiResponse::MinMax(range) => self.map.apply_min_max(ticket, range),
            ApiResponse::Area(area) => self.map.apply_area(ticket, area),
            ApiResponse::Datasets(datasets) => self.options.datasets.apply(ticket, datasets),
            ApiResponse::Species(species) => self.options.species.apply(ticket, species),
            ApiResponse::Areas(areas) => self.options.areas.apply(ticket, areas),
            ApiResponse::DateRange(range) => self.options.date_range.apply(ticket, range),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::count::CountResponse;
    use crate::histogram::MonthlyCount;
    use crate::map_view::MinMaxResponse;
    use crate::options::AreaOption;
    use crate::table::{PageNav, PageResponse};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 6, 1).unwrap()
    }

    fn find(requests: &[ApiRequest], endpoint: Endpoint) -> ApiRequest {
        requests
            .iter()
            .find(|r| r.endpoint == endpoint)
            .cloned()
            .unwrap_or_else(|| panic!("no request for {:?}", endpoint))
    }

    fn page(total: u64, last_page: u32) -> PageResponse {
        PageResponse {
            results: vec![],
            first_page: 1,
            last_page,
            total_results_count: total,
        }
    }

    #[test]
    fn mount_requests_every_widget() {
        let mut dashboard = Dashboard::new(DashboardConfig::default());
        let requests = dashboard.initial_requests();
        let endpoints: Vec<Endpoint> = requests.iter().map(|r| r.endpoint).collect();
        assert_eq!(
            endpoints,
            vec![
                Endpoint::Count,
                Endpoint::MonthlyHistogram,
                Endpoint::Occurrences,
                Endpoint::MinMax,
                Endpoint::Datasets,
                Endpoint::Species,
                Endpoint::Areas,
                Endpoint::DateRange,
            ]
        );
    }

    #[test]
    fn options_load_once_and_ignore_filters() {
        let mut dashboard = Dashboard::new(DashboardConfig::default());
        let requests = dashboard.initial_requests();
        let areas = find(&requests, Endpoint::Areas);
        let list = vec![AreaOption { id: 3, name: "Scheldt estuary".to_string() }];
        assert!(dashboard.apply(&areas, Ok(ApiResponse::Areas(list)), today()));
        assert_eq!(dashboard.options.areas.items()[0].name, "Scheldt estuary");

        let dates = find(&requests, Endpoint::DateRange);
        let err = DashboardError::Status { status: 500, url: "/api/occurrences_date_range/".into() };
        assert!(dashboard.apply(&dates, Err(err), today()));
        assert!(dashboard.options.date_range.state().error().is_some());

        let next = dashboard.set_filters(FilterState { species_id: Some(4), ..FilterState::default() });
        assert_eq!(next.len(), 4);
        assert!(next.iter().all(|r| r.endpoint != Endpoint::Areas));
        assert_eq!(dashboard.options.areas.items().len(), 1);
    }

    #[test]
    fn equal_filters_do_not_refetch() {
        let mut dashboard = Dashboard::new(DashboardConfig::default());
        dashboard.initial_requests();
        assert!(dashboard.set_filters(FilterState::default()).is_empty());

        let filters = FilterState { dataset_id: Some(1), ..Default::default() };
        assert_eq!(dashboard.set_filters(filters.clone()).len(), 4);
        assert!(dashboard.set_filters(filters).is_empty());
        assert_eq!(dashboard.revision(), 1);
    }

    #[test]
    fn area_filter_adds_area_request() {
        let mut dashboard = Dashboard::new(DashboardConfig::default());
        let requests = dashboard.set_filters(FilterState { area_id: Some(9), ..Default::default() });
        assert_eq!(requests.len(), 5);
        assert_eq!(find(&requests, Endpoint::Area(9)).param("areaId"), None);
        assert_eq!(find(&requests, Endpoint::Count).param("areaId"), Some("9"));
    }

    #[test]
    fn responses_route_to_their_widgets() {
        let mut dashboard = Dashboard::new(DashboardConfig::default());
        let requests = dashboard.initial_requests();

        let count = find(&requests, Endpoint::Count);
        assert!(dashboard.apply(&count, Ok(ApiResponse::Count(CountResponse { count: 47 })), today()));
        assert_eq!(dashboard.count.state().value(), Some(&47));

        let hist = find(&requests, Endpoint::MonthlyHistogram);
        let counts = vec![MonthlyCount { year: 2021, month: 4, count: 2 }];
        assert!(dashboard.apply(&hist, Ok(ApiResponse::MonthlyHistogram(counts)), today()));
        assert_eq!(dashboard.histogram.state().value().unwrap().len(), 3);

        let table = find(&requests, Endpoint::Occurrences);
        assert!(dashboard.apply(&table, Ok(ApiResponse::Occurrences(page(47, 6))), today()));
        assert!(dashboard.table.can_navigate(PageNav::Next));

        let range = find(&requests, Endpoint::MinMax);
        let response = ApiResponse::MinMax(MinMaxResponse { min: Some(1), max: Some(30) });
        assert!(dashboard.apply(&range, Ok(response), today()));
    }

    #[test]
    fn failures_are_reported_per_widget() {
        let mut dashboard = Dashboard::new(DashboardConfig::default());
        let requests = dashboard.initial_requests();
        let count = find(&requests, Endpoint::Count);
        let err = DashboardError::Status { status: 500, url: "/api/occurrences_counter/".into() };
        assert!(dashboard.apply(&count, Err(err), today()));
        assert!(dashboard.count.state().error().unwrap().contains("500"));
        assert!(dashboard.histogram.state().is_loading());
    }

    #[test]
    fn response_for_superseded_filters_is_dropped() {
        let mut dashboard = Dashboard::new(DashboardConfig::default());
        let first = dashboard.initial_requests();
        let second = dashboard.set_filters(FilterState { species_id: Some(3), ..Default::default() });

        let fresh = find(&second, Endpoint::Count);
        let stale = find(&first, Endpoint::Count);
        assert!(dashboard.apply(&fresh, Ok(ApiResponse::Count(CountResponse { count: 2 })), today()));
        assert!(!dashboard.apply(&stale, Ok(ApiResponse::Count(CountResponse { count: 900 })), today()));
        assert_eq!(dashboard.count.state().value(), Some(&2));
    }

    #[test]
    fn filter_change_resets_table_page() {
        let mut dashboard = Dashboard::new(DashboardConfig::default());
        let requests = dashboard.initial_requests();
        let table = find(&requests, Endpoint::Occurrences);
        dashboard.apply(&table, Ok(ApiResponse::Occurrences(page(47, 6))), today());
        let req = dashboard.table.go_to_page(3).unwrap();
        dashboard.apply(&req, Ok(ApiResponse::Occurrences(page(47, 6))), today());
        assert_eq!(dashboard.table.current_page(), 3);

        let requests = dashboard.set_filters(FilterState { dataset_id: Some(2), ..Default::default() });
        assert_eq!(dashboard.table.current_page(), 1);
        assert_eq!(find(&requests, Endpoint::Occurrences).param("page_number"), Some("1"));
    }
}
