//! Paginated, sortable occurrence table.
//!
//! Pagination is done by the server; the table keeps the current page, the
//! sort key and the page size, and derives a [`PageWindow`] from the last
//! response it accepted.

use crate::api::{ApiRequest, Endpoint};
use crate::error::{DashboardError, Result};
use crate::filters::{FilterState, FilterSubscriber};
use crate::load_state::LoadState;
use crate::occurrence::OccurrenceRecord;
use crate::sequence::{RequestSequence, Ticket};
use log::debug;
use serde::{Deserialize, Serialize};

/// A table column. `sort_key` is the server-side ordering field, `None` when
/// the column cannot be sorted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub label: &'static str,
    pub sort_key: Option<&'static str>,
}

pub const COLUMNS: [Column; 6] = [
    Column { label: "#", sort_key: Some("id") },
    Column { label: "Lat", sort_key: None },
    Column { label: "Lon", sort_key: None },
    Column { label: "Date", sort_key: None },
    Column { label: "Species", sort_key: Some("species__name") },
    Column { label: "Dataset", sort_key: Some("source_dataset__name") },
];

/// Body of the paginated occurrences endpoint.
///
/// `last_page` is the exclusive end of the server's page range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    pub results: Vec<OccurrenceRecord>,
    pub first_page: u32,
    pub last_page: u32,
    pub total_results_count: u64,
}

/// Pagination bounds of the current result set. `last_page` is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page_size: u32,
    pub first_page: u32,
    pub last_page: u32,
    pub total_count: u64,
}

impl PageWindow {
    fn from_response(response: &PageResponse, page_size: u32) -> Self {
        let first_page = response.first_page.max(1);
        let last_page = response.last_page.saturating_sub(1).max(first_page);
        PageWindow {
            page_size,
            first_page,
            last_page,
            total_count: response.total_results_count,
        }
    }

    pub fn contains(&self, page: u32) -> bool {
        (self.first_page..=self.last_page).contains(&page)
    }
}

/// Navigation buttons under the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageNav {
    First,
    Previous,
    Next,
    Last,
}

#[derive(Debug, Clone)]
pub struct PagedResultsTable {
    current_page: u32,
    sort_by: String,
    page_size: u32,
    window: Option<PageWindow>,
    filters: FilterState,
    sequence: RequestSequence,
    rows: LoadState<Vec<OccurrenceRecord>>,
}

impl PagedResultsTable {
    pub fn new(page_size: u32, sort_by: impl Into<String>) -> Self {
        PagedResultsTable {
            current_page: 1,
            sort_by: sort_by.into(),
            page_size: page_size.max(1),
            window: None,
            filters: FilterState::default(),
            sequence: RequestSequence::new(),
            rows: LoadState::Idle,
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn sort_by(&self) -> &str {
        &self.sort_by
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn window(&self) -> Option<&PageWindow> {
        self.window.as_ref()
    }

    pub fn rows(&self) -> &LoadState<Vec<OccurrenceRecord>> {
        &self.rows
    }

    /// Whether the given navigation button is enabled. Everything stays
    /// disabled until the bounds of the current result set are known.
    pub fn can_navigate(&self, nav: PageNav) -> bool {
        match (self.window, nav) {
            (None, _) => false,
            (Some(w), PageNav::First | PageNav::Previous) => self.current_page > w.first_page,
            (Some(w), PageNav::Next | PageNav::Last) => self.current_page < w.last_page,
        }
    }

    /// Human readable "Page x / y".
    pub fn page_caption(&self) -> String {
        match self.window {
            Some(w) => format!("Page {} / {}", self.current_page, w.last_page),
            None => format!("Page {}", self.current_page),
        }
    }

    /// The request for the current filters, sort key and page.
    pub fn request(&mut self) -> ApiRequest {
        self.rows.start_loading();
        let mut params = self.filters.query_pairs();
        params.push(("order", self.sort_by.clone()));
        params.push(("limit", self.page_size.to_string()));
        params.push(("page_number", self.current_page.to_string()));
        ApiRequest::new(Endpoint::Occurrences, self.sequence.issue(), params)
    }

    /// Sort on the column's key. Columns without a key are ignored; so is the
    /// key that is already active.
    pub fn change_sort(&mut self, column: &Column) -> Option<ApiRequest> {
        let key = column.sort_key?;
        if key == self.sort_by {
            return None;
        }
        self.sort_by = key.to_string();
        Some(self.request())
    }

    /// Move to another page. Disabled buttons produce no request.
    pub fn navigate(&mut self, nav: PageNav) -> Option<ApiRequest> {
        if !self.can_navigate(nav) {
            return None;
        }
        let window = self.window?;
        let target = match nav {
            PageNav::First => window.first_page,
            PageNav::Previous => self.current_page.saturating_sub(1),
            PageNav::Next => self.current_page.saturating_add(1),
            PageNav::Last => window.last_page,
        };
        self.current_page = target.clamp(window.first_page, window.last_page);
        Some(self.request())
    }

    /// Jump to an explicit page number. Before the bounds of the current
    /// result set are known only page 1 is accepted.
    pub fn go_to_page(&mut self, page: u32) -> Result<ApiRequest> {
        let last = self.window.map(|w| w.last_page).unwrap_or(1);
        if page < 1 || page > last {
            return Err(DashboardError::PageOutOfRange {
                requested: page,
                last,
            });
        }
        self.current_page = page;
        Ok(self.request())
    }

    pub fn apply(&mut self, ticket: Ticket, response: PageResponse) -> bool {
        if !self.sequence.settle(ticket) {
            debug!("Dropping stale page response {:?}", ticket);
            return false;
        }
        let window = PageWindow::from_response(&response, self.page_size);
        self.current_page = self.current_page.clamp(window.first_page, window.last_page);
        self.window = Some(window);
        self.rows = if response.results.is_empty() {
            LoadState::Empty
        } else {
            LoadState::Loaded(response.results)
        };
        true
    }

    pub fn fail(&mut self, ticket: Ticket, message: &str) -> bool {
        if !self.sequence.settle(ticket) {
            return false;
        }
        self.rows.fail(message);
        true
    }
}

impl FilterSubscriber for PagedResultsTable {
    type Request = ApiRequest;

    /// New filters always restart from the first page. The old bounds belong
    /// to the old result set, so paging waits for the new ones.
    fn filters_changed(&mut self, filters: &FilterState) -> Option<ApiRequest> {
        self.filters = filters.clone();
        self.current_page = 1;
        self.window = None;
        Some(self.request())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: u64) -> OccurrenceRecord {
        OccurrenceRecord {
            id,
            lat: 50.0,
            lon: 4.0,
            date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            species_name: "Vespa velutina".to_string(),
            dataset_name: "Watch".to_string(),
            is_catch: false,
            species_id: None,
            dataset_id: None,
            gbif_id: None,
        }
    }

    /// Server-style response for `total` results split in pages of `page_size`.
    fn response(total: u64, page_size: u32) -> PageResponse {
        let pages = ((total + u64::from(page_size) - 1) / u64::from(page_size)).max(1) as u32;
        PageResponse {
            results: vec![record(1)],
            first_page: 1,
            last_page: pages + 1,
            total_results_count: total,
        }
    }

    fn loaded_table(page_size: u32, total: u64) -> PagedResultsTable {
        let mut table = PagedResultsTable::new(page_size, "id");
        let req = table.filters_changed(&FilterState::default()).unwrap();
        assert!(table.apply(req.ticket, response(total, page_size)));
        table
    }

    #[test]
    fn last_page_from_exclusive_stop() {
        let table = loaded_table(20, 47);
        assert_eq!(table.window().unwrap().last_page, 3);
        assert_eq!(table.page_caption(), "Page 1 / 3");
    }

    #[test]
    fn navigation_bounds() {
        let mut table = loaded_table(20, 47);
        assert!(!table.can_navigate(PageNav::First));
        assert!(!table.can_navigate(PageNav::Previous));
        assert!(table.can_navigate(PageNav::Next));
        assert!(table.navigate(PageNav::Previous).is_none());

        let req = table.navigate(PageNav::Next).unwrap();
        assert_eq!(req.param("page_number"), Some("2"));
        table.apply(req.ticket, response(47, 20));
        assert!(table.can_navigate(PageNav::Previous));
        assert!(table.can_navigate(PageNav::Next));

        let req = table.navigate(PageNav::Last).unwrap();
        assert_eq!(req.param("page_number"), Some("3"));
        table.apply(req.ticket, response(47, 20));
        assert!(!table.can_navigate(PageNav::Next));
        assert!(!table.can_navigate(PageNav::Last));
        assert!(table.navigate(PageNav::Next).is_none());

        let req = table.navigate(PageNav::First).unwrap();
        assert_eq!(req.param("page_number"), Some("1"));
    }

    #[test]
    fn filter_change_resets_to_first_page() {
        let mut table = loaded_table(20, 47);
        let req = table.go_to_page(3).unwrap();
        table.apply(req.ticket, response(47, 20));
        assert_eq!(table.current_page(), 3);

        let filters = FilterState {
            species_id: Some(4),
            ..Default::default()
        };
        let req = table.filters_changed(&filters).unwrap();
        assert_eq!(table.current_page(), 1);
        assert_eq!(req.param("page_number"), Some("1"));
        assert_eq!(req.param("speciesId"), Some("4"));
    }

    #[test]
    fn repeated_clicks_stay_in_range() {
        let mut table = loaded_table(20, 47);
        let req = table.navigate(PageNav::Next).unwrap();
        table.apply(req.ticket, response(47, 20));
        assert_eq!(table.current_page(), 2);

        // Three clicks before any answer arrives.
        let req = table.navigate(PageNav::Next).unwrap();
        assert_eq!(req.param("page_number"), Some("3"));
        assert!(!table.can_navigate(PageNav::Next));
        assert!(table.navigate(PageNav::Next).is_none());
        assert!(table.navigate(PageNav::Next).is_none());
        assert_eq!(table.current_page(), 3);

        for expected in ["2", "1"] {
            let req = table.navigate(PageNav::Previous).unwrap();
            assert_eq!(req.param("page_number"), Some(expected));
        }
        assert!(table.navigate(PageNav::Previous).is_none());
        assert_eq!(table.current_page(), 1);
    }

    #[test]
    fn paging_waits_for_new_bounds_after_filter_change() {
        let mut table = loaded_table(20, 47);
        let req = table.go_to_page(3).unwrap();
        table.apply(req.ticket, response(47, 20));

        let filters = FilterState {
            dataset_id: Some(2),
            ..Default::default()
        };
        let req = table.filters_changed(&filters).unwrap();
        for nav in [PageNav::First, PageNav::Previous, PageNav::Next, PageNav::Last] {
            assert!(!table.can_navigate(nav));
            assert!(table.navigate(nav).is_none());
        }
        assert!(table.go_to_page(3).is_err());
        assert_eq!(table.current_page(), 1);

        table.apply(req.ticket, response(100, 20));
        assert_eq!(table.page_caption(), "Page 1 / 5");
        assert_eq!(table.go_to_page(5).unwrap().param("page_number"), Some("5"));
    }

    #[test]
    fn null_sort_key_is_a_no_op() {
        let mut table = loaded_table(10, 5);
        let lat = COLUMNS[1];
        assert!(table.change_sort(&lat).is_none());
        assert_eq!(table.sort_by(), "id");

        let species = COLUMNS[4];
        let req = table.change_sort(&species).unwrap();
        assert_eq!(table.sort_by(), "species__name");
        assert_eq!(req.param("order"), Some("species__name"));
        assert!(table.change_sort(&species).is_none());
    }

    #[test]
    fn request_carries_paging_params() {
        let mut table = PagedResultsTable::new(15, "id");
        let req = table.request();
        assert_eq!(req.endpoint, Endpoint::Occurrences);
        assert_eq!(req.param("order"), Some("id"));
        assert_eq!(req.param("limit"), Some("15"));
        assert_eq!(req.param("page_number"), Some("1"));
    }

    #[test]
    fn out_of_range_page_rejected() {
        let mut table = loaded_table(20, 47);
        assert!(matches!(
            table.go_to_page(4),
            Err(DashboardError::PageOutOfRange { requested: 4, last: 3 })
        ));
        assert!(table.go_to_page(0).is_err());
    }

    #[test]
    fn empty_result_set_has_single_page() {
        let mut table = PagedResultsTable::new(10, "id");
        let req = table.request();
        table.apply(
            req.ticket,
            PageResponse {
                results: vec![],
                first_page: 1,
                last_page: 2,
                total_results_count: 0,
            },
        );
        assert_eq!(table.rows(), &LoadState::Empty);
        assert!(!table.can_navigate(PageNav::Next));
        assert!(!table.can_navigate(PageNav::Previous));
    }

    #[test]
    fn stale_page_is_dropped() {
        let mut table = loaded_table(20, 47);
        let slow = table.navigate(PageNav::Next).unwrap();
        let fast = table.filters_changed(&FilterState::default()).unwrap();
        assert!(table.apply(fast.ticket, response(5, 20)));
        assert!(!table.apply(slow.ticket, response(47, 20)));
        assert_eq!(table.window().unwrap().last_page, 1);
    }
}
