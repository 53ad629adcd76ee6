//! Choices offered by the filter panel.
//!
//! Datasets, species and areas are served as plain lists; the date range is
//! the span of every stored occurrence. All four are loaded once on mount and
//! do not follow the filters, so narrowing a filter never hides the way back.

use crate::api::{ApiRequest, Endpoint};
use crate::load_state::LoadState;
use crate::sequence::{RequestSequence, Ticket};
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetOption {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub gbif_id: String,
    /// Datasets hold either catches or observations.
    #[serde(default)]
    pub contains_catches: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesOption {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaOption {
    pub id: u32,
    pub name: String,
}

/// Earliest and latest occurrence date, both `null` when nothing is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub min: Option<NaiveDate>,
    pub max: Option<NaiveDate>,
}

/// One list with its own request channel.
#[derive(Debug, Clone)]
pub struct OptionList<T> {
    sequence: RequestSequence,
    state: LoadState<T>,
}

impl<T> Default for OptionList<T> {
    fn default() -> Self {
        OptionList {
            sequence: RequestSequence::new(),
            state: LoadState::Idle,
        }
    }
}

impl<T: Clone> OptionList<T> {
    pub fn state(&self) -> &LoadState<T> {
        &self.state
    }

    fn request(&mut self, endpoint: Endpoint) -> ApiRequest {
        self.state.start_loading();
        ApiRequest::new(endpoint, self.sequence.issue(), Vec::new())
    }

    fn settle(&mut self, ticket: Ticket, result: std::result::Result<T, &str>, empty: bool) -> bool {
        if !self.sequence.settle(ticket) {
            debug!("Dropping stale option response {:?}", ticket);
            return false;
        }
        match result {
            Ok(_) if empty => self.state = LoadState::Empty,
            Ok(value) => self.state = LoadState::Loaded(value),
            Err(message) => self.state.fail(message),
        }
        true
    }

    pub fn fail(&mut self, ticket: Ticket, message: &str) -> bool {
        self.settle(ticket, Err(message), false)
    }
}

impl<T: Clone> OptionList<Vec<T>> {
    pub fn apply(&mut self, ticket: Ticket, items: Vec<T>) -> bool {
        let empty = items.is_empty();
        self.settle(ticket, Ok(items), empty)
    }

    /// Loaded items, or nothing yet.
    pub fn items(&self) -> &[T] {
        self.state.value().map(Vec::as_slice).unwrap_or_default()
    }
}

impl OptionList<DateRange> {
    pub fn apply(&mut self, ticket: Ticket, range: DateRange) -> bool {
        let empty = range.min.is_none() && range.max.is_none();
        self.settle(ticket, Ok(range), empty)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    pub datasets: OptionList<Vec<DatasetOption>>,
    pub species: OptionList<Vec<SpeciesOption>>,
    pub areas: OptionList<Vec<AreaOption>>,
    pub date_range: OptionList<DateRange>,
}

impl FilterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four mount-time fetches.
    pub fn requests(&mut self) -> Vec<ApiRequest> {
        vec![
            self.datasets.request(Endpoint::Datasets),
            self.species.request(Endpoint::Species),
            self.areas.request(Endpoint::Areas),
            self.date_range.request(Endpoint::DateRange),
        ]
    }

    pub fn fail(&mut self, endpoint: Endpoint, ticket: Ticket, message: &str) -> bool {
        match endpoint {
            Endpoint::Datasets => self.datasets.fail(ticket, message),
            Endpoint::Species => self.species.fail(ticket, message),
            Endpoint::Areas => self.areas.fail(ticket, message),
            Endpoint::DateRange => self.date_range.fail(ticket, message),
            _ => false,
        }
    }
}
