//! Occurrence counter.

use crate::api::{ApiRequest, Endpoint};
use crate::filters::{FilterState, FilterSubscriber};
use crate::load_state::LoadState;
use crate::sequence::{RequestSequence, Ticket};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

/// Group digits in thousands: 1234567 -> "1,234,567".
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Human readable count label.
pub fn count_label(count: u64) -> String {
    match count {
        0 => "No occurrences".to_string(),
        1 => "1 occurrence".to_string(),
        n => format!("{} occurrences", group_thousands(n)),
    }
}

#[derive(Debug, Clone, Default)]
pub struct CountSummary {
    sequence: RequestSequence,
    state: LoadState<u64>,
}

impl CountSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LoadState<u64> {
        &self.state
    }

    /// Label including the trailing "matching selection", or `None` before the first result.
    pub fn label(&self) -> Option<String> {
        self.state
            .value()
            .map(|count| format!("{} matching selection", count_label(*count)))
    }

    pub fn request(&mut self, filters: &FilterState) -> ApiRequest {
        self.state.start_loading();
        ApiRequest::new(Endpoint::Count, self.sequence.issue(), filters.query_pairs())
    }

    pub fn apply(&mut self, ticket: Ticket, response: CountResponse) -> bool {
        if !self.sequence.settle(ticket) {
            return false;
        }
        self.state = LoadState::Loaded(response.count);
        true
    }

    pub fn fail(&mut self, ticket: Ticket, message: &str) -> bool {
        if !self.sequence.settle(ticket) {
            return false;
        }
        self.state.fail(message);
        true
    }
}

impl FilterSubscriber for CountSummary {
    type Request = ApiRequest;

    fn filters_changed(&mut self, filters: &FilterState) -> Option<ApiRequest> {
        Some(self.request(filters))
    }
}
