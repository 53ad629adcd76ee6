//! The filter state shared by every dashboard widget.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format used for filter query parameters: "YYYY-MM-DD"
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Datasets contain either catches or observations; the server filters on that flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordsType {
    Catches,
    Observations,
}

impl RecordsType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordsType::Catches => "catches",
            RecordsType::Observations => "observations",
        }
    }

    /// Parse the query-string form. Anything other than "catches" counts as
    /// observations, matching the server's behaviour.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "" | "null" => None,
            "catches" => Some(RecordsType::Catches),
            _ => Some(RecordsType::Observations),
        }
    }
}

/// Active query constraints. Compared structurally: two values with the same
/// fields are the same filter, no matter where they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records_type: Option<RecordsType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_id: Option<u32>,
}

impl FilterState {
    /// Query-string pairs understood by every data endpoint. Unset filters are omitted.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = self.dataset_id {
            pairs.push(("datasetId", id.to_string()));
        }
        if let Some(id) = self.species_id {
            pairs.push(("speciesId", id.to_string()));
        }
        if let Some(date) = self.start_date {
            pairs.push(("startDate", date.format(DATE_FORMAT).to_string()));
        }
        if let Some(date) = self.end_date {
            pairs.push(("endDate", date.format(DATE_FORMAT).to_string()));
        }
        if let Some(records_type) = self.records_type {
            pairs.push(("recordsType", records_type.as_str().to_string()));
        }
        if let Some(id) = self.area_id {
            pairs.push(("areaId", id.to_string()));
        }
        pairs
    }

    /// `true` when no constraint is set.
    pub fn is_unfiltered(&self) -> bool {
        *self == FilterState::default()
    }

    /// `true` when both dates are set and the range is inverted.
    pub fn has_inverted_dates(&self) -> bool {
        matches!((self.start_date, self.end_date), (Some(s), Some(e)) if s > e)
    }
}

/// Parse an optional integer form value; empty and "null" mean unset.
pub fn parse_optional_id(value: &str) -> Option<u32> {
    match value.trim() {
        "" | "null" => None,
        v => v.parse().ok(),
    }
}

/// Parse an optional "YYYY-MM-DD" form value.
pub fn parse_optional_date(value: &str) -> Option<NaiveDate> {
    match value.trim() {
        "" => None,
        v => NaiveDate::parse_from_str(v, DATE_FORMAT).ok(),
    }
}

/// Single-threaded store owning the current filters.
///
/// Publishing a structurally equal value is ignored; every accepted change
/// bumps `revision` so consumers can tell which filters a result was computed for.
#[derive(Debug, Clone, Default)]
pub struct FilterStore {
    current: FilterState,
    revision: u64,
}

impl FilterStore {
    pub fn current(&self) -> &FilterState {
        &self.current
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the filters. Returns `true` if the value actually changed.
    pub fn publish(&mut self, next: FilterState) -> bool {
        if next == self.current {
            return false;
        }
        self.current = next;
        self.revision += 1;
        true
    }
}

/// Anything that derives state from the filters and may need a fetch when they change.
pub trait FilterSubscriber {
    /// The request to send for the new filters, if any.
    type Request;

    fn filters_changed(&mut self, filters: &FilterState) -> Option<Self::Request>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn query_pairs_omit_unset_values() {
        assert!(FilterState::default().query_pairs().is_empty());

        let filters = FilterState {
            species_id: Some(12),
            start_date: Some(date(2020, 1, 5)),
            records_type: Some(RecordsType::Catches),
            ..Default::default()
        };
        assert_eq!(
            filters.query_pairs(),
            vec![
                ("speciesId", "12".to_string()),
                ("startDate", "2020-01-05".to_string()),
                ("recordsType", "catches".to_string()),
            ]
        );
    }

    #[test]
    fn equality_is_structural() {
        let a = FilterState {
            dataset_id: Some(3),
            ..Default::default()
        };
        let mut b = FilterState::default();
        b.dataset_id = Some(3);
        assert_eq!(a, b);
        assert!(!a.is_unfiltered());
        assert!(FilterState::default().is_unfiltered());
    }

    #[test]
    fn store_ignores_equal_values() {
        let mut store = FilterStore::default();
        assert!(!store.publish(FilterState::default()));
        assert_eq!(store.revision(), 0);

        let next = FilterState {
            area_id: Some(1),
            ..Default::default()
        };
        assert!(store.publish(next.clone()));
        assert_eq!(store.revision(), 1);
        assert!(!store.publish(next));
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn form_values_parse_like_the_server() {
        assert_eq!(parse_optional_id(""), None);
        assert_eq!(parse_optional_id("null"), None);
        assert_eq!(parse_optional_id("42"), Some(42));
        assert_eq!(parse_optional_date("2021-02-03"), Some(date(2021, 2, 3)));
        assert_eq!(parse_optional_date(""), None);
        assert_eq!(RecordsType::parse("catches"), Some(RecordsType::Catches));
        assert_eq!(RecordsType::parse("anything"), Some(RecordsType::Observations));
        assert_eq!(RecordsType::parse("null"), None);
    }

    #[test]
    fn inverted_dates_detected() {
        let filters = FilterState {
            start_date: Some(date(2021, 5, 1)),
            end_date: Some(date(2021, 4, 1)),
            ..Default::default()
        };
        assert!(filters.has_inverted_dates());
    }

    #[test]
    fn serializes_with_server_keys() {
        let filters = FilterState {
            dataset_id: Some(7),
            end_date: Some(date(2022, 12, 31)),
            ..Default::default()
        };
        let json = serde_json::to_value(&filters).unwrap();
        assert_eq!(json, serde_json::json!({"datasetId": 7, "endDate": "2022-12-31"}));
    }
}
