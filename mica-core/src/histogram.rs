//! Monthly occurrence histogram.
//!
//! The server only reports months that have at least one occurrence. The
//! chart needs a contiguous axis, so the reported months are laid over a
//! scaffold covering every calendar month of the displayed period.

use crate::filters::{FilterState, FilterSubscriber};
use crate::load_state::LoadState;
use crate::month_range::{MonthRange, YearMonth};
use crate::sequence::{RequestSequence, Ticket};
use crate::api::{ApiRequest, Endpoint};
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;

/// One entry of the monthly histogram endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCount {
    pub year: i32,
    pub month: u32,
    pub count: u64,
}

impl MonthlyCount {
    pub fn year_month(&self) -> Option<YearMonth> {
        YearMonth::new(self.year, self.month)
    }
}

/// A single bar of the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistogramBar {
    #[serde(rename = "yearMonth", serialize_with = "serialize_year_month")]
    pub year_month: YearMonth,
    pub count: u64,
}

fn serialize_year_month<S: Serializer>(year_month: &YearMonth, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(year_month)
}

/// Contiguous, chronologically ordered monthly series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HistogramSeries(pub Vec<HistogramBar>);

impl HistogramSeries {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn bars(&self) -> &[HistogramBar] {
        &self.0
    }

    pub fn total(&self) -> u64 {
        self.0.iter().map(|b| b.count).sum()
    }
}

/// Longest lookback window accepted, a hundred years.
pub const MAX_LOOKBACK_MONTHS: u32 = 1200;

/// Where the scaffold starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum HistogramMode {
    /// From the first month the server reported.
    SinceFirstRecord,
    /// A fixed window of `months` months ending at the current month.
    Lookback { months: u32 },
}

impl Default for HistogramMode {
    fn default() -> Self {
        HistogramMode::SinceFirstRecord
    }
}

/// Build the gap-filled series from `start` through `end`.
///
/// Counts are matched by exact (year, month); months without a count stay at
/// zero and counts outside the scaffold are ignored. An empty `counts` input
/// yields an empty series.
pub fn fill_monthly_gaps(counts: &[MonthlyCount], start: YearMonth, end: YearMonth) -> HistogramSeries {
    if counts.is_empty() {
        return HistogramSeries::default();
    }

    let mut by_month: HashMap<YearMonth, u64> = HashMap::with_capacity(counts.len());
    for entry in counts {
        match entry.year_month() {
            Some(ym) => *by_month.entry(ym).or_insert(0) += entry.count,
            None => debug!("Ignoring histogram entry with invalid month: {:?}", entry),
        }
    }

    HistogramSeries(
        MonthRange(start, end)
            .map(|year_month| HistogramBar {
                year_month,
                count: by_month.get(&year_month).copied().unwrap_or(0),
            })
            .collect(),
    )
}

/// Gap-fill `counts` according to `mode`, ending at the month of `today`.
///
/// In `SinceFirstRecord` mode the earliest reported month is the start,
/// whatever order the server answered in. If the latest reported month lies
/// after `today`, the series ends there instead. Lookback windows are capped
/// at [`MAX_LOOKBACK_MONTHS`].
pub fn build_series(counts: &[MonthlyCount], mode: HistogramMode, today: NaiveDate) -> HistogramSeries {
    let valid: Vec<YearMonth> = counts.iter().filter_map(|c| c.year_month()).collect();
    let (Some(first), Some(last)) = (valid.iter().min().copied(), valid.iter().max().copied()) else {
        return HistogramSeries::default();
    };

    let current = YearMonth::from_date(today);
    let end = current.max(last);
    let start = match mode {
        HistogramMode::SinceFirstRecord => first,
        HistogramMode::Lookback { months } => {
            end.minus_months(months.clamp(1, MAX_LOOKBACK_MONTHS) - 1)
        }
    };
    fill_monthly_gaps(counts, start, end)
}

/// Widget state for the monthly histogram.
#[derive(Debug, Clone, Default)]
pub struct HistogramAggregator {
    mode: HistogramMode,
    sequence: RequestSequence,
    state: LoadState<HistogramSeries>,
}

impl HistogramAggregator {
    pub fn new(mode: HistogramMode) -> Self {
        HistogramAggregator {
            mode,
            ..Default::default()
        }
    }

    pub fn mode(&self) -> HistogramMode {
        self.mode
    }

    pub fn state(&self) -> &LoadState<HistogramSeries> {
        &self.state
    }

    /// Issue a fetch for `filters`.
    pub fn request(&mut self, filters: &FilterState) -> ApiRequest {
        self.state.start_loading();
        ApiRequest::new(Endpoint::MonthlyHistogram, self.sequence.issue(), filters.query_pairs())
    }

    /// Apply a histogram response. Returns `false` if the ticket was stale.
    pub fn apply(&mut self, ticket: Ticket, counts: &[MonthlyCount], today: NaiveDate) -> bool {
        if !self.sequence.settle(ticket) {
            debug!("Dropping stale histogram response {:?}", ticket);
            return false;
        }
        let series = build_series(counts, self.mode, today);
        self.state = if series.is_empty() {
            LoadState::Empty
        } else {
            LoadState::Loaded(series)
        };
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

impl FilterSubscriber for HistogramAggregator {
    type Request = ApiRequest;

    fn filters_changed(&mut self, filters: &FilterState) -> Option<ApiRequest> {
        Some(self.request(filters))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    fn mc(year: i32, month: u32, count: u64) -> MonthlyCount {
        MonthlyCount { year, month, count }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 3, 14).unwrap()
    }

    #[test]
    fn fills_every_month_up_to_today() {
        let counts = [mc(2020, 10, 4), mc(2021, 1, 9)];
        let series = build_series(&counts, HistogramMode::SinceFirstRecord, today());

        let months: Vec<YearMonth> = series.bars().iter().map(|b| b.year_month).collect();
        assert_eq!(
            months,
            vec![ym(2020, 10), ym(2020, 11), ym(2020, 12), ym(2021, 1), ym(2021, 2), ym(2021, 3)]
        );
        let values: Vec<u64> = series.bars().iter().map(|b| b.count).collect();
        assert_eq!(values, vec![4, 0, 0, 9, 0, 0]);
    }

    #[test]
    fn series_is_strictly_increasing() {
        let counts = [mc(2019, 12, 1), mc(2020, 2, 2), mc(2020, 12, 3)];
        let series = build_series(&counts, HistogramMode::SinceFirstRecord, today());
        assert!(series.bars().windows(2).all(|w| w[0].year_month < w[1].year_month));
        assert_eq!(series.len(), ym(2019, 12).months_through(ym(2021, 3)));
        assert_eq!(series.total(), 6);
    }

    #[test]
    fn empty_response_gives_empty_series() {
        assert!(build_series(&[], HistogramMode::SinceFirstRecord, today()).is_empty());
        assert!(build_series(&[], HistogramMode::Lookback { months: 12 }, today()).is_empty());
        assert!(fill_monthly_gaps(&[], ym(2020, 1), ym(2020, 5)).is_empty());
    }

    #[test]
    fn lookback_window_drops_older_counts() {
        let counts = [mc(2019, 1, 50), mc(2020, 6, 2), mc(2021, 3, 1)];
        let series = build_series(&counts, HistogramMode::Lookback { months: 12 }, today());
        assert_eq!(series.len(), 12);
        assert_eq!(series.bars()[0].year_month, ym(2020, 4));
        assert_eq!(series.bars()[11].year_month, ym(2021, 3));
        assert_eq!(series.total(), 3);
    }

    #[test]
    fn unordered_counts_start_at_the_earliest_month() {
        let counts = [mc(2021, 1, 9), mc(2020, 10, 4), mc(2020, 12, 1)];
        let series = build_series(&counts, HistogramMode::SinceFirstRecord, today());
        assert_eq!(series.bars()[0].year_month, ym(2020, 10));
        assert_eq!(series.total(), 14);
    }

    #[test]
    fn oversized_lookback_is_capped() {
        let counts = [mc(2021, 3, 1)];
        let series = build_series(&counts, HistogramMode::Lookback { months: u32::MAX }, today());
        assert_eq!(series.len(), MAX_LOOKBACK_MONTHS as usize);
        assert_eq!(series.bars()[0].year_month, ym(1921, 4));
    }

    #[test]
    fn future_months_extend_the_end() {
        let counts = [mc(2021, 2, 1), mc(2021, 5, 2)];
        let series = build_series(&counts, HistogramMode::SinceFirstRecord, today());
        assert_eq!(series.bars().last().unwrap().year_month, ym(2021, 5));
        assert_eq!(series.len(), 4);
    }

    #[test]
    fn stale_response_is_ignored() {
        let mut widget = HistogramAggregator::new(HistogramMode::SinceFirstRecord);
        let filters = FilterState::default();
        let old = widget.request(&filters).ticket;
        let new = widget.request(&filters).ticket;

        assert!(widget.apply(new, &[mc(2021, 3, 7)], today()));
        assert!(!widget.apply(old, &[mc(2020, 1, 1)], today()));
        assert_eq!(widget.state().value().unwrap().total(), 7);
    }

    #[test]
    fn failure_keeps_last_series() {
        let mut widget = HistogramAggregator::new(HistogramMode::SinceFirstRecord);
        let filters = FilterState::default();
        let t = widget.request(&filters).ticket;
        widget.apply(t, &[mc(2021, 3, 7)], today());

        let t = widget.request(&filters).ticket;
        assert!(widget.fail(t, "network down"));
        assert_eq!(widget.state().error(), Some("network down"));
        assert_eq!(widget.state().value().unwrap().total(), 7);
    }

    #[test]
    fn bars_serialize_for_the_chart() {
        let series = fill_monthly_gaps(&[mc(2020, 11, 2)], ym(2020, 11), ym(2021, 1));
        let json = serde_json::to_value(&series).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"yearMonth": "2020-11", "count": 2},
                {"yearMonth": "2020-12", "count": 0},
                {"yearMonth": "2021-01", "count": 0},
            ])
        );
    }
}
