//! Command implementations for the occurrence dashboard CLI.
//!
//! Every command sends the same requests the dashboard widgets issue, so the
//! numbers printed here match what the dashboard shows for the same filters.

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use mica_core::client::DashboardClient;
use mica_core::config::EndpointConfig;
use mica_core::filters::{FilterState, RecordsType};
use mica_core::histogram::MAX_LOOKBACK_MONTHS;

pub mod export;
pub mod query;

/// Filters shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Server root, prepended to every endpoint path
    #[arg(long, default_value = "http://localhost:8000")]
    pub base_url: String,

    /// Only occurrences from this dataset
    #[arg(long)]
    pub dataset: Option<u32>,

    /// Only occurrences of this species
    #[arg(long)]
    pub species: Option<u32>,

    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// "catches" or "observations"
    #[arg(long)]
    pub records: Option<String>,

    /// Only occurrences inside this area
    #[arg(long)]
    pub area: Option<u32>,
}

impl FilterArgs {
    pub fn filters(&self) -> FilterState {
        FilterState {
            dataset_id: self.dataset,
            species_id: self.species,
            start_date: self.start,
            end_date: self.end,
            records_type: self.records.as_deref().and_then(RecordsType::parse),
            area_id: self.area,
        }
    }

    pub fn client(&self) -> DashboardClient {
        DashboardClient::new(EndpointConfig::default().with_base_url(&self.base_url))
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the number of occurrences matching the filters
    Count {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Write the gap-filled monthly histogram as CSV
    Histogram {
        #[command(flatten)]
        filters: FilterArgs,

        /// Only the last N months (default: since the first record)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_LOOKBACK_MONTHS)))]
        lookback: Option<u32>,

        /// Output path (default: stdout)
        #[arg(short = 'o', long)]
        output: Option<String>,
    },

    /// Print one page of the occurrence table
    Page {
        #[command(flatten)]
        filters: FilterArgs,

        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Server ordering field, "-" prefix for descending
        #[arg(long, default_value = "id")]
        sort: String,

        #[arg(long, default_value_t = 10)]
        size: u32,
    },

    /// Print the per-hexagon count range at a zoom level
    MinMax {
        #[command(flatten)]
        filters: FilterArgs,

        #[arg(long, default_value_t = 8)]
        zoom: u8,
    },

    /// Page through every matching occurrence and write them as CSV
    Export {
        #[command(flatten)]
        filters: FilterArgs,

        /// Output path for the occurrences CSV
        #[arg(short = 'o', long)]
        output: String,

        /// Records requested per page
        #[arg(long, default_value_t = 500)]
        page_size: u32,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Count { filters } => query::run_count(&filters).await,
        Command::Histogram {
            filters,
            lookback,
            output,
        } => query::run_histogram(&filters, lookback, output.as_deref()).await,
        Command::Page {
            filters,
            page,
            sort,
            size,
        } => query::run_page(&filters, page, &sort, size).await,
        Command::MinMax { filters, zoom } => query::run_min_max(&filters, zoom).await,
        Command::Export {
            filters,
            output,
            page_size,
        } => export::run_export(&filters, &output, page_size).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(subcommand)]
        command: Command,
    }

    #[test]
    fn filter_args_build_filter_state() {
        let cli = TestCli::try_parse_from([
            "mica", "count", "--species", "12", "--start", "2021-03-01", "--records", "catches",
        ])
        .unwrap();
        let Command::Count { filters } = cli.command else {
            panic!("expected the count command");
        };
        let state = filters.filters();
        assert_eq!(state.species_id, Some(12));
        assert_eq!(state.start_date, NaiveDate::from_ymd_opt(2021, 3, 1));
        assert_eq!(state.records_type, Some(RecordsType::Catches));
        assert_eq!(state.dataset_id, None);
        assert_eq!(filters.base_url, "http://localhost:8000");
    }

    #[test]
    fn lookback_is_bounded() {
        let cli = TestCli::try_parse_from(["mica", "histogram", "--lookback", "1200"]).unwrap();
        assert!(matches!(cli.command, Command::Histogram { lookback: Some(1200), .. }));
        assert!(TestCli::try_parse_from(["mica", "histogram", "--lookback", "0"]).is_err());
        assert!(TestCli::try_parse_from(["mica", "histogram", "--lookback", "4000000000"]).is_err());
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(TestCli::try_parse_from(["mica", "count", "--end", "03/01/2021"]).is_err());
    }

    #[test]
    fn client_uses_base_url() {
        let args = FilterArgs {
            base_url: "https://occurrences.example.org/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            args.client().endpoints().counter_url,
            "https://occurrences.example.org/api/occurrences_counter/"
        );
    }
}
