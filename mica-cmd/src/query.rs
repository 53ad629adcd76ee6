//! One-shot queries: count, histogram, table page and min/max.

use crate::FilterArgs;
use anyhow::bail;
use chrono::Local;
use log::info;
use mica_core::api::{ApiRequest, ApiResponse};
use mica_core::client::DashboardClient;
use mica_core::config::DashboardConfig;
use mica_core::count::CountSummary;
use mica_core::filters::FilterSubscriber;
use mica_core::histogram::{HistogramAggregator, HistogramMode};
use mica_core::map_view::MapViewController;
use mica_core::table::PagedResultsTable;
use std::io::Write;

/// Writer for `path`, or stdout when no path is given.
pub(crate) fn csv_writer(path: Option<&str>) -> anyhow::Result<csv::Writer<Box<dyn Write>>> {
    let sink: Box<dyn Write> = match path {
        Some(path) => Box::new(std::fs::File::create(path)?),
        None => Box::new(std::io::stdout()),
    };
    Ok(csv::Writer::from_writer(sink))
}

async fn execute(client: &DashboardClient, request: &ApiRequest) -> anyhow::Result<ApiResponse> {
    info!("Requesting {}", request.endpoint.url(client.endpoints()));
    Ok(client.execute(request).await?)
}

/// Fetch `request` into `table`.
pub(crate) async fn load_page(
    client: &DashboardClient,
    table: &mut PagedResultsTable,
    request: ApiRequest,
) -> anyhow::Result<()> {
    match execute(client, &request).await? {
        ApiResponse::Occurrences(page) => {
            table.apply(request.ticket, page);
            Ok(())
        }
        other => bail!("Unexpected answer to an occurrences request: {:?}", other),
    }
}

pub async fn run_count(args: &FilterArgs) -> anyhow::Result<()> {
    let client = args.client();
    let mut counter = CountSummary::new();
    let request = counter.request(&args.filters());

    let ApiResponse::Count(response) = execute(&client, &request).await? else {
        bail!("Unexpected answer to a count request");
    };
    counter.apply(request.ticket, response);
    if let Some(label) = counter.label() {
        println!("{}", label);
    }
    Ok(())
}

pub async fn run_histogram(
    args: &FilterArgs,
    lookback: Option<u32>,
    output: Option<&str>,
) -> anyhow::Result<()> {
    let client = args.client();
    let mode = match lookback {
        Some(months) => HistogramMode::Lookback { months },
        None => HistogramMode::SinceFirstRecord,
    };
    let mut histogram = HistogramAggregator::new(mode);
    let request = histogram.request(&args.filters());

    let ApiResponse::MonthlyHistogram(counts) = execute(&client, &request).await? else {
        bail!("Unexpected answer to a histogram request");
    };
    histogram.apply(request.ticket, &counts, Local::now().date_naive());

    let mut writer = csv_writer(output)?;
    let mut months = 0;
    if let Some(series) = histogram.state().value() {
        for bar in series.bars() {
            writer.serialize(bar)?;
        }
        months = series.len();
    }
    writer.flush()?;
    info!("Wrote {} months", months);
    Ok(())
}

pub async fn run_page(args: &FilterArgs, page: u32, sort: &str, size: u32) -> anyhow::Result<()> {
    let client = args.client();
    let mut table = PagedResultsTable::new(size, sort);
    if let Some(request) = table.filters_changed(&args.filters()) {
        load_page(&client, &mut table, request).await?;
    }
    if page != table.current_page() {
        let request = table.go_to_page(page)?;
        load_page(&client, &mut table, request).await?;
    }

    let mut writer = csv_writer(None)?;
    for record in table.rows().value().into_iter().flatten() {
        let (lat, lon) = record.display_coordinates();
        writer.write_record([
            record.id.to_string(),
            lat,
            lon,
            record.date.to_string(),
            record.species_name.clone(),
            record.dataset_name.clone(),
        ])?;
    }
    writer.flush()?;

    let total = table.window().map(|w| w.total_count).unwrap_or(0);
    eprintln!("{} ({} results)", table.page_caption(), total);
    Ok(())
}

pub async fn run_min_max(args: &FilterArgs, zoom: u8) -> anyhow::Result<()> {
    let client = args.client();
    let mut map = MapViewController::new(&DashboardConfig::default());
    let filtered = map.filters_changed(&args.filters());
    // A zoom change supersedes the request issued for the filters.
    let request = match map.set_zoom(zoom).or(filtered) {
        Some(request) => request,
        None => map.min_max_request(),
    };

    let ApiResponse::MinMax(response) = execute(&client, &request).await? else {
        bail!("Unexpected answer to a min/max request");
    };
    map.apply_min_max(request.ticket, response);
    match (response.min, response.max) {
        (Some(min), Some(max)) => println!("zoom {}: min {} / max {}", zoom, min, max),
        _ => println!("zoom {}: no occurrences", zoom),
    }
    Ok(())
}
