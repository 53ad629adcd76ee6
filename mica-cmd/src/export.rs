//! Full CSV export of the occurrences matching a filter.
//!
//! The occurrences endpoint only serves pages, so the export walks the table
//! from the first page to the last with the same navigation the dashboard uses.

use crate::query::{csv_writer, load_page};
use crate::FilterArgs;
use chrono::NaiveDate;
use log::info;
use mica_core::filters::FilterSubscriber;
use mica_core::occurrence::OccurrenceRecord;
use mica_core::table::{PageNav, PagedResultsTable};
use serde::Serialize;
use std::time::Duration;

/// One CSV line. Every column is always present so the file stays rectangular.
#[derive(Debug, Serialize, PartialEq)]
struct ExportRow<'a> {
    id: u64,
    lat: f64,
    lon: f64,
    date: NaiveDate,
    kind: &'static str,
    species_id: Option<u32>,
    species: &'a str,
    dataset_id: Option<u32>,
    dataset: &'a str,
    gbif_id: Option<&'a str>,
}

impl<'a> From<&'a OccurrenceRecord> for ExportRow<'a> {
    fn from(record: &'a OccurrenceRecord) -> Self {
        ExportRow {
            id: record.id,
            lat: record.lat,
            lon: record.lon,
            date: record.date,
            kind: record.record_kind(),
            species_id: record.species_id,
            species: &record.species_name,
            dataset_id: record.dataset_id,
            dataset: &record.dataset_name,
            gbif_id: record.gbif_id.as_deref(),
        }
    }
}

pub async fn run_export(args: &FilterArgs, output: &str, page_size: u32) -> anyhow::Result<()> {
    let client = args.client();
    let mut table = PagedResultsTable::new(page_size, "id");
    let mut writer = csv_writer(Some(output))?;
    let mut written: u64 = 0;

    let mut next = table.filters_changed(&args.filters());
    while let Some(request) = next {
        load_page(&client, &mut table, request).await?;
        for record in table.rows().value().into_iter().flatten() {
            writer.serialize(ExportRow::from(record))?;
            written += 1;
        }
        info!("{}: {} occurrences so far", table.page_caption(), written);

        next = table.navigate(PageNav::Next);
        if next.is_some() {
            // Be polite to the server
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    }

    writer.flush()?;
    info!("Export complete. {} occurrences written to {}", written, output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_keep_every_column() {
        let with_ids = OccurrenceRecord {
            id: 7,
            lat: 50.5,
            lon: 4.25,
            date: NaiveDate::from_ymd_opt(2021, 6, 3).unwrap(),
            species_name: "Procambarus clarkii".to_string(),
            dataset_name: "Crayfish survey".to_string(),
            is_catch: true,
            species_id: Some(3),
            dataset_id: Some(9),
            gbif_id: Some("abc".to_string()),
        };
        let without_ids = OccurrenceRecord {
            species_id: None,
            dataset_id: None,
            gbif_id: None,
            is_catch: false,
            ..with_ids.clone()
        };

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.serialize(ExportRow::from(&with_ids)).unwrap();
        writer.serialize(ExportRow::from(&without_ids)).unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "id,lat,lon,date,kind,species_id,species,dataset_id,dataset,gbif_id"
        );
        assert_eq!(lines[1], "7,50.5,4.25,2021-06-03,Catch,3,Procambarus clarkii,9,Crayfish survey,abc");
        assert_eq!(lines[2], "7,50.5,4.25,2021-06-03,Observation,,Procambarus clarkii,,Crayfish survey,");
    }
}
