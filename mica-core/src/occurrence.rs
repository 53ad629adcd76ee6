use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single biological observation (or catch) as returned by the occurrences endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceRecord {
    pub id: u64,
    pub lat: f64,
    pub lon: f64,
    pub date: NaiveDate,
    #[serde(default)]
    pub species_name: String,
    #[serde(default)]
    pub dataset_name: String,
    #[serde(default)]
    pub is_catch: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gbif_id: Option<String>,
}

impl OccurrenceRecord {
    /// "Catch" or "Observation", for display.
    pub fn record_kind(&self) -> &'static str {
        if self.is_catch {
            "Catch"
        } else {
            "Observation"
        }
    }

    /// Coordinates rounded for table display.
    pub fn display_coordinates(&self) -> (String, String) {
        (format!("{:.4}", self.lat), format!("{:.4}", self.lon))
    }
}

#[cfg(test)]
mod tests {
    use super::OccurrenceRecord;

    #[test]
    fn deserializes_server_record() {
        let json = r#"{
            "id": 41, "lat": 50.8503, "lon": 4.35171, "date": "2021-06-02",
            "speciesName": "Vespa velutina", "datasetName": "Hornet watch",
            "isCatch": true, "speciesId": 2, "datasetId": 9
        }"#;
        let record: OccurrenceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, 41);
        assert_eq!(record.species_name, "Vespa velutina");
        assert_eq!(record.record_kind(), "Catch");
        assert_eq!(record.dataset_id, Some(9));
        assert_eq!(record.gbif_id, None);
        assert_eq!(record.display_coordinates(), ("50.8503".to_string(), "4.3517".to_string()));
    }
}
