//! Dashboard configuration.
//!
//! Every field has a default, so a host page only needs to provide the
//! values it wants to override (typically the endpoint URLs).

use crate::error::{DashboardError, Result};
use crate::histogram::{HistogramMode, MAX_LOOKBACK_MONTHS};
use crate::layers::DataLayerKind;
use serde::{Deserialize, Serialize};

/// URLs of the server endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EndpointConfig {
    pub counter_url: String,
    pub histogram_url: String,
    pub occurrences_url: String,
    pub min_max_url: String,
    /// Vector tile template with `{z}`, `{x}` and `{y}` placeholders.
    pub tile_url_template: String,
    /// GeoJSON point features for the points, cluster and heatmap layers.
    pub points_url: String,
    /// Area GeoJSON template with an `{id}` placeholder.
    pub area_url_template: String,
    /// Raster base map template.
    pub base_tiles_url: String,
    pub datasets_url: String,
    pub species_url: String,
    pub areas_url: String,
    /// First and last occurrence date, for the date picker bounds.
    pub date_range_url: String,
}

impl EndpointConfig {
    pub const ID_PLACEHOLDER: &'static str = "{id}";
    pub const TILE_PLACEHOLDERS: [&'static str; 3] = ["{z}", "{x}", "{y}"];

    /// Prefix every relative endpoint with `base` (used by the CLI).
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        for url in [
            &mut self.counter_url,
            &mut self.histogram_url,
            &mut self.occurrences_url,
            &mut self.min_max_url,
            &mut self.tile_url_template,
            &mut self.points_url,
            &mut self.area_url_template,
            &mut self.datasets_url,
            &mut self.species_url,
            &mut self.areas_url,
            &mut self.date_range_url,
        ] {
            if url.starts_with('/') {
                *url = format!("{}{}", base, url);
            }
        }
        self
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        EndpointConfig {
            counter_url: "/api/occurrences_counter/".to_string(),
            histogram_url: "/api/occurrences_monthly_histogram/".to_string(),
            occurrences_url: "/api/occurrences_json/".to_string(),
            min_max_url: "/api/occ_min_max_in_grid/".to_string(),
            tile_url_template: "/api/tiles/{z}/{x}/{y}.mvt".to_string(),
            points_url: "/api/occurrences_geojson/".to_string(),
            area_url_template: "/api/area/{id}/".to_string(),
            base_tiles_url: "https://{a-c}.tile.openstreetmap.fr/hot/{z}/{x}/{y}.png".to_string(),
            datasets_url: "/api/available_datasets/".to_string(),
            species_url: "/api/available_species/".to_string(),
            areas_url: "/api/areas/".to_string(),
            date_range_url: "/api/occurrences_date_range/".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardConfig {
    pub endpoints: EndpointConfig,
    pub initial_lat: f64,
    pub initial_lon: f64,
    pub initial_zoom: u8,
    pub page_size: u32,
    /// Initial table sort key.
    pub default_sort: String,
    pub visible_layer: DataLayerKind,
    pub data_layer_opacity: f64,
    /// Popups are only shown at or above this zoom level.
    pub popup_min_zoom: u8,
    pub histogram_mode: HistogramMode,
    pub show_counters: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            endpoints: EndpointConfig::default(),
            initial_lat: 50.50,
            initial_lon: 4.47,
            initial_zoom: 8,
            page_size: 10,
            default_sort: "id".to_string(),
            visible_layer: DataLayerKind::Choropleth,
            data_layer_opacity: 0.7,
            popup_min_zoom: 10,
            histogram_mode: HistogramMode::SinceFirstRecord,
            show_counters: false,
        }
    }
}

impl DashboardConfig {
    /// Parse and validate a JSON configuration. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: DashboardConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(DashboardError::InvalidConfig("page size must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.data_layer_opacity) {
            return Err(DashboardError::InvalidConfig(format!(
                "data layer opacity {} is outside [0, 1]",
                self.data_layer_opacity
            )));
        }
        if !self
            .endpoints
            .area_url_template
            .contains(EndpointConfig::ID_PLACEHOLDER)
        {
            return Err(DashboardError::InvalidConfig(format!(
                "area URL template lacks {}",
                EndpointConfig::ID_PLACEHOLDER
            )));
        }
        for template in [&self.endpoints.tile_url_template, &self.endpoints.base_tiles_url] {
            if let Some(missing) = EndpointConfig::TILE_PLACEHOLDERS
                .iter()
                .find(|p| !template.contains(**p))
            {
                return Err(DashboardError::InvalidConfig(format!(
                    "tile template {} lacks {}",
                    template, missing
                )));
            }
        }
        if let HistogramMode::Lookback { months } = self.histogram_mode {
            if !(1..=MAX_LOOKBACK_MONTHS).contains(&months) {
                return Err(DashboardError::InvalidConfig(format!(
                    "lookback window of {} months is outside 1..={}",
                    months, MAX_LOOKBACK_MONTHS
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(DashboardConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = DashboardConfig::from_json(
            r#"{"pageSize": 25, "visibleLayer": "heatmap", "endpoints": {"counterUrl": "/count"}}"#,
        )
        .unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.visible_layer, DataLayerKind::Heatmap);
        assert_eq!(config.endpoints.counter_url, "/count");
        assert_eq!(config.endpoints.histogram_url, EndpointConfig::default().histogram_url);
    }

    #[test]
    fn lookback_mode_from_json() {
        let config =
            DashboardConfig::from_json(r#"{"histogramMode": {"mode": "lookback", "months": 24}}"#).unwrap();
        assert_eq!(config.histogram_mode, HistogramMode::Lookback { months: 24 });
    }

    #[test]
    fn rejects_bad_values() {
        assert!(DashboardConfig::from_json(r#"{"pageSize": 0}"#).is_err());
        assert!(DashboardConfig::from_json(r#"{"dataLayerOpacity": 1.5}"#).is_err());
        assert!(DashboardConfig::from_json(r#"{"endpoints": {"areaUrlTemplate": "/area/"}}"#).is_err());
        assert!(DashboardConfig::from_json(r#"{"endpoints": {"tileUrlTemplate": "/tiles/{z}.mvt"}}"#).is_err());
        assert!(DashboardConfig::from_json(r#"{"histogramMode": {"mode": "lookback", "months": 0}}"#).is_err());
        assert!(DashboardConfig::from_json(r#"{"histogramMode": {"mode": "lookback", "months": 1201}}"#).is_err());
    }

    #[test]
    fn base_url_prefixes_relative_paths() {
        let endpoints = EndpointConfig::default().with_base_url("https://mica.example.org/");
        assert_eq!(endpoints.counter_url, "https://mica.example.org/api/occurrences_counter/");
        assert!(endpoints.base_tiles_url.starts_with("https://{a-c}"));
    }
}
