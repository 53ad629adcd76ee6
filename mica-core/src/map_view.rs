//! Map view controller.
//!
//! Keeps the layer stack in sync with the filters, the selected display mode,
//! the opacity slider and the server-reported count range. It never touches
//! the rendering library directly: every side effect is queued as a
//! [`MapCommand`] and drained by the host with [`MapViewController::take_commands`].

use crate::api::{ApiRequest, Endpoint};
use crate::area::AreaOverlay;
use crate::color_scale::ColorScale;
use crate::config::{DashboardConfig, EndpointConfig};
use crate::error::Result;
use crate::filters::{FilterState, FilterSubscriber};
use crate::layers::{DataLayerKind, LayerRole, LayerSet, LayerSource, MapLayer};
use crate::load_state::LoadState;
use crate::sequence::{RequestSequence, Ticket};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const BASE_LAYER: &str = "base";
pub const AREA_LAYER: &str = "area";
/// Keeps the area outline above data layers, which are re-added on every
/// layer switch and would otherwise stack on top of it.
pub const AREA_Z_INDEX: i32 = 100;

/// Smallest and largest per-hexagon counts for the current filters and zoom.
/// Both are `null` when nothing matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinMaxResponse {
    pub min: Option<u64>,
    pub max: Option<u64>,
}

/// Everything the choropleth style function needs. Replaced as a whole and
/// pushed to the layer, never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleDescriptor {
    pub scale: ColorScale,
    pub show_counters: bool,
    pub stroke_color: &'static str,
    pub stroke_width: f64,
    pub stops: Vec<String>,
}

impl StyleDescriptor {
    pub fn new(scale: ColorScale, show_counters: bool) -> Self {
        StyleDescriptor {
            scale,
            show_counters,
            stroke_color: "grey",
            stroke_width: 1.0,
            stops: crate::color_scale::BLUES.iter().map(|c| c.hex()).collect(),
        }
    }
}

/// Rendering side effects, in the order they must be applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum MapCommand {
    #[serde(rename_all = "camelCase")]
    AddLayer { layer: MapLayer, style: Option<StyleDescriptor> },
    RemoveLayer { name: String },
    SetVisible { name: String, visible: bool },
    SetOpacity { name: String, opacity: f64 },
    SetStyle { name: String, style: StyleDescriptor },
    #[serde(rename_all = "camelCase")]
    ShowArea { geojson: Value, extent: Option<[f64; 4]>, z_index: i32 },
    ClearArea,
}

/// One attribute table per feature under the clicked pixel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub coordinate: [f64; 2],
    pub features: Vec<Vec<(String, String)>>,
}

impl Popup {
    /// Minimal HTML rendering: one definition list per feature.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for attributes in &self.features {
            html.push_str("<dl class=\"mica-popup-feature\">");
            for (key, value) in attributes {
                html.push_str(&format!(
                    "<dt>{}</dt><dd>{}</dd>",
                    escape_html(key),
                    escape_html(value)
                ));
            }
            html.push_str("</dl>");
        }
        html
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn attribute_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct MapViewController {
    endpoints: EndpointConfig,
    layers: LayerSet,
    visible: DataLayerKind,
    opacity: f64,
    zoom: u8,
    popup_min_zoom: u8,
    filters: FilterState,
    style: StyleDescriptor,
    min_max_sequence: RequestSequence,
    min_max: LoadState<MinMaxResponse>,
    area_id: Option<u32>,
    area_sequence: RequestSequence,
    area: LoadState<AreaOverlay>,
    commands: Vec<MapCommand>,
}

impl MapViewController {
    /// Build the base map and the data layers for unfiltered data.
    pub fn new(config: &DashboardConfig) -> Self {
        let mut map = MapViewController {
            endpoints: config.endpoints.clone(),
            layers: LayerSet::new(),
            visible: config.visible_layer,
            opacity: config.data_layer_opacity.clamp(0.0, 1.0),
            zoom: config.initial_zoom,
            popup_min_zoom: config.popup_min_zoom,
            filters: FilterState::default(),
            style: StyleDescriptor::new(ColorScale::default(), config.show_counters),
            min_max_sequence: RequestSequence::new(),
            min_max: LoadState::Idle,
            area_id: None,
            area_sequence: RequestSequence::new(),
            area: LoadState::Idle,
            commands: Vec::new(),
        };
        let base = MapLayer {
            name: BASE_LAYER.to_string(),
            role: LayerRole::Base,
            visible: true,
            opacity: 1.0,
            source: LayerSource::RasterTiles {
                url: map.endpoints.base_tiles_url.clone(),
            },
        };
        map.layers.insert(base.clone());
        map.commands.push(MapCommand::AddLayer { layer: base, style: None });
        map.add_data_layers();
        map
    }

    pub fn layers(&self) -> &LayerSet {
        &self.layers
    }

    pub fn visible_layer(&self) -> DataLayerKind {
        self.visible
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn style(&self) -> &StyleDescriptor {
        &self.style
    }

    pub fn min_max(&self) -> &LoadState<MinMaxResponse> {
        &self.min_max
    }

    pub fn area(&self) -> &LoadState<AreaOverlay> {
        &self.area
    }

    pub fn has_pending_commands(&self) -> bool {
        !self.commands.is_empty()
    }

    /// Drain the queued rendering commands.
    pub fn take_commands(&mut self) -> Vec<MapCommand> {
        std::mem::take(&mut self.commands)
    }

    fn data_layer_source(&self, kind: DataLayerKind) -> LayerSource {
        let params = self.filters.query_pairs();
        if kind.uses_vector_tiles() {
            LayerSource::VectorTiles {
                url: self.endpoints.tile_url_template.clone(),
                params,
            }
        } else {
            LayerSource::PointFeatures {
                url: self.endpoints.points_url.clone(),
                params,
            }
        }
    }

    fn add_data_layers(&mut self) {
        for kind in DataLayerKind::ALL {
            let layer = MapLayer {
                name: kind.name().to_string(),
                role: LayerRole::Data(kind),
                visible: kind == self.visible,
                opacity: self.opacity,
                source: self.data_layer_source(kind),
            };
            let style = kind.uses_vector_tiles().then(|| self.style.clone());
            self.layers.insert(layer.clone());
            self.commands.push(MapCommand::AddLayer { layer, style });
        }
    }

    /// Tear down and recreate every data layer. Their sources embed the
    /// filters, so there is nothing to update in place.
    fn replace_data_layers(&mut self) {
        for name in self.layers.remove_data_layers() {
            self.commands.push(MapCommand::RemoveLayer { name });
        }
        self.add_data_layers();
    }

    /// Show `kind` and hide the other data layers.
    pub fn set_visible_layer(&mut self, kind: DataLayerKind) -> Result<()> {
        let changed = self.layers.set_visible_layer(kind.name())?;
        self.visible = kind;
        for (name, visible) in changed {
            self.commands.push(MapCommand::SetVisible { name, visible });
        }
        Ok(())
    }

    /// Same opacity for every data layer, clamped to [0, 1].
    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = opacity.clamp(0.0, 1.0);
        for name in self.layers.set_data_opacity(self.opacity) {
            self.commands.push(MapCommand::SetOpacity {
                name,
                opacity: self.opacity,
            });
        }
    }

    fn swap_style(&mut self, style: StyleDescriptor) {
        if style == self.style {
            return;
        }
        self.style = style;
        self.commands.push(MapCommand::SetStyle {
            name: DataLayerKind::Choropleth.name().to_string(),
            style: self.style.clone(),
        });
    }

    pub fn set_show_counters(&mut self, show: bool) {
        let style = StyleDescriptor::new(self.style.scale, show);
        self.swap_style(style);
    }

    /// The min/max request for the current filters and zoom.
    pub fn min_max_request(&mut self) -> ApiRequest {
        self.min_max.start_loading();
        let mut params = self.filters.query_pairs();
        params.push(("zoom", self.zoom.to_string()));
        ApiRequest::new(Endpoint::MinMax, self.min_max_sequence.issue(), params)
    }

    /// Record a zoom change; the count range depends on the hexagon size.
    pub fn set_zoom(&mut self, zoom: u8) -> Option<ApiRequest> {
        if zoom == self.zoom {
            return None;
        }
        debug!("Map zoom changed {} -> {}", self.zoom, zoom);
        self.zoom = zoom;
        Some(self.min_max_request())
    }

    /// Apply a count range: a new scale is pushed to the existing choropleth
    /// layer through `SetStyle`, the layer itself is kept.
    pub fn apply_min_max(&mut self, ticket: Ticket, response: MinMaxResponse) -> bool {
        if !self.min_max_sequence.settle(ticket) {
            debug!("Dropping stale min/max response {:?}", ticket);
            return false;
        }
        self.min_max = match (response.min, response.max) {
            (Some(_), Some(_)) => LoadState::Loaded(response),
            _ => LoadState::Empty,
        };
        let min = response.min.unwrap_or(1) as f64;
        let max = response.max.unwrap_or(1) as f64;
        let style = StyleDescriptor::new(ColorScale::log(min, max), self.style.show_counters);
        self.swap_style(style);
        true
    }

    pub fn fail_min_max(&mut self, ticket: Ticket, message: &str) -> bool {
        if !self.min_max_sequence.settle(ticket) {
            return false;
        }
        self.min_max.fail(message);
        true
    }

    /// Follow the area id of the filters. A change clears the overlay right
    /// away and, for a new id, returns the fetch for it.
    pub fn sync_area(&mut self, filters: &FilterState) -> Option<ApiRequest> {
        if filters.area_id == self.area_id {
            return None;
        }
        self.area_id = filters.area_id;
        if self.layers.remove(AREA_LAYER).is_some() || self.area.value().is_some() {
            self.commands.push(MapCommand::ClearArea);
        }
        match self.area_id {
            Some(id) => {
                self.area = LoadState::Loading { previous: None };
                Some(ApiRequest::new(Endpoint::Area(id), self.area_sequence.issue(), Vec::new()))
            }
            None => {
                // Invalidate any area fetch still in flight.
                self.area_sequence.issue();
                self.area = LoadState::Idle;
                None
            }
        }
    }

    pub fn apply_area(&mut self, ticket: Ticket, area: AreaOverlay) -> bool {
        if !self.area_sequence.settle(ticket) {
            debug!("Dropping stale area response {:?}", ticket);
            return false;
        }
        info!("Showing area {} ({:?})", area.id, area.name);
        self.layers.insert(MapLayer {
            name: AREA_LAYER.to_string(),
            role: LayerRole::AreaOverlay,
            visible: true,
            opacity: 1.0,
            source: LayerSource::Inline,
        });
        self.commands.push(MapCommand::ShowArea {
            geojson: area.to_geojson(),
            extent: area.extent(),
            z_index: AREA_Z_INDEX,
        });
        self.area = LoadState::Loaded(area);
        true
    }

    pub fn fail_area(&mut self, ticket: Ticket, message: &str) -> bool {
        if !self.area_sequence.settle(ticket) {
            return false;
        }
        self.area.fail(message);
        true
    }

    /// Build the popup for a click at `coordinate`, given the attributes of
    /// the features under the pointer. Aggregated bins are not meaningful at
    /// low zoom, so nothing is shown below the configured threshold.
    pub fn click(&self, zoom: u8, coordinate: [f64; 2], features: &[Map<String, Value>]) -> Option<Popup> {
        if zoom < self.popup_min_zoom || features.is_empty() {
            return None;
        }
        let features = features
            .iter()
            .map(|attributes| {
                attributes
                    .iter()
                    .filter(|(key, _)| key.as_str() != "geometry" && !key.starts_with('_'))
                    .map(|(key, value)| (key.clone(), attribute_text(value)))
                    .collect()
            })
            .collect();
        Some(Popup { coordinate, features })
    }
}

impl FilterSubscriber for MapViewController {
    type Request = ApiRequest;

    fn filters_changed(&mut self, filters: &FilterState) -> Option<ApiRequest> {
        self.filters = filters.clone();
        self.replace_data_layers();
        Some(self.min_max_request())
    }
}
