//! Map layers and their visibility rules.

use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The ways occurrence data can be drawn. Exactly one is visible at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataLayerKind {
    Points,
    Cluster,
    Heatmap,
    Choropleth,
}

impl DataLayerKind {
    pub const ALL: [DataLayerKind; 4] = [
        DataLayerKind::Points,
        DataLayerKind::Cluster,
        DataLayerKind::Heatmap,
        DataLayerKind::Choropleth,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DataLayerKind::Points => "points",
            DataLayerKind::Cluster => "cluster",
            DataLayerKind::Heatmap => "heatmap",
            DataLayerKind::Choropleth => "choropleth",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DataLayerKind::Points => "Simple points",
            DataLayerKind::Cluster => "Clusters",
            DataLayerKind::Heatmap => "Heatmap",
            DataLayerKind::Choropleth => "Aggregated hexagons",
        }
    }

    /// Whether this layer reads vector tiles (as opposed to point features).
    pub fn uses_vector_tiles(&self) -> bool {
        matches!(self, DataLayerKind::Choropleth)
    }
}

impl fmt::Display for DataLayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataLayerKind {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        DataLayerKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| DashboardError::UnknownLayer(s.to_string()))
    }
}

/// What a layer is for. Visibility and opacity rules dispatch on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "role", content = "kind", rename_all = "camelCase")]
pub enum LayerRole {
    Base,
    Data(DataLayerKind),
    AreaOverlay,
}

impl LayerRole {
    pub fn is_data(&self) -> bool {
        matches!(self, LayerRole::Data(_))
    }
}

/// Where a layer gets its features from.
///
/// Filtered sources keep their query pairs apart from the URL; the map
/// encodes them when it builds the request URLs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LayerSource {
    RasterTiles { url: String },
    VectorTiles { url: String, params: Vec<(&'static str, String)> },
    PointFeatures { url: String, params: Vec<(&'static str, String)> },
    Inline,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapLayer {
    pub name: String,
    pub role: LayerRole,
    pub visible: bool,
    pub opacity: f64,
    pub source: LayerSource,
}

/// The ordered layer stack of the map.
#[derive(Debug, Clone, Default)]
pub struct LayerSet {
    layers: Vec<MapLayer>,
}

impl LayerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layers(&self) -> &[MapLayer] {
        &self.layers
    }

    pub fn get(&self, name: &str) -> Option<&MapLayer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn data_layers(&self) -> impl Iterator<Item = &MapLayer> {
        self.layers.iter().filter(|l| l.role.is_data())
    }

    pub fn visible_data_layers(&self) -> Vec<&MapLayer> {
        self.data_layers().filter(|l| l.visible).collect()
    }

    /// Add a layer, replacing any layer with the same name.
    pub fn insert(&mut self, layer: MapLayer) {
        match self.layers.iter_mut().find(|l| l.name == layer.name) {
            Some(existing) => *existing = layer,
            None => self.layers.push(layer),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<MapLayer> {
        let index = self.layers.iter().position(|l| l.name == name)?;
        Some(self.layers.remove(index))
    }

    /// Remove every data layer, returning their names.
    pub fn remove_data_layers(&mut self) -> Vec<String> {
        let (data, rest): (Vec<MapLayer>, Vec<MapLayer>) =
            std::mem::take(&mut self.layers).into_iter().partition(|l| l.role.is_data());
        self.layers = rest;
        data.into_iter().map(|l| l.name).collect()
    }

    /// Show the data layer named `name` and hide every other data layer.
    ///
    /// Returns the `(name, visible)` pairs that changed. An unknown name is an
    /// error and leaves visibility untouched.
    pub fn set_visible_layer(&mut self, name: &str) -> Result<Vec<(String, bool)>> {
        if !self.data_layers().any(|l| l.name == name) {
            return Err(DashboardError::UnknownLayer(name.to_string()));
        }
        let mut changed = Vec::new();
        for layer in self.layers.iter_mut().filter(|l| l.role.is_data()) {
            let visible = layer.name == name;
            if layer.visible != visible {
                layer.visible = visible;
                changed.push((layer.name.clone(), visible));
            }
        }
        Ok(changed)
    }

    /// Apply the same opacity to every data layer. Returns the affected names.
    pub fn set_data_opacity(&mut self, opacity: f64) -> Vec<String> {
        let opacity = opacity.clamp(0.0, 1.0);
        self.layers
            .iter_mut()
            .filter(|l| l.role.is_data())
            .map(|l| {
                l.opacity = opacity;
                l.name.clone()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_layer(kind: DataLayerKind, visible: bool) -> MapLayer {
        MapLayer {
            name: kind.name().to_string(),
            role: LayerRole::Data(kind),
            visible,
            opacity: 1.0,
            source: LayerSource::Inline,
        }
    }

    fn sample_set() -> LayerSet {
        let mut set = LayerSet::new();
        set.insert(MapLayer {
            name: "base".to_string(),
            role: LayerRole::Base,
            visible: true,
            opacity: 1.0,
            source: LayerSource::RasterTiles { url: "t/{z}/{x}/{y}.png".to_string() },
        });
        for kind in DataLayerKind::ALL {
            set.insert(data_layer(kind, kind == DataLayerKind::Points));
        }
        set
    }

    #[test]
    fn exactly_one_data_layer_visible_after_toggle() {
        let mut set = sample_set();
        for kind in [DataLayerKind::Heatmap, DataLayerKind::Cluster, DataLayerKind::Heatmap] {
            set.set_visible_layer(kind.name()).unwrap();
            let visible = set.visible_data_layers();
            assert_eq!(visible.len(), 1);
            assert_eq!(visible[0].name, kind.name());
        }
        assert!(set.get("base").unwrap().visible);
    }

    #[test]
    fn toggle_reports_only_changes() {
        let mut set = sample_set();
        let changed = set.set_visible_layer("cluster").unwrap();
        assert_eq!(
            changed,
            vec![("points".to_string(), false), ("cluster".to_string(), true)]
        );
        assert!(set.set_visible_layer("cluster").unwrap().is_empty());
    }

    #[test]
    fn unknown_layer_keeps_selection() {
        let mut set = sample_set();
        assert!(set.set_visible_layer("base").is_err());
        assert!(set.set_visible_layer("nope").is_err());
        assert_eq!(set.visible_data_layers()[0].name, "points");
    }

    #[test]
    fn opacity_applies_to_data_layers_only() {
        let mut set = sample_set();
        let names = set.set_data_opacity(1.7);
        assert_eq!(names.len(), 4);
        assert!(set.data_layers().all(|l| l.opacity == 1.0));
        set.set_data_opacity(0.25);
        assert!(set.data_layers().all(|l| l.opacity == 0.25));
        assert_eq!(set.get("base").unwrap().opacity, 1.0);
    }

    #[test]
    fn remove_data_layers_keeps_base() {
        let mut set = sample_set();
        let removed = set.remove_data_layers();
        assert_eq!(removed.len(), 4);
        assert_eq!(set.layers().len(), 1);
        assert_eq!(set.layers()[0].role, LayerRole::Base);
    }

    #[test]
    fn kind_round_trips_through_name() {
        assert_eq!("heatmap".parse::<DataLayerKind>().unwrap(), DataLayerKind::Heatmap);
        assert!("hexagons".parse::<DataLayerKind>().is_err());
    }
}
