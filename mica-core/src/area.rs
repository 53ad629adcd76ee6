//! "Area of interest" overlay.
//!
//! The area endpoint serves a GeoJSON feature collection in geographic
//! coordinates (EPSG:4326). The map displays web mercator (EPSG:3857), so the
//! geometry is re-projected once on arrival.

use crate::error::{DashboardError, Result};
use geo::{BoundingRect, Coord, LineString, MapCoords, MultiPolygon, Polygon};
use proj4rs::{proj::Proj as Proj4, transform::transform};
use serde::Deserialize;
use serde_json::{json, Value};

/// Latitude where web mercator becomes square.
const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

const GEOGRAPHIC_PROJ4: &str = "+proj=longlat +datum=WGS84 +no_defs";
const WEB_MERCATOR_PROJ4: &str =
    "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +nadgrids=@null +no_defs";

const GEOGRAPHIC_CRS_NAMES: [&str; 3] = ["EPSG:4326", "urn:ogc:def:crs:EPSG::4326", "urn:ogc:def:crs:OGC:1.3:CRS84"];

#[derive(Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    crs: Option<NamedCrs>,
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct NamedCrs {
    properties: CrsProperties,
}

#[derive(Deserialize)]
struct CrsProperties {
    name: String,
}

#[derive(Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Value,
    geometry: Option<RawGeometry>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum RawGeometry {
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
}

fn ring(points: &[Vec<f64>]) -> Result<LineString<f64>> {
    points
        .iter()
        .map(|p| match p.as_slice() {
            [x, y, ..] => Ok(Coord { x: *x, y: *y }),
            _ => Err(DashboardError::Geometry("coordinate with fewer than two values".into())),
        })
        .collect::<Result<Vec<Coord<f64>>>>()
        .map(LineString::new)
}

fn polygon(rings: &[Vec<Vec<f64>>]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter();
    let exterior = match rings.next() {
        Some(r) => ring(r)?,
        None => return Err(DashboardError::Geometry("polygon without rings".into())),
    };
    let interiors = rings.map(|r| ring(r)).collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

/// EPSG:4326 to EPSG:3857 re-projection.
pub struct WebMercator {
    from: Proj4,
    to: Proj4,
}

impl WebMercator {
    pub fn new() -> Result<Self> {
        let build = |proj_string: &str| {
            Proj4::from_proj_string(proj_string)
                .map_err(|e| DashboardError::Geometry(format!("failed to build PROJ.4 {}: {:?}", proj_string, e)))
        };
        Ok(WebMercator {
            from: build(GEOGRAPHIC_PROJ4)?,
            to: build(WEB_MERCATOR_PROJ4)?,
        })
    }

    /// Project a longitude/latitude pair (degrees) to web mercator meters.
    /// Latitudes beyond the mercator limit are clamped to it.
    pub fn project(&self, coord: Coord<f64>) -> Result<Coord<f64>> {
        let lat = coord.y.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
        let mut point = (coord.x.to_radians(), lat.to_radians(), 0.0);
        transform(&self.from, &self.to, &mut point)
            .map_err(|e| DashboardError::Geometry(format!("CRS transform failed for {:?}: {:?}", coord, e)))?;
        Ok(Coord { x: point.0, y: point.1 })
    }

    pub fn project_polygons(&self, geometry: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>> {
        geometry.try_map_coords(|coord| self.project(coord))
    }
}

/// A loaded area, already in map coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaOverlay {
    pub id: u32,
    pub name: Option<String>,
    pub geometry: MultiPolygon<f64>,
}

impl AreaOverlay {
    /// Parse a 4326 feature collection and re-project it to 3857.
    pub fn from_geojson_str(id: u32, body: &str) -> Result<Self> {
        let collection: FeatureCollection = serde_json::from_str(body)?;

        if let Some(crs) = &collection.crs {
            let name = crs.properties.name.as_str();
            if !GEOGRAPHIC_CRS_NAMES.contains(&name) {
                return Err(DashboardError::Geometry(format!("unsupported CRS {}", name)));
            }
        }

        let mut name = None;
        let mut polygons = Vec::new();
        for feature in &collection.features {
            if name.is_none() {
                name = feature
                    .properties
                    .get("name")
                    .and_then(Value::as_str)
                    .map(str::to_string);
            }
            match &feature.geometry {
                Some(RawGeometry::Polygon { coordinates }) => polygons.push(polygon(coordinates)?),
                Some(RawGeometry::MultiPolygon { coordinates }) => {
                    for rings in coordinates {
                        polygons.push(polygon(rings)?);
                    }
                }
                None => {}
            }
        }

        if polygons.is_empty() {
            return Err(DashboardError::Geometry(format!("area {} has no polygon", id)));
        }

        let geometry = WebMercator::new()?.project_polygons(&MultiPolygon::new(polygons))?;
        Ok(AreaOverlay { id, name, geometry })
    }

    /// `[min_x, min_y, max_x, max_y]` in map coordinates.
    pub fn extent(&self) -> Option<[f64; 4]> {
        self.geometry
            .bounding_rect()
            .map(|r| [r.min().x, r.min().y, r.max().x, r.max().y])
    }

    /// The overlay as a single-feature GeoJSON collection in map coordinates.
    pub fn to_geojson(&self) -> Value {
        let ring_coords = |ls: &LineString<f64>| -> Vec<[f64; 2]> { ls.coords().map(|c| [c.x, c.y]).collect() };
        let coordinates: Vec<Vec<Vec<[f64; 2]>>> = self
            .geometry
            .iter()
            .map(|p| {
                std::iter::once(p.exterior())
                    .chain(p.interiors().iter())
                    .map(ring_coords)
                    .collect()
            })
            .collect();
        json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": { "id": self.id, "name": self.name },
                "geometry": { "type": "MultiPolygon", "coordinates": coordinates },
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AREA: &str = r#"{
        "type": "FeatureCollection",
        "crs": {"type": "name", "properties": {"name": "EPSG:4326"}},
        "features": [{
            "type": "Feature",
            "properties": {"name": "Zwin", "pk": "3"},
            "geometry": {"type": "MultiPolygon", "coordinates": [[[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]]}
        }]
    }"#;

    #[test]
    fn origin_stays_at_origin() {
        let c = WebMercator::new().unwrap().project(Coord { x: 0.0, y: 0.0 }).unwrap();
        assert!(c.x.abs() < 1e-6);
        assert!(c.y.abs() < 1e-6);
    }

    #[test]
    fn known_projection_values() {
        let mercator = WebMercator::new().unwrap();
        let c = mercator.project(Coord { x: 90.0, y: 0.0 }).unwrap();
        assert!((c.x - 10_018_754.171_394_622).abs() < 1e-2);

        let c = mercator.project(Coord { x: 4.35, y: 50.85 }).unwrap();
        assert!((c.x - 484_239.785).abs() < 1e-1);
        assert!((c.y - 6_594_803.227).abs() < 1e-1);
    }

    #[test]
    fn polar_latitudes_are_clamped() {
        let mercator = WebMercator::new().unwrap();
        let pole = mercator.project(Coord { x: 0.0, y: 90.0 }).unwrap();
        let limit = mercator.project(Coord { x: 0.0, y: MAX_MERCATOR_LAT }).unwrap();
        assert!(pole.y.is_finite());
        assert!((pole.y - limit.y).abs() < 1e-6);
    }

    #[test]
    fn parses_and_projects_area() {
        let area = AreaOverlay::from_geojson_str(3, AREA).unwrap();
        assert_eq!(area.name.as_deref(), Some("Zwin"));
        assert_eq!(area.geometry.0.len(), 1);

        let [min_x, min_y, max_x, max_y] = area.extent().unwrap();
        assert!(min_x.abs() < 1e-9 && min_y.abs() < 1e-9);
        assert!((max_x - 111_319.490_793).abs() < 1e-2);
        assert!((max_y - 111_325.142_866).abs() < 1e-2);
    }

    #[test]
    fn geojson_output_is_a_feature_collection() {
        let area = AreaOverlay::from_geojson_str(3, AREA).unwrap();
        let out = area.to_geojson();
        assert_eq!(out["type"], "FeatureCollection");
        assert_eq!(out["features"][0]["geometry"]["type"], "MultiPolygon");
        assert_eq!(out["features"][0]["properties"]["id"], 3);
    }

    #[test]
    fn rejects_projected_input() {
        let body = AREA.replace("EPSG:4326", "EPSG:31370");
        assert!(matches!(
            AreaOverlay::from_geojson_str(3, &body),
            Err(DashboardError::Geometry(_))
        ));
    }

    #[test]
    fn rejects_empty_collection() {
        let body = r#"{"type": "FeatureCollection", "features": []}"#;
        assert!(AreaOverlay::from_geojson_str(1, body).is_err());
    }
}
