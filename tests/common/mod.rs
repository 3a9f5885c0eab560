// Deterministic in-memory provider for pipeline tests.
#![allow(dead_code)]

use geo::{line_string, point, polygon, Geometry, MultiPolygon, Polygon};
use walkability::{
    network::{RawNode, RawStreetGraph, StreetEdge},
    provider::{AdminFeature, AdminSource, Geocoder, NetworkMode, PoiArea, PoiSource, StreetGraphSource},
    PipelineConfig, ProviderError,
};

pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon<f64> {
    polygon![(x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1), (x: x0, y: y0)]
}

fn unavailable() -> ProviderError {
    ProviderError::Status { url: "mock://".into(), status: 503 }
}

/// Two units near (0, 0): `A` holds a three-node street with one sidewalk edge (100 m)
/// and one bare edge (300 m); `B` has no streets. One district covers `A` only.
#[derive(Debug, Clone)]
pub struct MockProvider {
    pub boundary: MultiPolygon<f64>,
    pub admin: Vec<AdminFeature>,
    pub graph: RawStreetGraph,
    pub amenities: Vec<Geometry<f64>>,
    pub fail_geocode: bool,
    pub fail_admin: bool,
    pub fail_graph: bool,
    pub fail_poi_polygon: bool,
    pub fail_poi_place: bool,
}

impl Default for MockProvider {
    fn default() -> Self {
        let unit = |name: &str, level: &str, polygon: Polygon<f64>| AdminFeature {
            name: Some(name.into()),
            admin_level: Some(level.into()),
            geometry: polygon.into(),
        };

        let edge = |u, v, geometry, sidewalk: &str| StreetEdge { u, v, geometry, highway: "residential".into(), sidewalk: sidewalk.into() };

        Self {
            boundary: MultiPolygon(vec![rect(-0.01, -0.01, 0.04, 0.02)]),
            admin: vec![
                unit("Coblong", "6", rect(-0.001, -0.001, 0.015, 0.011)),
                unit("A", "7", rect(0.0, 0.0, 0.01, 0.01)),
                unit("B", "7", rect(0.02, 0.0, 0.03, 0.01)),
                AdminFeature { name: None, admin_level: Some("7".into()), geometry: rect(0.0, 0.0, 1.0, 1.0).into() },
                unit("Bandung", "5", rect(-0.01, -0.01, 0.04, 0.02)),
            ],
            graph: RawStreetGraph {
                nodes: vec![
                    RawNode { id: 1, point: point!(x: 0.001, y: 0.005) },
                    RawNode { id: 2, point: point!(x: 0.002, y: 0.005) },
                    RawNode { id: 3, point: point!(x: 0.005, y: 0.005) },
                ],
                edges: vec![
                    edge(1, 2, line_string![(x: 0.001, y: 0.005), (x: 0.002, y: 0.005)], "both"),
                    edge(2, 3, line_string![(x: 0.002, y: 0.005), (x: 0.005, y: 0.005)], "no"),
                ],
            },
            amenities: vec![point!(x: 0.0011, y: 0.005).into()],
            fail_geocode: false,
            fail_admin: false,
            fail_graph: false,
            fail_poi_polygon: false,
            fail_poi_place: false,
        }
    }
}

impl Geocoder for MockProvider {
    fn geocode(&self, place: &str) -> Result<MultiPolygon<f64>, ProviderError> {
        if self.fail_geocode { return Err(ProviderError::NotFound(place.into())) }
        Ok(self.boundary.clone())
    }
}

impl AdminSource for MockProvider {
    fn administrative_features(&self, _: &MultiPolygon<f64>, _: &[&str]) -> Result<Vec<AdminFeature>, ProviderError> {
        if self.fail_admin { return Err(unavailable()) }
        Ok(self.admin.clone())
    }
}

impl StreetGraphSource for MockProvider {
    fn street_graph(&self, _: &MultiPolygon<f64>, _: NetworkMode) -> Result<RawStreetGraph, ProviderError> {
        if self.fail_graph { return Err(unavailable()) }
        Ok(self.graph.clone())
    }
}

impl PoiSource for MockProvider {
    fn points_of_interest(&self, area: PoiArea<'_>, _: &[&str]) -> Result<Vec<Geometry<f64>>, ProviderError> {
        let failed = match area {
            PoiArea::Polygon(_) => self.fail_poi_polygon,
            PoiArea::Place(_) => self.fail_poi_place,
        };
        if failed { return Err(unavailable()) }
        Ok(self.amenities.clone())
    }
}

pub fn config(output_dir: &std::path::Path) -> PipelineConfig {
    PipelineConfig { place: "Mock City".into(), output_dir: output_dir.into(), ..PipelineConfig::default() }
}
