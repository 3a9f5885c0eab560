//! Capability interfaces for the external boundary, graph and POI services.

#[cfg(feature = "download")]
mod cache;
#[cfg(feature = "download")]
mod osm;
mod overpass;

use geo::{Geometry, MultiPolygon};

use crate::{error::ProviderError, network::RawStreetGraph};

#[cfg(feature = "download")]
pub use osm::OsmProvider;
pub use overpass::{parse_admin_features, parse_points, parse_street_graph, OverpassResponse};

/// An administrative boundary feature, in lon/lat.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminFeature {
    pub name: Option<String>,
    pub admin_level: Option<String>,
    pub geometry: Geometry<f64>,
}

/// Traversal mode of a fetched street network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NetworkMode {
    /// Ways a pedestrian may legally use.
    #[default]
    Walk,
}

/// Area to search for points of interest.
#[derive(Debug, Clone, Copy)]
pub enum PoiArea<'a> {
    Polygon(&'a MultiPolygon<f64>),
    Place(&'a str),
}

/// Resolves a place name to its boundary polygon (lon/lat).
pub trait Geocoder {
    fn geocode(&self, place: &str) -> Result<MultiPolygon<f64>, ProviderError>;
}

/// Fetches administrative boundaries at the given `admin_level` values inside a polygon.
pub trait AdminSource {
    fn administrative_features(&self, boundary: &MultiPolygon<f64>, levels: &[&str]) -> Result<Vec<AdminFeature>, ProviderError>;
}

/// Fetches the street graph covering a polygon.
pub trait StreetGraphSource {
    fn street_graph(&self, boundary: &MultiPolygon<f64>, mode: NetworkMode) -> Result<RawStreetGraph, ProviderError>;
}

/// Fetches features carrying any of the given tag keys.
pub trait PoiSource {
    fn points_of_interest(&self, area: PoiArea<'_>, keys: &[&str]) -> Result<Vec<Geometry<f64>>, ProviderError>;
}

/// Everything the pipeline needs from the outside world.
pub trait Provider: Geocoder + AdminSource + StreetGraphSource + PoiSource {}

impl<T: Geocoder + AdminSource + StreetGraphSource + PoiSource> Provider for T {}
