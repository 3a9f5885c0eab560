use std::time::Duration;

use geo::{Geometry, Intersects, MultiPolygon};
use reqwest::{blocking::{Client, RequestBuilder}, redirect::Policy, Url};
use tracing::{debug, info};

use crate::{
    config::ProviderConfig,
    error::ProviderError,
    io::parse_geometry,
    network::RawStreetGraph,
    provider::{
        cache::ResponseCache,
        overpass::{self, OverpassResponse},
        AdminFeature, AdminSource, Geocoder, NetworkMode, PoiArea, PoiSource, StreetGraphSource,
    },
};

/// OpenStreetMap-backed provider: Nominatim for geocoding, Overpass for everything else.
#[derive(Debug)]
pub struct OsmProvider {
    client: Client,
    config: ProviderConfig,
    cache: Option<ResponseCache>,
}

impl OsmProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(Policy::limited(10))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Http { url: String::new(), message: e.to_string() })?;
        let cache = config.use_cache.then(|| ResponseCache::new(&config.cache_dir));
        Ok(Self { client, config, cache })
    }

    /// Send a request, consulting the response cache first.
    fn fetch(&self, url: &str, body: &str, request: RequestBuilder) -> Result<Vec<u8>, ProviderError> {
        let key = ResponseCache::key(url, body);
        if let Some(cache) = &self.cache {
            if let Some(bytes) = cache.get(&key)? {
                debug!("[provider::osm] cache hit {key}");
                return Ok(bytes);
            }
        }

        let http_error = |e: reqwest::Error| ProviderError::Http { url: url.to_string(), message: e.to_string() };
        let response = request.send().map_err(http_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status { url: url.to_string(), status: status.as_u16() });
        }
        let bytes = response.bytes().map_err(http_error)?.to_vec();

        if let Some(cache) = &self.cache {
            cache.put(&key, &bytes)?;
        }
        Ok(bytes)
    }

    /// Run an Overpass QL query.
    fn overpass(&self, query: &str) -> Result<OverpassResponse, ProviderError> {
        debug!("[provider::osm] overpass query: {query}");
        let url = &self.config.overpass_url;
        let request = self.client.post(url).form(&[("data", query)]);
        let bytes = self.fetch(url, query, request)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ProviderError::Decode(format!("overpass response: {e}")))
    }

    #[inline]
    fn bbox(boundary: &MultiPolygon<f64>) -> Result<String, ProviderError> {
        overpass::bbox_filter(boundary)
            .ok_or_else(|| ProviderError::NotFound("bounds of an empty boundary".into()))
    }
}

impl Geocoder for OsmProvider {
    fn geocode(&self, place: &str) -> Result<MultiPolygon<f64>, ProviderError> {
        let url = Url::parse_with_params(&self.config.nominatim_url, &[
            ("q", place),
            ("format", "geojson"),
            ("polygon_geojson", "1"),
            ("limit", "1"),
        ]).map_err(|e| ProviderError::Http { url: self.config.nominatim_url.clone(), message: e.to_string() })?;

        let bytes = self.fetch(url.as_str(), "", self.client.get(url.clone()))?;
        let document: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| ProviderError::Decode(format!("nominatim response: {e}")))?;

        let geometry = document["features"].get(0)
            .map(|feature| &feature["geometry"])
            .ok_or_else(|| ProviderError::NotFound(place.to_string()))?;
        match parse_geometry(geometry) {
            Ok(Some(boundary)) => {
                info!("[provider::osm] geocoded {place:?} to {} polygon(s)", boundary.0.len());
                Ok(boundary)
            }
            Ok(None) => Err(ProviderError::NotFound(format!("polygon boundary for {place}"))),
            Err(e) => Err(ProviderError::Decode(format!("{e:#}"))),
        }
    }
}

impl AdminSource for OsmProvider {
    fn administrative_features(&self, boundary: &MultiPolygon<f64>, levels: &[&str]) -> Result<Vec<AdminFeature>, ProviderError> {
        let query = overpass::admin_query(&Self::bbox(boundary)?, levels, self.config.timeout_secs);
        let features = overpass::parse_admin_features(&self.overpass(&query)?);
        Ok(features.into_iter()
            .filter(|feature| feature.geometry.intersects(boundary))
            .collect())
    }
}

impl StreetGraphSource for OsmProvider {
    fn street_graph(&self, boundary: &MultiPolygon<f64>, mode: NetworkMode) -> Result<RawStreetGraph, ProviderError> {
        let query = match mode {
            NetworkMode::Walk => overpass::walk_query(&Self::bbox(boundary)?, self.config.timeout_secs),
        };
        Ok(overpass::parse_street_graph(&self.overpass(&query)?, boundary))
    }
}

impl PoiSource for OsmProvider {
    fn points_of_interest(&self, area: PoiArea<'_>, keys: &[&str]) -> Result<Vec<Geometry<f64>>, ProviderError> {
        match area {
            PoiArea::Polygon(boundary) => {
                let query = overpass::poi_query_bbox(&Self::bbox(boundary)?, keys, self.config.timeout_secs);
                Ok(overpass::parse_points(&self.overpass(&query)?).into_iter()
                    .filter(|point| point.intersects(boundary))
                    .collect())
            }
            PoiArea::Place(place) => {
                let query = overpass::poi_query_place(place, keys, self.config.timeout_secs);
                Ok(overpass::parse_points(&self.overpass(&query)?))
            }
        }
    }
}
