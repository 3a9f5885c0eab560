use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::score::ScoringPolicy;

/// Planar CRS used for every length, area and distance computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanarCrs {
    /// Spherical Web Mercator (EPSG:3857).
    #[default]
    WebMercator,
    /// UTM zone chosen from the boundary center (WGS84 datum).
    Utm,
}

/// Settings for the OSM-backed providers. Passed to the provider at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub nominatim_url: String,
    pub overpass_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub use_cache: bool,
    pub cache_dir: PathBuf,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            nominatim_url: "https://nominatim.openstreetmap.org/search".into(),
            overpass_url: "https://overpass-api.de/api/interpreter".into(),
            user_agent: concat!("walkability/", env!("CARGO_PKG_VERSION")).into(),
            timeout_secs: 180,
            use_cache: true,
            cache_dir: "cache".into(),
        }
    }
}

/// Configuration for a single pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Free-text place name to geocode, e.g. "Bandung, Indonesia".
    pub place: String,
    pub output_dir: PathBuf,
    pub crs: PlanarCrs,
    /// Walking radius in meters for amenity accessibility.
    pub walk_buffer_m: f64,
    /// Compute per-unit metrics on the rayon thread pool.
    pub parallel: bool,
    pub provider: ProviderConfig,
    pub policy: ScoringPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            place: "Bandung, Indonesia".into(),
            output_dir: "output".into(),
            crs: PlanarCrs::default(),
            walk_buffer_m: 400.0,
            parallel: true,
            provider: ProviderConfig::default(),
            policy: ScoringPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse a configuration from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("[config] Failed to parse TOML configuration")
    }

    /// Read a configuration file from `path`.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("[config] Failed to read {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("[config] Invalid configuration in {}", path.display()))
    }

    #[inline] pub fn geojson_path(&self) -> PathBuf { self.output_dir.join("walkability_kelurahan.geojson") }

    #[inline] pub fn csv_path(&self) -> PathBuf { self.output_dir.join("walkability_stats.csv") }

    #[inline] pub fn svg_path(&self) -> PathBuf { self.output_dir.join("walkability_map.svg") }
}
