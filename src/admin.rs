use anyhow::Result;
use geo::{Geometry, MultiPolygon};
use tracing::{info, warn};

use crate::{
    error::PipelineError,
    geom::Projector,
    provider::{AdminFeature, AdminSource, Geocoder},
};

/// `admin_level` of districts (kecamatan).
pub const DISTRICT_LEVEL: &str = "6";

/// `admin_level` values of scoring units (kelurahan / desa).
pub const UNIT_LEVELS: [&str; 2] = ["7", "8"];

/// A named administrative polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedArea {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

/// Districts and scoring units selected from the administrative features.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminAreas {
    pub districts: Vec<NamedArea>,
    pub units: Vec<NamedArea>,
}

impl AdminAreas {
    /// Split raw features into districts and units.
    /// Non-polygonal features, unnamed features and other levels are dropped.
    pub fn classify(features: Vec<AdminFeature>) -> Self {
        let mut areas = Self::default();
        for feature in features {
            let Some(geometry) = as_multipolygon(feature.geometry) else { continue };
            let (Some(name), Some(level)) = (feature.name, feature.admin_level) else { continue };
            let area = NamedArea { name, geometry };
            if level == DISTRICT_LEVEL {
                areas.districts.push(area);
            } else if UNIT_LEVELS.contains(&level.as_str()) {
                areas.units.push(area);
            }
        }
        areas
    }

    /// Reproject all geometries with `projector`.
    pub fn project(self, projector: &Projector) -> Result<Self> {
        let project = |areas: Vec<NamedArea>| areas.into_iter()
            .map(|area| Ok(NamedArea { geometry: projector.forward(&area.geometry)?, name: area.name }))
            .collect::<Result<Vec<_>>>();
        Ok(Self { districts: project(self.districts)?, units: project(self.units)? })
    }
}

fn as_multipolygon(geometry: Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(polygon) => Some(MultiPolygon(vec![polygon])),
        Geometry::MultiPolygon(multipolygon) => Some(multipolygon),
        _ => None,
    }
}

/// Geocode `place` to its boundary polygon (lon/lat). Failure aborts the run.
pub fn resolve_boundary<G>(geocoder: &G, place: &str) -> Result<MultiPolygon<f64>, PipelineError>
where G: Geocoder + ?Sized {
    geocoder.geocode(place)
        .map_err(|source| PipelineError::Geocode { place: place.to_string(), source })
}

/// Fetch districts and units inside the boundary, projected to the planar CRS.
/// A failed fetch degrades to empty collections; the caller decides whether that is fatal.
pub fn load_admin_areas<S>(source: &S, boundary: &MultiPolygon<f64>, projector: &Projector) -> Result<AdminAreas>
where S: AdminSource + ?Sized {
    let levels = [DISTRICT_LEVEL, UNIT_LEVELS[0], UNIT_LEVELS[1]];
    let areas = match source.administrative_features(boundary, &levels) {
        Ok(features) => AdminAreas::classify(features),
        Err(e) => {
            warn!("[admin] failed to fetch administrative boundaries: {e}");
            AdminAreas::default()
        }
    };
    info!("[admin] loaded {} districts and {} candidate units", areas.districts.len(), areas.units.len());
    areas.project(projector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{point, polygon, Polygon};

    fn square() -> Polygon<f64> {
        polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0), (x: 0.0, y: 0.0)]
    }

    fn feature(name: Option<&str>, level: &str, geometry: Geometry<f64>) -> AdminFeature {
        AdminFeature { name: name.map(String::from), admin_level: Some(level.into()), geometry }
    }

    #[test]
    fn classify_by_level_and_drop_unusable() {
        let areas = AdminAreas::classify(vec![
            feature(Some("Coblong"), "6", square().into()),
            feature(Some("Dago"), "7", square().into()),
            feature(Some("Lebakgede"), "8", MultiPolygon(vec![square()]).into()),
            feature(None, "7", square().into()),
            feature(Some("Bandung"), "5", square().into()),
            feature(Some("Marker"), "7", point!(x: 0.5, y: 0.5).into()),
        ]);

        assert_eq!(areas.districts.iter().map(|a| a.name.as_str()).collect::<Vec<_>>(), vec!["Coblong"]);
        assert_eq!(areas.units.iter().map(|a| a.name.as_str()).collect::<Vec<_>>(), vec!["Dago", "Lebakgede"]);
    }
}
