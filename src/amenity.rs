use anyhow::Result;
use geo::{Centroid, Geometry, MultiPolygon, Point};
use rstar::{RTree, AABB};
use tracing::{info, warn};

use crate::{geom::Projector, provider::{PoiArea, PoiSource}};

/// Tag keys whose features count as amenities.
pub const AMENITY_KEYS: [&str; 4] = ["amenity", "shop", "leisure", "tourism"];

/// Global pool of amenity points (planar CRS) with an R-tree for radius queries.
#[derive(Debug, Clone, Default)]
pub struct AmenityPool {
    index: RTree<[f64; 2]>,
}

impl AmenityPool {
    pub fn new(points: Vec<Point<f64>>) -> Self {
        Self { index: RTree::bulk_load(points.into_iter().map(|p| [p.x(), p.y()]).collect()) }
    }

    #[inline] pub fn is_empty(&self) -> bool { self.index.size() == 0 }

    /// Whether any amenity lies within `radius` of `point`.
    /// Candidates come from the R-tree by bounding box; true distance confirms them.
    pub fn any_within(&self, point: &Point<f64>, radius: f64) -> bool {
        let envelope = AABB::from_corners(
            [point.x() - radius, point.y() - radius],
            [point.x() + radius, point.y() + radius],
        );
        self.index.locate_in_envelope_intersecting(&envelope)
            .any(|&[x, y]| (x - point.x()).hypot(y - point.y()) <= radius)
    }
}

/// Fetch amenities inside the boundary, falling back to a place-name query.
/// Total failure yields an empty pool rather than an error.
pub fn load_amenities<S>(source: &S, boundary: &MultiPolygon<f64>, place: &str, projector: &Projector) -> Result<AmenityPool>
where S: PoiSource + ?Sized {
    let fetched = source.points_of_interest(PoiArea::Polygon(boundary), &AMENITY_KEYS)
        .or_else(|e| {
            warn!("[amenity] polygon query failed ({e}); retrying by place name {place:?}");
            source.points_of_interest(PoiArea::Place(place), &AMENITY_KEYS)
        });

    let features = match fetched {
        Ok(features) => features,
        Err(e) => {
            warn!("[amenity] no amenities available ({e}); accessibility will be 0 everywhere");
            return Ok(AmenityPool::default());
        }
    };

    let points = features.iter()
        .map(|feature| projector.forward(feature))
        .collect::<Result<Vec<Geometry<f64>>>>()?
        .into_iter()
        .filter_map(|feature| feature.centroid())
        .collect::<Vec<_>>();

    info!("[amenity] loaded {} amenities", points.len());
    Ok(AmenityPool::new(points))
}
