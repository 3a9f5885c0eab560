use geo::{BoundingRect, Coord, MultiPolygon, Rect};
use rstar::{RTreeObject, AABB};

/// A bounding box in an R-tree, associated with a MultiPolygon by index.
#[derive(Debug, Clone)]
pub(crate) struct BoundingBox {
    idx: usize, // Index of corresponding MultiPolygon in the store
    bbox: Rect<f64>,
}

impl BoundingBox {
    pub(crate) fn new(idx: usize, bbox: Rect<f64>) -> Self {
        Self { idx, bbox }
    }

    /// Get the index of the corresponding MultiPolygon.
    #[inline] pub(crate) fn idx(&self) -> usize { self.idx }
}

impl RTreeObject for BoundingBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

/// Envelope of a geo bounding rectangle.
#[inline]
pub(crate) fn envelope_of(rect: &Rect<f64>) -> AABB<[f64; 2]> {
    AABB::from_corners(rect.min().into(), rect.max().into())
}

/// Bounding rectangle covering every non-empty shape.
pub(crate) fn bounds_of<'a, I>(shapes: I) -> Option<Rect<f64>>
where I: IntoIterator<Item = &'a MultiPolygon<f64>> {
    shapes.into_iter()
        .filter_map(|shape| shape.bounding_rect())
        .reduce(|a, b| Rect::new(
            Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
            Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
        ))
}
