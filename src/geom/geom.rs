use geo::{BoundingRect, Contains, Intersects, LineString, MultiPolygon, Point};
use rstar::{RTree, AABB};

use crate::geom::{bbox::envelope_of, BoundingBox};

/// Geometries represents a collection of MultiPolygons indexed by an R-tree over their bounds.
#[derive(Debug, Clone)]
pub struct Geometries {
    shapes: Vec<MultiPolygon<f64>>,
    rtree: RTree<BoundingBox>,
}

impl Geometries {
    /// Construct a Geometries object from a vector of MultiPolygons.
    /// Empty shapes have no bounds and are never returned by queries.
    pub fn new(polygons: Vec<MultiPolygon<f64>>) -> Self {
        Self {
            rtree: RTree::bulk_load(
                polygons.iter().enumerate()
                    .filter_map(|(i, polygon)| polygon.bounding_rect().map(|rect| BoundingBox::new(i, rect)))
                    .collect()
            ),
            shapes: polygons,
        }
    }

    /// Indices of shapes whose bounding box intersects `envelope`, in ascending order.
    pub(crate) fn query_indices(&self, envelope: &AABB<[f64; 2]>) -> Vec<usize> {
        let mut indices = self.rtree.locate_in_envelope_intersecting(envelope)
            .map(BoundingBox::idx)
            .collect::<Vec<_>>();
        indices.sort_unstable();
        indices
    }

    /// Indices of all shapes intersecting the point (boundary included), ascending.
    pub fn intersecting_point(&self, point: &Point<f64>) -> Vec<usize> {
        let coord: [f64; 2] = point.0.into();
        self.query_indices(&AABB::from_point(coord)).into_iter()
            .filter(|&i| self.shapes[i].intersects(point))
            .collect()
    }

    /// Indices of all shapes intersecting the line string, ascending.
    pub fn intersecting_line(&self, line: &LineString<f64>) -> Vec<usize> {
        let Some(rect) = line.bounding_rect() else { return Vec::new() };
        self.query_indices(&envelope_of(&rect)).into_iter()
            .filter(|&i| self.shapes[i].intersects(line))
            .collect()
    }

    /// Lowest index of a shape strictly containing the point, if any.
    pub fn first_containing(&self, point: &Point<f64>) -> Option<usize> {
        let coord: [f64; 2] = point.0.into();
        self.query_indices(&AABB::from_point(coord)).into_iter()
            .find(|&i| self.shapes[i].contains(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, polygon, point};

    fn square(x0: f64, y0: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: x0, y: y0), (x: x0 + size, y: y0), (x: x0 + size, y: y0 + size), (x: x0, y: y0 + size), (x: x0, y: y0),
        ]])
    }

    fn two_squares() -> Geometries {
        Geometries::new(vec![square(0.0, 0.0, 10.0), square(10.0, 0.0, 10.0)])
    }

    #[test]
    fn point_on_shared_edge_intersects_both() {
        let geoms = two_squares();
        assert_eq!(geoms.intersecting_point(&point!(x: 10.0, y: 5.0)), vec![0, 1]);
        assert_eq!(geoms.intersecting_point(&point!(x: 5.0, y: 5.0)), vec![0]);
        assert!(geoms.intersecting_point(&point!(x: 50.0, y: 5.0)).is_empty());
    }

    #[test]
    fn point_on_shared_edge_is_contained_by_neither() {
        let geoms = two_squares();
        assert_eq!(geoms.first_containing(&point!(x: 10.0, y: 5.0)), None);
        assert_eq!(geoms.first_containing(&point!(x: 15.0, y: 5.0)), Some(1));
    }

    #[test]
    fn first_containing_prefers_lowest_index_on_overlap() {
        let geoms = Geometries::new(vec![square(0.0, 0.0, 10.0), square(0.0, 0.0, 10.0)]);
        assert_eq!(geoms.first_containing(&point!(x: 5.0, y: 5.0)), Some(0));
    }

    #[test]
    fn crossing_line_intersects_both() {
        let geoms = two_squares();
        let line = line_string![(x: 5.0, y: 5.0), (x: 15.0, y: 5.0)];
        assert_eq!(geoms.intersecting_line(&line), vec![0, 1]);

        let outside = line_string![(x: 30.0, y: 5.0), (x: 40.0, y: 5.0)];
        assert!(geoms.intersecting_line(&outside).is_empty());
    }
}
