use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{amenity::AmenityPool, assign::Assignment, network::{StreetEdge, StreetNetwork, StreetNode}};

/// Minimum degree for a node to count as an intersection.
pub const INTERSECTION_MIN_DEGREE: u32 = 3;

const PROGRESS_EVERY: usize = 50;

/// The four raw walkability metrics of one unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMetrics {
    /// Nodes of degree ≥ 3 per km².
    pub intersection_density: f64,
    /// Mean edge length in meters.
    pub avg_block_length: f64,
    /// Share of edge length with a sidewalk, in percent.
    pub sidewalk_pct: f64,
    /// Share of nodes within the walk buffer of an amenity, in percent.
    pub amenity_pct: f64,
}

/// Intersections per km²; zero for a zero-area unit.
pub fn intersection_density<'a>(nodes: impl IntoIterator<Item = &'a StreetNode>, area_m2: f64) -> f64 {
    let area_km2 = area_m2 / 1e6;
    if area_km2 <= 0.0 { return 0.0 }
    let intersections = nodes.into_iter()
        .filter(|node| node.degree >= INTERSECTION_MIN_DEGREE)
        .count();
    intersections as f64 / area_km2
}

/// Mean edge length; zero without edges.
pub fn avg_block_length(edges: &[&StreetEdge]) -> f64 {
    if edges.is_empty() { return 0.0 }
    edges.iter().map(|edge| edge.length()).sum::<f64>() / edges.len() as f64
}

/// Sidewalk-bearing length over total length, in percent; zero when total length is zero.
pub fn sidewalk_pct(edges: &[&StreetEdge]) -> f64 {
    let (total, sidewalk) = edges.iter()
        .map(|edge| (edge.length(), edge.has_sidewalk()))
        .fold((0.0, 0.0), |(total, sidewalk), (length, has)| {
            (total + length, if has { sidewalk + length } else { sidewalk })
        });
    if total > 0.0 { sidewalk / total * 100.0 } else { 0.0 }
}

/// Percentage of nodes with an amenity within `radius_m`; zero if either set is empty.
pub fn amenity_pct(nodes: &[&StreetNode], amenities: &AmenityPool, radius_m: f64) -> f64 {
    if nodes.is_empty() || amenities.is_empty() { return 0.0 }
    let reachable = nodes.iter()
        .filter(|node| amenities.any_within(&node.point, radius_m))
        .count();
    reachable as f64 / nodes.len() as f64 * 100.0
}

/// Computes raw metrics per unit against a shared, read-only network and amenity pool.
#[derive(Debug, Clone, Copy)]
pub struct MetricsEngine<'a> {
    network: &'a StreetNetwork,
    amenities: &'a AmenityPool,
    buffer_m: f64,
}

impl<'a> MetricsEngine<'a> {
    pub fn new(network: &'a StreetNetwork, amenities: &'a AmenityPool, buffer_m: f64) -> Self {
        Self { network, amenities, buffer_m }
    }

    /// Metrics for one unit from its mapped node and edge indices.
    /// `None` when no nodes are mapped; such units get the all-zero bundle.
    pub fn unit_metrics(&self, area_m2: f64, node_ids: &[usize], edge_ids: &[usize]) -> Option<RawMetrics> {
        if node_ids.is_empty() { return None }

        let nodes = node_ids.iter().map(|&i| &self.network.nodes()[i]).collect::<Vec<_>>();
        let edges = edge_ids.iter().map(|&i| &self.network.edges()[i]).collect::<Vec<_>>();

        Some(RawMetrics {
            intersection_density: intersection_density(nodes.iter().copied(), area_m2),
            avg_block_length: avg_block_length(&edges),
            sidewalk_pct: sidewalk_pct(&edges),
            amenity_pct: amenity_pct(&nodes, self.amenities, self.buffer_m),
        })
    }

    /// Metrics for every unit, indexed by `unit_id` regardless of completion order.
    pub fn compute_all(&self, assignment: &Assignment, parallel: bool) -> Vec<Option<RawMetrics>> {
        let total = assignment.units.len();
        let done = AtomicUsize::new(0);

        let compute = |unit_id: usize| {
            let metrics = self.unit_metrics(
                assignment.units[unit_id].area_m2,
                &assignment.unit_nodes[unit_id],
                &assignment.unit_edges[unit_id],
            );
            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            if finished % PROGRESS_EVERY == 0 || finished == total {
                debug!("[metrics] {finished}/{total} units scored");
            }
            metrics
        };

        if parallel {
            (0..total).into_par_iter().map(compute).collect()
        } else {
            (0..total).map(compute).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, point, Point};

    use crate::network::TagValue;

    fn node(x: f64, y: f64, degree: u32) -> StreetNode {
        StreetNode { id: 0, point: point!(x: x, y: y), degree }
    }

    fn straight_edge(length: f64, sidewalk: &str, highway: &str) -> StreetEdge {
        StreetEdge {
            u: 0,
            v: 1,
            geometry: line_string![(x: 0.0, y: 0.0), (x: length, y: 0.0)],
            highway: highway.into(),
            sidewalk: sidewalk.into(),
        }
    }

    #[test]
    fn intersection_density_counts_degree_three_and_up() {
        let nodes = [node(0.0, 0.0, 1), node(0.0, 0.0, 3), node(0.0, 0.0, 4), node(0.0, 0.0, 2)];
        // 0.5 km² → 2 intersections / 0.5 = 4 per km²
        assert_eq!(intersection_density(&nodes, 500_000.0), 4.0);
        assert_eq!(intersection_density(&nodes, 0.0), 0.0);
    }

    #[test]
    fn block_length_and_sidewalk_share() {
        let a = straight_edge(100.0, "both", "residential");
        let b = straight_edge(300.0, "no", "residential");
        let edges = [&a, &b];
        assert_eq!(avg_block_length(&edges), 200.0);
        assert_eq!(sidewalk_pct(&edges), 25.0);
        assert_eq!(avg_block_length(&[]), 0.0);
        assert_eq!(sidewalk_pct(&[]), 0.0);
    }

    #[test]
    fn footway_counts_as_sidewalk() {
        let footway = straight_edge(50.0, "no", "footway");
        let road = StreetEdge { sidewalk: TagValue::Absent, ..straight_edge(50.0, "", "residential") };
        assert_eq!(sidewalk_pct(&[&footway, &road]), 50.0);
    }

    #[test]
    fn amenity_share_uses_true_distance() {
        // (300, 300) is inside the 400 m bounding box of the origin but ~424 m away.
        let pool = AmenityPool::new(vec![Point::new(300.0, 300.0)]);
        let near = node(0.0, 400.0, 1);
        let far = node(0.0, 0.0, 1);
        assert_eq!(amenity_pct(&[&near, &far], &pool, 400.0), 50.0);
    }

    #[test]
    fn amenity_share_is_monotonic_in_radius() {
        let pool = AmenityPool::new((0..20).map(|i| Point::new(i as f64 * 137.0, (i * i) as f64 * 11.0)).collect());
        let nodes = (0..30).map(|i| node(i as f64 * 97.0, i as f64 * 53.0, 1)).collect::<Vec<_>>();
        let refs = nodes.iter().collect::<Vec<_>>();

        let mut previous = 0.0;
        for radius in [0.0, 50.0, 100.0, 400.0, 800.0, 5000.0] {
            let pct = amenity_pct(&refs, &pool, radius);
            assert!(pct >= previous, "radius {radius}: {pct} < {previous}");
            previous = pct;
        }
        assert_eq!(previous, 100.0);
    }

    #[test]
    fn amenity_share_is_zero_without_amenities() {
        let n = node(0.0, 0.0, 3);
        assert_eq!(amenity_pct(&[&n], &AmenityPool::default(), 400.0), 0.0);
        assert_eq!(amenity_pct(&[], &AmenityPool::new(vec![Point::new(0.0, 0.0)]), 400.0), 0.0);
    }
}
