use ahash::AHashMap;
use anyhow::Result;
use geo::{Euclidean, Length, LineString, Point};

use crate::{geom::Projector, network::{has_sidewalk, TagValue}};

/// A street-graph vertex as delivered by the graph provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RawNode {
    pub id: i64,
    pub point: Point<f64>,
}

/// A street-graph edge between two node ids, with its way geometry and tags.
#[derive(Debug, Clone, PartialEq)]
pub struct StreetEdge {
    pub u: i64,
    pub v: i64,
    pub geometry: LineString<f64>,
    pub highway: TagValue,
    pub sidewalk: TagValue,
}

impl StreetEdge {
    /// Planar length of the edge geometry (meters once projected).
    #[inline] pub fn length(&self) -> f64 { Euclidean.length(&self.geometry) }

    /// Whether the edge counts towards sidewalk coverage.
    #[inline] pub fn has_sidewalk(&self) -> bool { has_sidewalk(&self.sidewalk, &self.highway) }
}

/// The pedestrian graph as fetched, before degree augmentation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawStreetGraph {
    pub nodes: Vec<RawNode>,
    pub edges: Vec<StreetEdge>,
}

/// A street node augmented with its degree in the full fetched graph.
#[derive(Debug, Clone, PartialEq)]
pub struct StreetNode {
    pub id: i64,
    pub point: Point<f64>,
    pub degree: u32,
}

/// Node and edge tables of the street graph.
#[derive(Debug, Clone, Default)]
pub struct StreetNetwork {
    nodes: Vec<StreetNode>,
    edges: Vec<StreetEdge>,
}

impl StreetNetwork {
    /// Build the node/edge tables, computing each node's degree over the whole graph.
    /// A self-loop contributes two to the degree of its node.
    pub fn from_graph(graph: RawStreetGraph) -> Self {
        let mut degree: AHashMap<i64, u32> = AHashMap::with_capacity(graph.nodes.len());
        for edge in &graph.edges {
            *degree.entry(edge.u).or_default() += 1;
            *degree.entry(edge.v).or_default() += 1;
        }

        let nodes = graph.nodes.into_iter()
            .map(|node| StreetNode {
                degree: degree.get(&node.id).copied().unwrap_or(0),
                id: node.id,
                point: node.point,
            })
            .collect();

        Self { nodes, edges: graph.edges }
    }

    /// Reproject all node and edge geometries with `projector`.
    pub fn project(self, projector: &Projector) -> Result<Self> {
        Ok(Self {
            nodes: self.nodes.into_iter()
                .map(|node| Ok(StreetNode { point: projector.forward(&node.point)?, ..node }))
                .collect::<Result<_>>()?,
            edges: self.edges.into_iter()
                .map(|edge| Ok(StreetEdge { geometry: projector.forward(&edge.geometry)?, ..edge }))
                .collect::<Result<_>>()?,
        })
    }

    #[inline] pub fn nodes(&self) -> &[StreetNode] { &self.nodes }

    #[inline] pub fn edges(&self) -> &[StreetEdge] { &self.edges }

    #[inline] pub fn node_count(&self) -> usize { self.nodes.len() }

    #[inline] pub fn edge_count(&self) -> usize { self.edges.len() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, point};

    fn edge(u: i64, v: i64, geometry: LineString<f64>) -> StreetEdge {
        StreetEdge { u, v, geometry, highway: "residential".into(), sidewalk: TagValue::Absent }
    }

    fn node(id: i64, x: f64, y: f64) -> RawNode {
        RawNode { id, point: point!(x: x, y: y) }
    }

    /// A star around node 0 plus a dangling node 9 with no edges.
    fn star_graph() -> RawStreetGraph {
        RawStreetGraph {
            nodes: vec![node(0, 0.0, 0.0), node(1, 1.0, 0.0), node(2, 0.0, 1.0), node(3, -1.0, 0.0), node(9, 5.0, 5.0)],
            edges: vec![
                edge(0, 1, line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)]),
                edge(0, 2, line_string![(x: 0.0, y: 0.0), (x: 0.0, y: 1.0)]),
                edge(0, 3, line_string![(x: 0.0, y: 0.0), (x: -1.0, y: 0.0)]),
            ],
        }
    }

    #[test]
    fn degree_counts_incident_edges() {
        let network = StreetNetwork::from_graph(star_graph());
        let degrees = network.nodes().iter().map(|n| (n.id, n.degree)).collect::<Vec<_>>();
        assert_eq!(degrees, vec![(0, 3), (1, 1), (2, 1), (3, 1), (9, 0)]);
    }

    #[test]
    fn self_loop_counts_twice() {
        let network = StreetNetwork::from_graph(RawStreetGraph {
            nodes: vec![node(7, 0.0, 0.0)],
            edges: vec![edge(7, 7, line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0)])],
        });
        assert_eq!(network.nodes()[0].degree, 2);
    }

    #[test]
    fn edge_length_is_planar() {
        let e = edge(0, 1, line_string![(x: 0.0, y: 0.0), (x: 3.0, y: 4.0), (x: 3.0, y: 10.0)]);
        assert_eq!(e.length(), 11.0);
    }

    #[test]
    fn empty_graph_is_valid() {
        let network = StreetNetwork::from_graph(RawStreetGraph::default());
        assert_eq!(network.node_count(), 0);
        assert_eq!(network.edge_count(), 0);
    }
}
