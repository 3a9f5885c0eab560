use geo::{Area, InteriorPoint, MultiPolygon};
use tracing::info;

use crate::{admin::NamedArea, geom::Geometries, network::StreetNetwork};

/// District label for units whose representative point lies in no district.
pub const UNKNOWN_DISTRICT: &str = "Unknown";

/// An administrative unit: the scoring grain.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    /// Dense 0-based id, equal to the unit's position in the unit list.
    pub unit_id: usize,
    pub name: String,
    pub district: String,
    /// Planar geometry.
    pub geometry: MultiPolygon<f64>,
    pub area_m2: f64,
}

/// Units plus their node and edge memberships.
#[derive(Debug, Clone, Default)]
pub struct Assignment {
    pub units: Vec<Unit>,
    /// Indices into the network's node table, ascending, per unit.
    pub unit_nodes: Vec<Vec<usize>>,
    /// Indices into the network's edge table, ascending, per unit.
    pub unit_edges: Vec<Vec<usize>>,
}

/// Number the units and label each with the first district containing its representative point.
pub fn build_units(units: Vec<NamedArea>, districts: &[NamedArea]) -> Vec<Unit> {
    let district_index = Geometries::new(districts.iter().map(|d| d.geometry.clone()).collect());

    units.into_iter().enumerate()
        .map(|(unit_id, area)| {
            let district = area.geometry.interior_point()
                .and_then(|point| district_index.first_containing(&point))
                .map_or_else(|| UNKNOWN_DISTRICT.to_string(), |i| districts[i].name.clone());
            Unit {
                unit_id,
                area_m2: area.geometry.unsigned_area(),
                name: area.name,
                district,
                geometry: area.geometry,
            }
        })
        .collect()
}

/// Map every node and edge onto each unit it intersects. Boundary features count for every
/// unit they touch; features outside all units are left unmapped.
pub fn assign_network(units: Vec<Unit>, network: &StreetNetwork) -> Assignment {
    let index = Geometries::new(units.iter().map(|unit| unit.geometry.clone()).collect());
    let mut unit_nodes = vec![Vec::new(); units.len()];
    let mut unit_edges = vec![Vec::new(); units.len()];

    for (i, node) in network.nodes().iter().enumerate() {
        for unit in index.intersecting_point(&node.point) { unit_nodes[unit].push(i) }
    }
    for (i, edge) in network.edges().iter().enumerate() {
        for unit in index.intersecting_line(&edge.geometry) { unit_edges[unit].push(i) }
    }

    info!(
        "[assign] mapped {} node and {} edge memberships onto {} units",
        unit_nodes.iter().map(Vec::len).sum::<usize>(),
        unit_edges.iter().map(Vec::len).sum::<usize>(),
        units.len(),
    );

    Assignment { units, unit_nodes, unit_edges }
}
