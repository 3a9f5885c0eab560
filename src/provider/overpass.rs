//! Overpass API query construction and response decoding.

use ahash::{AHashMap, AHashSet};
use geo::{BoundingRect, Coord, Geometry, Intersects, LineString, MultiLineString, MultiPolygon, Point, Polygon};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    geom::assemble_multipolygon,
    network::{RawNode, RawStreetGraph, StreetEdge, TagValue},
    provider::AdminFeature,
};

/// Highway values excluded from the walk network: the osmnx "walk" set plus trunk roads,
/// escape lanes and busways.
const NON_WALKABLE_HIGHWAYS: &str = "abandoned|bus_guideway|construction|cycleway|motor|no|planned|platform|proposed|raceway|razed|motorway|motorway_link|trunk|trunk_link|escape|busway";

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    #[inline] fn coord(&self) -> Coord<f64> { Coord { x: self.lon, y: self.lat } }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeElement {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub tags: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WayElement {
    pub id: i64,
    #[serde(default)]
    pub nodes: Vec<i64>,
    #[serde(default)]
    pub tags: Map<String, Value>,
    pub center: Option<LatLon>,
    #[serde(default)]
    pub geometry: Vec<LatLon>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub geometry: Vec<LatLon>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelationElement {
    pub id: i64,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub tags: Map<String, Value>,
    pub center: Option<LatLon>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Node(NodeElement),
    Way(WayElement),
    Relation(RelationElement),
    #[serde(other)]
    Other,
}

/// Top-level Overpass JSON document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<Element>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Overpass bounding-box filter `(south,west,north,east)` for a lon/lat polygon.
pub(crate) fn bbox_filter(boundary: &MultiPolygon<f64>) -> Option<String> {
    let rect = boundary.bounding_rect()?;
    Some(format!("({},{},{},{})", rect.min().y, rect.min().x, rect.max().y, rect.max().x))
}

pub(crate) fn admin_query(bbox: &str, levels: &[&str], timeout_secs: u64) -> String {
    format!(
        r#"[out:json][timeout:{timeout_secs}];relation["boundary"="administrative"]["admin_level"~"^({})$"]{bbox};out geom;"#,
        levels.join("|"),
    )
}

pub(crate) fn walk_query(bbox: &str, timeout_secs: u64) -> String {
    format!(
        concat!(
            r#"[out:json][timeout:{timeout}];"#,
            r#"way["highway"]["area"!~"yes"]["highway"!~"{excluded}"]["foot"!~"no"]["service"!~"private"]["access"!~"private"]{bbox};"#,
            r#"(._;>;);out;"#,
        ),
        timeout = timeout_secs, excluded = NON_WALKABLE_HIGHWAYS, bbox = bbox,
    )
}

pub(crate) fn poi_query_bbox(bbox: &str, keys: &[&str], timeout_secs: u64) -> String {
    let union = keys.iter()
        .map(|key| format!(r#"nwr["{key}"]{bbox};"#))
        .collect::<String>();
    format!("[out:json][timeout:{timeout_secs}];({union});out geom;")
}

/// POI query scoped to the administrative area named by the first component of `place`.
pub(crate) fn poi_query_place(place: &str, keys: &[&str], timeout_secs: u64) -> String {
    let name = place.split(',').next().unwrap_or(place).trim().replace('"', "\\\"");
    let union = keys.iter()
        .map(|key| format!(r#"nwr["{key}"](area.searchArea);"#))
        .collect::<String>();
    format!(r#"[out:json][timeout:{timeout_secs}];area["name"="{name}"]["boundary"="administrative"]->.searchArea;({union});out geom;"#)
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

fn tag_str(tags: &Map<String, Value>, key: &str) -> Option<String> {
    match TagValue::from_json(tags.get(key)) {
        TagValue::Absent => None,
        value => Some(value.first_or("").to_string()),
    }
}

fn line(points: &[LatLon]) -> LineString<f64> {
    points.iter().map(LatLon::coord).collect()
}

#[inline]
fn is_closed(points: &[LatLon]) -> bool {
    points.len() >= 4 && points.first() == points.last()
}

/// Assemble a relation's `outer`/`inner` member ways into a MultiPolygon.
fn relation_polygon(relation: &RelationElement) -> Option<MultiPolygon<f64>> {
    let ways = relation.members.iter()
        .filter(|member| member.kind == "way" && member.geometry.len() >= 2);
    let (inner, outer): (Vec<_>, Vec<_>) = ways.partition(|member| member.role == "inner");
    let outer = outer.iter().map(|member| line(&member.geometry)).collect::<Vec<_>>();
    let inner = inner.iter().map(|member| line(&member.geometry)).collect::<Vec<_>>();
    assemble_multipolygon(&outer, &inner)
}

/// Decode administrative relations (and closed boundary ways) into polygon features.
/// Relations whose member ways do not close into rings are skipped.
pub fn parse_admin_features(response: &OverpassResponse) -> Vec<AdminFeature> {
    response.elements.iter()
        .filter_map(|element| {
            let (tags, geometry) = match element {
                Element::Relation(relation) => {
                    let Some(geometry) = relation_polygon(relation) else {
                        debug!("[provider::overpass] relation {} has no closed outer ring; skipped", relation.id);
                        return None;
                    };
                    (&relation.tags, Geometry::MultiPolygon(geometry))
                }
                Element::Way(way) if is_closed(&way.geometry) => {
                    (&way.tags, Geometry::Polygon(Polygon::new(line(&way.geometry), Vec::new())))
                }
                _ => return None,
            };
            Some(AdminFeature {
                name: tag_str(tags, "name"),
                admin_level: tag_str(tags, "admin_level"),
                geometry,
            })
        })
        .collect()
}

/// Decode ways and their nodes into a street graph clipped to `boundary`.
///
/// Nodes outside the boundary are dropped first, cutting each way into runs of consecutive
/// inside nodes. Runs are then split at their endpoints and at every node referenced more than
/// once across all runs, so each edge runs between two junctions or dead ends of the clipped
/// graph. Only split nodes become graph nodes; ways referencing unknown nodes are skipped.
pub fn parse_street_graph(response: &OverpassResponse, boundary: &MultiPolygon<f64>) -> RawStreetGraph {
    let coords = response.elements.iter()
        .filter_map(|element| match element {
            Element::Node(node) => Some((node.id, Coord { x: node.lon, y: node.lat })),
            _ => None,
        })
        .collect::<AHashMap<_, _>>();

    let ways = response.elements.iter()
        .filter_map(|element| match element {
            Element::Way(way) if way.nodes.len() >= 2 => Some(way),
            _ => None,
        })
        .filter(|way| {
            let complete = way.nodes.iter().all(|id| coords.contains_key(id));
            if !complete { debug!("[provider::overpass] way {} references missing nodes; skipped", way.id) }
            complete
        })
        .collect::<Vec<_>>();

    let inside = ways.iter()
        .flat_map(|way| way.nodes.iter().copied())
        .filter(|id| boundary.intersects(&Point(coords[id])))
        .collect::<AHashSet<_>>();

    let runs = ways.iter()
        .flat_map(|way| way.nodes
            .split(|id| !inside.contains(id))
            .filter(|run| run.len() >= 2)
            .map(move |run| (*way, run)))
        .collect::<Vec<_>>();
    let clipped = ways.iter().map(|way| way.nodes.len()).sum::<usize>()
        - runs.iter().map(|(_, run)| run.len()).sum::<usize>();
    if clipped > 0 { debug!("[provider::overpass] clipped {clipped} way node references outside the boundary") }

    let mut references: AHashMap<i64, u32> = AHashMap::new();
    let mut split = AHashSet::new();
    for (_, run) in &runs {
        for id in *run { *references.entry(*id).or_default() += 1; }
        split.insert(run[0]);
        split.insert(run[run.len() - 1]);
    }
    split.extend(references.iter().filter(|&(_, &count)| count >= 2).map(|(&id, _)| id));

    let mut edges = Vec::new();
    for (way, run) in &runs {
        let highway = TagValue::from_json(way.tags.get("highway"));
        let sidewalk = TagValue::from_json(way.tags.get("sidewalk"));

        let mut start = run[0];
        let mut geometry = vec![coords[&start]];
        for &id in &run[1..] {
            geometry.push(coords[&id]);
            if split.contains(&id) {
                edges.push(StreetEdge {
                    u: start,
                    v: id,
                    geometry: LineString(std::mem::take(&mut geometry)),
                    highway: highway.clone(),
                    sidewalk: sidewalk.clone(),
                });
                start = id;
                geometry.push(coords[&id]);
            }
        }
    }

    let mut node_ids = edges.iter()
        .flat_map(|edge| [edge.u, edge.v])
        .collect::<Vec<_>>();
    node_ids.sort_unstable();
    node_ids.dedup();

    RawStreetGraph {
        nodes: node_ids.into_iter()
            .map(|id| RawNode { id, point: Point(coords[&id]) })
            .collect(),
        edges,
    }
}

/// Decode POI elements fetched with `out geom` to their geometries.
///
/// Nodes become points, closed ways polygons and open ways lines. Relations assemble into
/// polygons when their member ways close, and otherwise keep the member ways as lines.
/// Elements without geometry fall back to their Overpass center when one is present.
pub fn parse_points(response: &OverpassResponse) -> Vec<Geometry<f64>> {
    response.elements.iter()
        .filter_map(|element| match element {
            Element::Node(node) => Some(Geometry::Point(Point::new(node.lon, node.lat))),
            Element::Way(way) => match way.geometry.len() {
                _ if is_closed(&way.geometry) => Some(Geometry::Polygon(Polygon::new(line(&way.geometry), Vec::new()))),
                2.. => Some(Geometry::LineString(line(&way.geometry))),
                1 => Some(Geometry::Point(Point(way.geometry[0].coord()))),
                0 => way.center.map(|c| Geometry::Point(Point(c.coord()))),
            },
            Element::Relation(relation) => {
                if let Some(polygon) = relation_polygon(relation) {
                    return Some(Geometry::MultiPolygon(polygon));
                }
                let lines = relation.members.iter()
                    .filter(|member| member.kind == "way" && member.geometry.len() >= 2)
                    .map(|member| line(&member.geometry))
                    .collect::<Vec<_>>();
                if !lines.is_empty() {
                    return Some(Geometry::MultiLineString(MultiLineString(lines)));
                }
                let center = relation.center.map(|c| Geometry::Point(Point(c.coord())));
                if center.is_none() { debug!("[provider::overpass] relation {} has no geometry; skipped", relation.id) }
                center
            }
            Element::Other => None,
        })
        .collect()
}
