//! Ring assembly for relation-style polygons delivered as loose member ways.

use ahash::{AHashMap, AHashSet};
use geo::{Contains, Coord, LineString, MultiPolygon, Polygon};

/// Quantization scale (1e-7 deg ≈ 1 cm at equator).
const Q_SCALE: f64 = 1e7;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
struct QuantizedPoint(i64, i64);

#[inline]
fn qpt(c: &Coord<f64>) -> QuantizedPoint {
    QuantizedPoint((c.x * Q_SCALE).round() as i64, (c.y * Q_SCALE).round() as i64)
}

/// Undirected segment stored with canonical (min,max) endpoint order.
#[inline]
fn seg_norm(a: QuantizedPoint, b: QuantizedPoint) -> (QuantizedPoint, QuantizedPoint) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Stitch open or closed polylines into closed rings.
///
/// Polylines are broken into undirected segments; a segment shared by two inputs is kept once.
/// Walks that fail to return to their start are discarded, as are rings with fewer than
/// three distinct vertices.
pub fn stitch_rings(parts: &[LineString<f64>]) -> Vec<LineString<f64>> {
    let mut ptmap: AHashMap<QuantizedPoint, Coord<f64>> = AHashMap::new();
    let mut segments: AHashSet<(QuantizedPoint, QuantizedPoint)> = AHashSet::new();
    for part in parts {
        for window in part.0.windows(2) {
            let (qa, qb) = (qpt(&window[0]), qpt(&window[1]));
            if qa == qb { continue }
            ptmap.entry(qa).or_insert(window[0]);
            ptmap.entry(qb).or_insert(window[1]);
            segments.insert(seg_norm(qa, qb));
        }
    }

    // adjacency (multi-graph): QPt -> neighbors, sorted for deterministic walks
    let mut ordered = segments.into_iter().collect::<Vec<_>>();
    ordered.sort_unstable();
    let mut adj: AHashMap<QuantizedPoint, Vec<QuantizedPoint>> = AHashMap::new();
    for &(a, b) in &ordered {
        adj.entry(a).or_default().push(b);
        adj.entry(b).or_default().push(a);
    }

    let remove_edge = |a: QuantizedPoint, b: QuantizedPoint, adj: &mut AHashMap<QuantizedPoint, Vec<QuantizedPoint>>| {
        for (from, to) in [(a, b), (b, a)] {
            if let Some(v) = adj.get_mut(&from) {
                if let Some(pos) = v.iter().position(|&x| x == to) { v.remove(pos); }
            }
        }
    };

    let mut starts = adj.keys().copied().collect::<Vec<_>>();
    starts.sort_unstable();

    let mut rings = Vec::new();
    for start in starts {
        while let Some(&first) = adj.get(&start).and_then(|v| v.first()) {
            let mut ring_q = vec![start];
            remove_edge(start, first, &mut adj);
            let (mut prev, mut curr) = (start, first);
            let mut closed = curr == start;

            while !closed {
                ring_q.push(curr);
                let Some(next) = adj.get(&curr).and_then(|v| {
                    // Prefer continuing direction (avoid going back)
                    v.iter().copied().find(|&u| u != prev).or_else(|| v.first().copied())
                }) else { break };
                remove_edge(curr, next, &mut adj);
                prev = curr;
                curr = next;
                closed = curr == start;
            }

            if closed && ring_q.len() >= 3 {
                let mut coords = ring_q.iter().map(|q| ptmap[q]).collect::<Vec<_>>();
                coords.push(coords[0]);
                rings.push(LineString(coords));
            }
        }
    }

    rings
}

/// Build a MultiPolygon from outer and inner member ways.
/// Each inner ring is attached to the first outer ring that contains it; orphans are dropped.
pub fn assemble_multipolygon(outer: &[LineString<f64>], inner: &[LineString<f64>]) -> Option<MultiPolygon<f64>> {
    let exteriors = stitch_rings(outer);
    if exteriors.is_empty() { return None }

    let mut polygons = exteriors.into_iter()
        .map(|ring| Polygon::new(ring, Vec::new()))
        .collect::<Vec<_>>();

    for hole in stitch_rings(inner) {
        let Some(owner) = polygons.iter().position(|polygon| {
            let shell = Polygon::new(polygon.exterior().clone(), Vec::new());
            shell.contains(&hole)
        }) else { continue };
        polygons[owner].interiors_push(hole);
    }

    Some(MultiPolygon(polygons))
}
