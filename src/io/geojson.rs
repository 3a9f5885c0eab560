//! GeoJSON reading and writing of unit records.

use std::{fs::File, io::{BufReader, BufWriter, Write}, path::Path};

use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{json, Map, Value};

use crate::record::{UnitRecord, NUMERIC_COLUMNS};

/// Parse a GeoJSON geometry object into a MultiPolygon.
/// Returns `Ok(None)` for non-polygonal geometry types.
pub fn parse_geometry(geometry: &Value) -> Result<Option<MultiPolygon<f64>>> {
    let coords = geometry["coordinates"].as_array();
    match (geometry["type"].as_str(), coords) {
        (Some("Polygon"), Some(rings)) => Ok(Some(MultiPolygon(vec![parse_polygon_coords(rings)?]))),
        (Some("MultiPolygon"), Some(polygons)) => Ok(Some(MultiPolygon(
            polygons.iter()
                .map(|polygon| {
                    let rings = polygon.as_array()
                        .ok_or_else(|| anyhow!("[io::geojson] Invalid MultiPolygon: polygon is not an array"))?;
                    parse_polygon_coords(rings)
                })
                .collect::<Result<Vec<_>>>()?
        ))),
        (Some("Polygon" | "MultiPolygon"), None) => bail!("[io::geojson] Polygonal geometry without coordinates"),
        (Some(_), _) => Ok(None),
        (None, _) => bail!("[io::geojson] Geometry without a type"),
    }
}

/// Parse `[exterior, hole, hole, ...]` ring arrays into a Polygon.
fn parse_polygon_coords(rings: &[Value]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter()
        .map(|ring| {
            let ring = ring.as_array()
                .ok_or_else(|| anyhow!("[io::geojson] Invalid ring: not an array"))?;
            parse_ring_coords(ring)
        })
        .collect::<Result<Vec<_>>>()?;
    if rings.is_empty() { bail!("[io::geojson] Invalid Polygon: missing exterior ring") }
    let exterior = rings.remove(0);
    Ok(Polygon::new(exterior, rings))
}

/// Parse a ring from `[[x, y], [x, y], ...]`, closing it if needed.
fn parse_ring_coords(coords: &[Value]) -> Result<LineString<f64>> {
    let mut points = coords.iter()
        .map(|pair| {
            let x = pair[0].as_f64().ok_or_else(|| anyhow!("[io::geojson] Invalid coordinate: x must be a number"))?;
            let y = pair[1].as_f64().ok_or_else(|| anyhow!("[io::geojson] Invalid coordinate: y must be a number"))?;
            Ok(Coord { x, y })
        })
        .collect::<Result<Vec<_>>>()?;

    // Ensure ring is closed (first point == last point)
    if !points.is_empty() && points[0] != points[points.len() - 1] {
        points.push(points[0]);
    }
    Ok(LineString(points))
}

/// GeoJSON geometry object for a MultiPolygon.
fn multipolygon_json(mp: &MultiPolygon<f64>) -> Value {
    let ring = |ls: &LineString<f64>| ls.coords().map(|c| json!([c.x, c.y])).collect::<Vec<_>>();
    let polygons = mp.0.iter()
        .map(|polygon| std::iter::once(ring(polygon.exterior()))
            .chain(polygon.interiors().iter().map(ring))
            .collect::<Vec<_>>())
        .collect::<Vec<_>>();
    json!({ "type": "MultiPolygon", "coordinates": polygons })
}

/// Build a FeatureCollection with one feature per unit record.
pub fn units_to_geojson(records: &[UnitRecord]) -> Value {
    let features = records.iter()
        .map(|record| {
            let mut properties = Map::new();
            properties.insert("unit_id".into(), json!(record.unit_id));
            properties.insert("kelurahan".into(), json!(record.kelurahan));
            properties.insert("kecamatan".into(), json!(record.kecamatan));
            for (column, value) in NUMERIC_COLUMNS.iter().zip(record.numeric_values()) {
                properties.insert((*column).into(), json!(value));
            }
            json!({
                "type": "Feature",
                "geometry": multipolygon_json(&record.geometry),
                "properties": properties,
            })
        })
        .collect::<Vec<_>>();

    json!({ "type": "FeatureCollection", "features": features })
}

/// Parse unit records from a FeatureCollection written by [`units_to_geojson`].
pub fn units_from_geojson(document: &Value) -> Result<Vec<UnitRecord>> {
    let features = document["features"].as_array()
        .ok_or_else(|| anyhow!("[io::geojson] Document has no features array"))?;

    features.iter().enumerate()
        .map(|(i, feature)| {
            let properties = &feature["properties"];
            let text = |key: &str| properties[key].as_str()
                .map(str::to_string)
                .ok_or_else(|| anyhow!("[io::geojson] Feature {i} is missing string property {key:?}"));

            let mut values = [0.0; 9];
            for (value, column) in values.iter_mut().zip(NUMERIC_COLUMNS) {
                *value = properties[column].as_f64()
                    .ok_or_else(|| anyhow!("[io::geojson] Feature {i} is missing numeric property {column:?}"))?;
            }

            Ok(UnitRecord {
                unit_id: properties["unit_id"].as_u64().map_or(i, |id| id as usize),
                kelurahan: text("kelurahan")?,
                kecamatan: text("kecamatan")?,
                geometry: parse_geometry(&feature["geometry"])?.unwrap_or_else(|| MultiPolygon(Vec::new())),
                metrics: UnitRecord::bundle_from_values(values),
            })
        })
        .collect()
}

/// Write unit records to a GeoJSON file.
pub fn write_units_geojson(records: &[UnitRecord], path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("[io::geojson] Failed to create GeoJSON file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &units_to_geojson(records))
        .with_context(|| format!("[io::geojson] Failed to write GeoJSON to {:?}", path))?;
    writer.flush()?;
    Ok(())
}

/// Read unit records from a GeoJSON file.
pub fn read_units_geojson(path: &Path) -> Result<Vec<UnitRecord>> {
    let file = File::open(path)
        .with_context(|| format!("[io::geojson] Failed to open GeoJSON file: {}", path.display()))?;
    let document: Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("[io::geojson] Failed to parse GeoJSON from {:?}", path))?;
    units_from_geojson(&document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    use crate::score::MetricBundle;

    #[test]
    fn parses_polygon_and_multipolygon() {
        let polygon = json!({"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]});
        let mp = parse_geometry(&polygon).unwrap().unwrap();
        assert_eq!(mp.0.len(), 1);
        assert_eq!(mp.0[0].exterior().0.len(), 4);

        let multi = json!({"type": "MultiPolygon", "coordinates": [
            [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]],
            [[[5.0, 5.0], [6.0, 5.0], [6.0, 6.0], [5.0, 5.0]], [[5.1, 5.1], [5.2, 5.1], [5.2, 5.2], [5.1, 5.1]]]
        ]});
        let mp = parse_geometry(&multi).unwrap().unwrap();
        assert_eq!(mp.0.len(), 2);
        assert_eq!(mp.0[0].exterior().0.len(), 4, "open ring is closed");
        assert_eq!(mp.0[1].interiors().len(), 1);
    }

    #[test]
    fn non_polygonal_geometry_is_none() {
        assert!(parse_geometry(&json!({"type": "Point", "coordinates": [1.0, 2.0]})).unwrap().is_none());
        assert!(parse_geometry(&json!({"coordinates": []})).is_err());
    }

    #[test]
    fn records_survive_a_file_round_trip() {
        let mut metrics = MetricBundle::default();
        metrics.raw.sidewalk_pct = 25.0;
        metrics.normalized.n_block = 100.0;
        metrics.score = 31.25;
        let records = vec![UnitRecord {
            unit_id: 0,
            kelurahan: "Dago".into(),
            kecamatan: "Coblong".into(),
            geometry: MultiPolygon(vec![polygon![(x: 107.6, y: -6.9), (x: 107.7, y: -6.9), (x: 107.7, y: -6.8), (x: 107.6, y: -6.9)]]),
            metrics,
        }];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("units.geojson");
        write_units_geojson(&records, &path).unwrap();
        assert_eq!(read_units_geojson(&path).unwrap(), records);
    }

    #[test]
    fn properties_carry_dashboard_keys() {
        let record = UnitRecord {
            unit_id: 3,
            kelurahan: "a".into(),
            kecamatan: "b".into(),
            geometry: MultiPolygon(Vec::new()),
            metrics: MetricBundle::default(),
        };
        let document = units_to_geojson(&[record]);
        let properties = document["features"][0]["properties"].as_object().unwrap();
        for key in ["kecamatan", "kelurahan", "score", "sidewalk_pct", "intersection_density", "amenity_pct", "avg_block_length"] {
            assert!(properties.contains_key(key), "{key}");
        }
        assert_eq!(properties["unit_id"], json!(3));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = read_units_geojson(Path::new("/nonexistent/walkability.geojson")).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to open GeoJSON file"));
    }
}
