use std::collections::HashMap;

use anyhow::{bail, ensure, Result};
use geo::MultiPolygon;

use crate::{metrics::RawMetrics, score::{MetricBundle, SubScores}};

/// Numeric attribute columns shared by every output artifact, in output order.
pub const NUMERIC_COLUMNS: [&str; 9] = [
    "intersection_density",
    "avg_block_length",
    "sidewalk_pct",
    "amenity_pct",
    "n_int",
    "n_block",
    "n_sidewalk",
    "n_amenity",
    "score",
];

/// One persisted administrative unit.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitRecord {
    pub unit_id: usize,
    pub kelurahan: String,
    pub kecamatan: String,
    /// Geographic (lon/lat) geometry.
    pub geometry: MultiPolygon<f64>,
    pub metrics: MetricBundle,
}

impl UnitRecord {
    /// Values for [`NUMERIC_COLUMNS`], in the same order.
    pub fn numeric_values(&self) -> [f64; 9] {
        let MetricBundle { raw, normalized, score } = &self.metrics;
        [
            raw.intersection_density,
            raw.avg_block_length,
            raw.sidewalk_pct,
            raw.amenity_pct,
            normalized.n_int,
            normalized.n_block,
            normalized.n_sidewalk,
            normalized.n_amenity,
            *score,
        ]
    }

    /// Rebuild the metric bundle from [`NUMERIC_COLUMNS`]-ordered values.
    pub fn bundle_from_values(values: [f64; 9]) -> MetricBundle {
        let [intersection_density, avg_block_length, sidewalk_pct, amenity_pct, n_int, n_block, n_sidewalk, n_amenity, score] = values;
        MetricBundle {
            raw: RawMetrics { intersection_density, avg_block_length, sidewalk_pct, amenity_pct },
            normalized: SubScores { n_int, n_block, n_sidewalk, n_amenity },
            score,
        }
    }
}

/// Make `kelurahan` unique within each `kecamatan` by suffixing repeats with ` (n)`,
/// in `unit_id` order. Record count is unchanged.
pub fn disambiguate_names(records: &mut [UnitRecord]) -> usize {
    let mut seen: HashMap<(String, String), usize> = HashMap::new();
    let mut renamed = 0;
    for record in records.iter_mut() {
        let count = seen.entry((record.kecamatan.clone(), record.kelurahan.clone())).or_default();
        *count += 1;
        if *count > 1 {
            record.kelurahan = format!("{} ({})", record.kelurahan, count);
            renamed += 1;
        }
    }
    renamed
}

/// Check the guarantees the dashboard relies on.
pub fn validate_records(records: &[UnitRecord]) -> Result<()> {
    ensure!(!records.is_empty(), "[record] No unit records to write");

    let mut names: HashMap<(&str, &str), usize> = HashMap::new();
    for record in records {
        if let Some(other) = names.insert((record.kecamatan.as_str(), record.kelurahan.as_str()), record.unit_id) {
            bail!("[record] Units {} and {} share name {:?} in district {:?}",
                other, record.unit_id, record.kelurahan, record.kecamatan);
        }
        for (column, value) in NUMERIC_COLUMNS.iter().zip(record.numeric_values()) {
            ensure!(value.is_finite(), "[record] Unit {} has non-finite {column}: {value}", record.unit_id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(unit_id: usize, kelurahan: &str, kecamatan: &str) -> UnitRecord {
        UnitRecord {
            unit_id,
            kelurahan: kelurahan.into(),
            kecamatan: kecamatan.into(),
            geometry: MultiPolygon(Vec::new()),
            metrics: MetricBundle::default(),
        }
    }

    #[test]
    fn values_follow_column_order() {
        let mut r = record(0, "a", "x");
        r.metrics.raw.avg_block_length = 120.0;
        r.metrics.normalized.n_amenity = 7.0;
        r.metrics.score = 42.0;
        let values = r.numeric_values();
        assert_eq!(values[NUMERIC_COLUMNS.iter().position(|c| *c == "avg_block_length").unwrap()], 120.0);
        assert_eq!(values[NUMERIC_COLUMNS.iter().position(|c| *c == "n_amenity").unwrap()], 7.0);
        assert_eq!(values[8], 42.0);
        assert_eq!(UnitRecord::bundle_from_values(values), r.metrics);
    }

    #[test]
    fn duplicates_within_district_are_suffixed() {
        let mut records = vec![record(0, "Cibeunying", "X"), record(1, "Cibeunying", "X"), record(2, "Cibeunying", "Y")];
        assert_eq!(disambiguate_names(&mut records), 1);
        assert_eq!(records[1].kelurahan, "Cibeunying (2)");
        assert_eq!(records[2].kelurahan, "Cibeunying");
        assert!(validate_records(&records).is_ok());
    }

    #[test]
    fn validation_rejects_bad_records() {
        assert!(validate_records(&[]).is_err());
        assert!(validate_records(&[record(0, "a", "x"), record(1, "a", "x")]).is_err());

        let mut bad = record(0, "a", "x");
        bad.metrics.raw.sidewalk_pct = f64::NAN;
        assert!(validate_records(&[bad]).is_err());
    }
}
