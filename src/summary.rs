//! Aggregation over persisted unit records, as consumed by the dashboard.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::record::UnitRecord;

/// District label that dashboards hide from the district list.
pub const OUTSIDE_DISTRICT: &str = "Bandung Outside";

/// Number of equal-width score bins over [0, 100].
pub const HISTOGRAM_BINS: usize = 20;

/// Number of lowest-scoring units listed.
pub const BOTTOM_N: usize = 10;

/// Sorted, de-duplicated district names, without [`OUTSIDE_DISTRICT`].
pub fn districts(records: &[UnitRecord]) -> Vec<String> {
    records.iter()
        .map(|r| r.kecamatan.as_str())
        .filter(|name| *name != OUTSIDE_DISTRICT)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}

/// Sorted unit names within one district.
pub fn units_in(records: &[UnitRecord], district: &str) -> Vec<String> {
    records.iter()
        .filter(|r| r.kecamatan == district)
        .map(|r| r.kelurahan.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}

/// Two-level district → unit selection. `None` selects everything at that level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub district: Option<String>,
    pub unit: Option<String>,
}

impl Filter {
    pub fn matches(&self, record: &UnitRecord) -> bool {
        self.district.as_deref().is_none_or(|d| record.kecamatan == d)
            && self.unit.as_deref().is_none_or(|u| record.kelurahan == u)
    }
}

/// Arithmetic means over the selected units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Means {
    pub score: f64,
    pub intersection_density: f64,
    pub avg_block_length: f64,
    pub sidewalk_pct: f64,
    pub amenity_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedUnit {
    pub kelurahan: String,
    pub kecamatan: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    /// `None` when the filter selects no units.
    pub means: Option<Means>,
    pub histogram: [usize; HISTOGRAM_BINS],
    /// Lowest scores first; ties broken by unit name.
    pub bottom: Vec<RankedUnit>,
}

/// Bin index for a score; out-of-range scores fall in the edge bins.
fn bin_of(score: f64) -> usize {
    let width = 100.0 / HISTOGRAM_BINS as f64;
    ((score / width).floor().max(0.0) as usize).min(HISTOGRAM_BINS - 1)
}

impl Summary {
    pub fn compute(records: &[UnitRecord], filter: &Filter) -> Self {
        let selected = records.iter().filter(|r| filter.matches(r)).collect::<Vec<_>>();
        let count = selected.len();

        let means = (count > 0).then(|| {
            let mean = |f: fn(&UnitRecord) -> f64| selected.iter().map(|r| f(r)).sum::<f64>() / count as f64;
            Means {
                score: mean(|r| r.metrics.score),
                intersection_density: mean(|r| r.metrics.raw.intersection_density),
                avg_block_length: mean(|r| r.metrics.raw.avg_block_length),
                sidewalk_pct: mean(|r| r.metrics.raw.sidewalk_pct),
                amenity_pct: mean(|r| r.metrics.raw.amenity_pct),
            }
        });

        let mut histogram = [0; HISTOGRAM_BINS];
        for record in &selected {
            histogram[bin_of(record.metrics.score)] += 1;
        }

        let mut ranked = selected.iter()
            .map(|r| RankedUnit { kelurahan: r.kelurahan.clone(), kecamatan: r.kecamatan.clone(), score: r.metrics.score })
            .collect::<Vec<_>>();
        ranked.sort_by(|a, b| a.score.total_cmp(&b.score).then_with(|| a.kelurahan.cmp(&b.kelurahan)));
        ranked.truncate(BOTTOM_N);

        Self { count, means, histogram, bottom: ranked }
    }
}
