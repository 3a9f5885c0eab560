use serde::{Deserialize, Serialize};

use crate::metrics::RawMetrics;

/// Fixed reference range used to rescale a raw metric onto [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricRange {
    pub low: f64,
    pub high: f64,
    /// Lower raw values score higher.
    #[serde(default)]
    pub inverted: bool,
}

impl MetricRange {
    pub const fn new(low: f64, high: f64) -> Self { Self { low, high, inverted: false } }

    pub const fn inverted(low: f64, high: f64) -> Self { Self { low, high, inverted: true } }

    /// Linear rescale onto [0, 100], saturating outside the range.
    pub fn normalize(&self, value: f64) -> f64 {
        let mut s = (value - self.low) / (self.high - self.low);
        if self.inverted { s = 1.0 - s }
        (s * 100.0).clamp(0.0, 100.0)
    }
}

/// Weights of the four sub-scores in the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub intersection_density: f64,
    pub avg_block_length: f64,
    pub sidewalk_pct: f64,
    pub amenity_pct: f64,
}

/// Normalization ranges and weights. `Default` is the reference policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub intersection_density: MetricRange,
    pub avg_block_length: MetricRange,
    pub sidewalk_pct: MetricRange,
    pub amenity_pct: MetricRange,
    pub weights: Weights,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            intersection_density: MetricRange::new(0.0, 80.0),
            avg_block_length: MetricRange::inverted(50.0, 400.0),
            sidewalk_pct: MetricRange::new(0.0, 20.0),
            amenity_pct: MetricRange::new(0.0, 40.0),
            weights: Weights {
                intersection_density: 0.40,
                avg_block_length: 0.30,
                sidewalk_pct: 0.15,
                amenity_pct: 0.15,
            },
        }
    }
}

/// The four normalized sub-scores, each in [0, 100].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub n_int: f64,
    pub n_block: f64,
    pub n_sidewalk: f64,
    pub n_amenity: f64,
}

/// Raw metrics, sub-scores and composite score of one unit.
/// `Default` is the all-zero bundle given to units without street nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricBundle {
    pub raw: RawMetrics,
    pub normalized: SubScores,
    pub score: f64,
}

impl ScoringPolicy {
    /// Normalize raw metrics and combine them into the composite score.
    pub fn score(&self, raw: &RawMetrics) -> MetricBundle {
        let normalized = SubScores {
            n_int: self.intersection_density.normalize(raw.intersection_density),
            n_block: self.avg_block_length.normalize(raw.avg_block_length),
            n_sidewalk: self.sidewalk_pct.normalize(raw.sidewalk_pct),
            n_amenity: self.amenity_pct.normalize(raw.amenity_pct),
        };

        let w = &self.weights;
        let score = normalized.n_int * w.intersection_density
            + normalized.n_block * w.avg_block_length
            + normalized.n_sidewalk * w.sidewalk_pct
            + normalized.n_amenity * w.amenity_pct;

        MetricBundle { raw: *raw, normalized, score }
    }

    /// Score a unit, giving the all-zero bundle when it has no metrics.
    #[inline]
    pub fn score_unit(&self, raw: Option<&RawMetrics>) -> MetricBundle {
        raw.map(|raw| self.score(raw)).unwrap_or_default()
    }
}
