//! Color mapping for walkability scores.

use std::fmt;

/// Simple RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl fmt::Display for Rgb {
    /// Format as CSS: rgb(r,g,b)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// Fill for units without street nodes.
pub const NO_DATA: Rgb = Rgb { r: 200, g: 200, b: 200 };

/// Yellow-to-green classes, lower bound inclusive, in ascending score order.
pub const SCORE_CLASSES: [(f64, Rgb); 5] = [
    ( 0.0, Rgb { r: 255, g: 255, b: 204 }),
    (20.0, Rgb { r: 194, g: 230, b: 153 }),
    (40.0, Rgb { r: 120, g: 198, b: 121 }),
    (60.0, Rgb { r:  49, g: 163, b:  84 }),
    (80.0, Rgb { r:   0, g: 104, b:  55 }),
];

/// Color for a composite score in [0, 100]. Exactly zero (or non-finite) is treated as no data.
pub fn score_color(score: f64) -> Rgb {
    if !score.is_finite() || score <= 0.0 { return NO_DATA }

    SCORE_CLASSES.iter().rev()
        .find(|(low, _)| score >= *low)
        .map_or(SCORE_CLASSES[0].1, |&(_, color)| color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_by_lower_bound() {
        assert_eq!(score_color(0.0), NO_DATA);
        assert_eq!(score_color(f64::NAN), NO_DATA);
        assert_eq!(score_color(0.1), SCORE_CLASSES[0].1);
        assert_eq!(score_color(20.0), SCORE_CLASSES[1].1);
        assert_eq!(score_color(79.9), SCORE_CLASSES[3].1);
        assert_eq!(score_color(100.0), SCORE_CLASSES[4].1);
    }

    #[test]
    fn css_format() {
        assert_eq!(Rgb { r: 1, g: 2, b: 3 }.to_string(), "rgb(1,2,3)");
    }
}
