//! SVG choropleth export.

mod choropleth;
mod color;
mod writer;

pub use choropleth::{render_svg, render_svg_string};
pub use color::{score_color, Rgb, NO_DATA, SCORE_CLASSES};
