//! Format-specific reading and writing of unit records.
//!
//! - `geojson` - unit polygons with all attributes (dashboard input)
//! - `csv` - the same attributes without geometry
//! - `svg` - static choropleth of the composite score

mod csv;
mod geojson;
mod svg;

pub use csv::{records_to_dataframe, stats_csv_string, write_stats_csv};
pub use geojson::{parse_geometry, read_units_geojson, units_from_geojson, units_to_geojson, write_units_geojson};
pub use svg::{render_svg, render_svg_string, score_color, Rgb, NO_DATA, SCORE_CLASSES};
