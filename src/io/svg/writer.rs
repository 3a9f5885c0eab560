//! Low-level SVG document writing.

use std::io::Write;

use anyhow::Result;
use geo::{Coord, MultiPolygon, Rect};

/// Projection function: lon/lat -> SVG coords (x,y)
pub(crate) type Projection = dyn Fn(&Coord<f64>) -> (f64, f64);

/// Write the XML declaration, opening <svg> tag and background.
pub(crate) fn write_header<W: Write>(writer: &mut W, width: f64, height: f64, bounds: &Rect<f64>) -> Result<()> {
    writeln!(writer, r##"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"##)?;
    writeln!(writer, r##"<svg xmlns="http://www.w3.org/2000/svg"
        width="{width:.0}" height="{height:.0}"
        viewBox="0 0 {width:.0} {height:.0}"
        data-lon-min="{lon_min}" data-lon-max="{lon_max}"
        data-lat-min="{lat_min}" data-lat-max="{lat_max}">"##,
        lon_min = bounds.min().x,
        lon_max = bounds.max().x,
        lat_min = bounds.min().y,
        lat_max = bounds.max().y,
    )?;
    writeln!(writer, r##"<rect width="100%" height="100%" fill="#ffffff"/>"##)?;
    writeln!(writer, r##"<defs>
<style>
    .unit {{ stroke: #374151; stroke-width: 0.4; fill-rule: evenodd; }}
    .legend {{ font: 11px sans-serif; fill: #111827; }}
</style>
</defs>"##)?;
    Ok(())
}

/// Write the closing </svg> tag.
pub(crate) fn write_footer<W: Write>(writer: &mut W) -> Result<()> {
    writeln!(writer, "</svg>")?;
    Ok(())
}

/// Append a ring as an SVG subpath: "M x,y L x,y ... Z"
fn ring_to_path(ring: &[Coord<f64>], project: &Projection, out: &mut String) {
    let Some((first, rest)) = ring.split_first() else { return };
    let (x, y) = project(first);
    out.push_str(&format!(" M{x:.2},{y:.2}"));
    for coord in rest {
        let (x, y) = project(coord);
        out.push_str(&format!(" L{x:.2},{y:.2}"));
    }
    out.push('Z');
}

/// Build a compact SVG path string for a MultiPolygon (exteriors + holes).
pub(crate) fn multipolygon_to_path(shape: &MultiPolygon<f64>, project: &Projection) -> String {
    let mut out = String::new();
    for polygon in &shape.0 {
        ring_to_path(&polygon.exterior().0, project, &mut out);
        for hole in polygon.interiors() {
            ring_to_path(&hole.0, project, &mut out);
        }
    }
    out
}

/// Escape text for use inside an SVG element or attribute.
pub(crate) fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
