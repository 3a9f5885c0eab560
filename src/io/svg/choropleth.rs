use std::{fs::File, io::{BufWriter, Write}, path::Path};

use anyhow::{bail, Context, Result};
use geo::Coord;

use crate::{geom::bounds_of, record::UnitRecord};

use super::{
    color::{score_color, NO_DATA, SCORE_CLASSES},
    writer::{escape, multipolygon_to_path, write_footer, write_header},
};

const MARGIN: f64 = 10.0;
const LEGEND_ROW: f64 = 16.0;

/// Write a choropleth of unit scores, `width` pixels wide, to any writer.
pub(crate) fn write_choropleth<W: Write>(writer: &mut W, records: &[UnitRecord], width: f64) -> Result<()> {
    let Some(bounds) = bounds_of(records.iter().map(|record| &record.geometry)) else {
        bail!("[io::svg] No unit geometry to render")
    };
    if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
        bail!("[io::svg] Degenerate map extent: {:?}", bounds);
    }

    // Equirectangular, with longitude shrunk by the cosine of the middle latitude.
    let aspect = bounds.center().y.to_radians().cos().max(1e-6);
    let scale = (width - 2.0 * MARGIN) / (bounds.width() * aspect);
    let map_height = bounds.height() * scale;
    let legend_height = LEGEND_ROW * (SCORE_CLASSES.len() + 1) as f64 + MARGIN;
    let height = map_height + 2.0 * MARGIN + legend_height;

    let project = move |coord: &Coord<f64>| -> (f64, f64) {
        let x = MARGIN + (coord.x - bounds.min().x) * aspect * scale;
        let y = MARGIN + (bounds.max().y - coord.y) * scale;
        (x, y)
    };

    write_header(writer, width, height, &bounds)?;

    writeln!(writer, r#"<g id="units">"#)?;
    for record in records {
        writeln!(writer, r#"<path class="unit" style="fill:{}" d="{}"><title>{} ({}): {:.1}</title></path>"#,
            score_color(record.metrics.score),
            multipolygon_to_path(&record.geometry, &project),
            escape(&record.kelurahan),
            escape(&record.kecamatan),
            record.metrics.score,
        )?;
    }
    writeln!(writer, "</g>")?;

    // Legend: one swatch per class, plus the no-data swatch.
    let top = map_height + 2.0 * MARGIN;
    writeln!(writer, r#"<g id="legend">"#)?;
    let uppers = SCORE_CLASSES.iter().skip(1).map(|(low, _)| *low).chain(std::iter::once(100.0));
    let rows = SCORE_CLASSES.iter().zip(uppers)
        .map(|(&(low, color), high)| (format!("{low:.0}-{high:.0}"), color))
        .chain(std::iter::once(("no street data".to_string(), NO_DATA)));
    for (i, (label, color)) in rows.enumerate() {
        let y = top + i as f64 * LEGEND_ROW;
        writeln!(writer, r#"<rect x="{MARGIN}" y="{y:.1}" width="12" height="12" style="fill:{color}"/>"#)?;
        writeln!(writer, r#"<text class="legend" x="{:.1}" y="{:.1}">{}</text>"#, MARGIN + 18.0, y + 10.0, label)?;
    }
    writeln!(writer, "</g>")?;

    write_footer(writer)
}

/// Render unit scores to an SVG file.
pub fn render_svg(records: &[UnitRecord], path: &Path, width: f64) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("[io::svg] Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_choropleth(&mut writer, records, width)?;
    writer.flush()?;
    Ok(())
}

/// Render unit scores to an SVG string.
pub fn render_svg_string(records: &[UnitRecord], width: f64) -> Result<String> {
    let mut buffer = Vec::new();
    write_choropleth(&mut buffer, records, width)?;
    String::from_utf8(buffer).context("[io::svg] SVG output is not valid UTF-8")
}
