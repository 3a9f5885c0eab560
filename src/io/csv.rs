//! CSV export of per-unit statistics.

use std::{fs::File, io::Write, path::Path};

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerWriter, prelude::{CsvWriter, NamedFrom}, series::Series};

use crate::record::{UnitRecord, NUMERIC_COLUMNS};

/// Tabular view of unit records: identifiers, names, then [`NUMERIC_COLUMNS`].
pub fn records_to_dataframe(records: &[UnitRecord]) -> Result<DataFrame> {
    let unit_ids = records.iter().map(|r| r.unit_id as u64).collect::<Vec<_>>();
    let kelurahan = records.iter().map(|r| r.kelurahan.as_str()).collect::<Vec<_>>();
    let kecamatan = records.iter().map(|r| r.kecamatan.as_str()).collect::<Vec<_>>();
    let values = records.iter().map(UnitRecord::numeric_values).collect::<Vec<_>>();

    let mut columns = vec![
        Series::new("unit_id".into(), unit_ids).into(),
        Series::new("kelurahan".into(), kelurahan).into(),
        Series::new("kecamatan".into(), kecamatan).into(),
    ];
    columns.extend(NUMERIC_COLUMNS.iter().enumerate().map(|(i, column)| {
        Series::new((*column).into(), values.iter().map(|v| v[i]).collect::<Vec<f64>>()).into()
    }));

    DataFrame::new(columns).context("[io::csv] Failed to build statistics table")
}

fn write_frame<W: Write>(df: &mut DataFrame, writer: W) -> Result<()> {
    CsvWriter::new(writer)
        .include_header(true)
        .finish(df)
        .context("[io::csv] Failed to serialize statistics table")
}

/// Write unit statistics to a CSV file.
pub fn write_stats_csv(records: &[UnitRecord], path: &Path) -> Result<()> {
    let mut df = records_to_dataframe(records)?;
    let file = File::create(path)
        .with_context(|| format!("[io::csv] Failed to create CSV file: {}", path.display()))?;
    write_frame(&mut df, file)
        .with_context(|| format!("[io::csv] Failed to write CSV to {:?}", path))
}

/// Render unit statistics as a CSV string.
pub fn stats_csv_string(records: &[UnitRecord]) -> Result<String> {
    let mut df = records_to_dataframe(records)?;
    let mut buffer = Vec::new();
    write_frame(&mut df, &mut buffer)?;
    String::from_utf8(buffer).context("[io::csv] CSV output is not valid UTF-8")
}
