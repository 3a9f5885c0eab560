use std::path::PathBuf;

use anyhow::Result;
use tracing::info;
use walkability::io::{read_units_geojson, render_svg};

use crate::cli::{Cli, RenderArgs};

pub fn run(_cli: &Cli, args: &RenderArgs) -> Result<()> {
    let out_path = args.output.clone().unwrap_or_else(|| PathBuf::from("walkability_map.svg"));

    let records = read_units_geojson(&args.geojson)?;
    info!("[render] drawing {} units to {}", records.len(), out_path.display());
    render_svg(&records, &out_path, args.width)
}
