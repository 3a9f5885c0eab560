use anyhow::Result;
use tracing::info;
use walkability::{OsmProvider, PipelineConfig};

use crate::cli::{Cli, RunArgs};

/// Merge the optional config file with command-line overrides.
fn resolve_config(args: &RunArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_toml_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(place) = &args.place { config.place = place.clone() }
    if let Some(output) = &args.output { config.output_dir = output.clone() }
    if let Some(crs) = args.crs { config.crs = crs.into() }
    if let Some(buffer) = args.buffer { config.walk_buffer_m = buffer }
    if args.no_cache { config.provider.use_cache = false }
    if args.sequential { config.parallel = false }
    Ok(config)
}

pub fn run(_cli: &Cli, args: &RunArgs) -> Result<()> {
    let config = resolve_config(args)?;
    let provider = OsmProvider::new(config.provider.clone())?;

    let output = walkability::run(&provider, &config)?;

    info!("[run] GeoJSON: {}", output.geojson_path.display());
    info!("[run] CSV: {}", output.csv_path.display());
    if let Some(svg) = &output.svg_path {
        info!("[run] map: {}", svg.display());
    }
    Ok(())
}
